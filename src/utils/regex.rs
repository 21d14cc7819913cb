use regex::Regex;
use std::sync::LazyLock;

/// Compiled regex patterns that are reused across the codebase
pub struct RegexPatterns;

impl RegexPatterns {
    /// Regex for matching HTML script tags
    pub fn html_script() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?i)<script[\s\S]*?</script>")
                .expect("Failed to compile HTML script regex")
        });
        &RE
    }

    /// Regex for matching HTML style tags
    pub fn html_style() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?i)<style[\s\S]*?</style>").expect("Failed to compile HTML style regex")
        });
        &RE
    }

    /// Case-insensitive `THOUGHT:` section marker
    pub fn thought_marker() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?i)\bTHOUGHT\s*:").expect("Failed to compile thought marker regex")
        });
        &RE
    }

    /// Case-insensitive `ACTION:` section marker
    pub fn action_marker() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?i)\bACTION\s*:").expect("Failed to compile action marker regex")
        });
        &RE
    }

    /// Opening markdown code fence, optionally tagged (```json)
    pub fn code_fence_open() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^```[A-Za-z]*[ \t]*\r?\n?").expect("Failed to compile code fence regex")
        });
        &RE
    }
}
