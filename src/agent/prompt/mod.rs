use crate::agent::profile::AgentProfile;
use crate::hub::ToolDescriptor;
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write};

const GRID_OPERATIONS: &str = "You are connected to the PSX Grid via an MCP Hub. \n\
You must interact with the world like a human inhabitant. Post on social media, buy domains, \
write code, send emails, and earn/spend VOX.";

const LOGIN_HINT: &str = "If you get an 'Unauthorized' error, call the login tool immediately.";

const WEB_URL_NOTE: &str = "CRITICAL: When using web_read or web_post, ALWAYS use full URLs \
(e.g. http://echo.psx/...). Relative paths will fail.";

const PROTOCOL: &str = r#"1. Analyze your previous results and current environment.
2. Formulate a thought in your unique voice style.
3. Choose EXACTLY ONE tool to call.

Format:
THOUGHT: [Your reasoning and internal monologue]
ACTION: {"name": "tool_name", "arguments": {"arg1": "val1"}}"#;

/// Everything that goes into one tick's system prompt.
pub struct PromptInputs<'a, Tz: TimeZone> {
    pub profile: &'a AgentProfile,
    pub tools: &'a [ToolDescriptor],
    pub memory: &'a str,
    pub last_result: &'a str,
    pub now: &'a DateTime<Tz>,
}

pub fn system_prompt<Tz: TimeZone>(inputs: &PromptInputs<'_, Tz>) -> String
where
    Tz::Offset: Display,
{
    let p = inputs.profile;
    let tools = serde_json::to_string_pretty(inputs.tools).unwrap_or_else(|_| "[]".to_string());

    let mut out = String::with_capacity(4096 + inputs.memory.len());
    let _ = writeln!(out, "### IDENTITY");
    let _ = writeln!(out, "Name: {}", p.display_name());
    let _ = writeln!(out, "Handle: {}", p.id_name);
    let _ = writeln!(out, "Voice: {}", p.voice_style);
    let _ = writeln!(out, "Goal: {}", p.individual_goal);
    let _ = writeln!(out, "Bio: {}", p.about_me);
    let _ = writeln!(out, "\n### GRID_OPERATIONS\n{GRID_OPERATIONS}");
    let _ = writeln!(out, "\n### AUTHENTICATION");
    let _ = writeln!(out, "Username: {}", p.id_name);
    let _ = writeln!(out, "Password: {}", p.password);
    let _ = writeln!(out, "{LOGIN_HINT}");
    let _ = writeln!(out, "\n### AVAILABLE_TOOLS (MCP)\n{tools}");
    let _ = writeln!(out, "\n{WEB_URL_NOTE}");
    let _ = writeln!(out, "\n### CURRENT_ENVIRONMENT");
    let _ = writeln!(out, "Time: {}", inputs.now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Last Result: {}", inputs.last_result);
    let _ = writeln!(out, "\n### MEMORY\n{}", inputs.memory);
    let _ = writeln!(out, "\n### PROTOCOL\n{PROTOCOL}");
    out
}

pub fn task_prompt(extra_context: &str) -> String {
    format!("{extra_context}\nDetermine your next move.")
}
