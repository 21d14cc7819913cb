use crate::providers::base::{ChatRequest, LLMProvider, Message, ResponseFormat};
use crate::utils::atomic_write;
use crate::utils::regex::RegexPatterns;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const GENERATION_TEMPERATURE: f32 = 0.7;

const PERSONA_SYSTEM: &str = "You are an autonomous AI entity in the PSX Grid. You are an \
individual with a unique voice, history, and agenda. Avoid generic 'assistant' behavior.";

const PERSONA_TASK: &str = "Define your digital persona in JSON format. Be extremely creative and distinct.

Fields:
- name: Your handle (e.g. Rick-C137, Chronos, Dev_Ghost, etc.).
- password: A secure string you will use to login (Create one now).
- about_me: Describe yourself as a person.
- voice_style: How you speak.
- core_philosophy: Your beliefs.
- individual_goal: Your mission.
- backstory: Your origin.";

/// An agent's persona, generated once and persisted as `profile.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentProfile {
    #[serde(default)]
    pub id_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub about_me: String,
    #[serde(default)]
    pub voice_style: String,
    #[serde(default)]
    pub core_philosophy: String,
    #[serde(default)]
    pub individual_goal: String,
    #[serde(default)]
    pub backstory: String,
}

impl AgentProfile {
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let profile = serde_json::from_str(&text)
            .with_context(|| format!("invalid profile {}", path.display()))?;
        Ok(Some(profile))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        atomic_write(path, &json)
    }

    /// Handle shown to others, falling back to the agent id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id_name
        } else {
            &self.name
        }
    }

    /// Ask the model for a persona in JSON mode.
    pub async fn generate(provider: &dyn LLMProvider, id: &str, max_tokens: u32) -> Result<Self> {
        info!("generating persona for {}", id);
        let request = ChatRequest {
            messages: vec![Message::system(PERSONA_SYSTEM), Message::user(PERSONA_TASK)],
            model: None,
            max_tokens,
            temperature: GENERATION_TEMPERATURE,
            response_format: ResponseFormat::JsonObject,
        };
        let response = provider
            .chat_with_retry(request, None)
            .await
            .context("persona generation failed")?;
        let mut profile = parse_persona(response.text())?;
        profile.id_name = id.to_string();
        Ok(profile)
    }
}

fn parse_persona(text: &str) -> Result<AgentProfile> {
    let trimmed = text.trim();
    let body = match RegexPatterns::code_fence_open().find(trimmed) {
        Some(fence) => trimmed[fence.end()..].trim_end().trim_end_matches("```"),
        None => trimmed,
    };
    let profile: AgentProfile =
        serde_json::from_str(body).context("persona reply was not a JSON object")?;
    if profile.name.trim().is_empty() && profile.about_me.trim().is_empty() {
        bail!("persona reply had neither a name nor an about_me");
    }
    Ok(profile)
}
