// Shared test helpers; not all items used by every test binary.
#![allow(unused)]

use async_trait::async_trait;
use gridhub::config::{Config, ServicesConfig};
use gridhub::manager::Provisioner;
use gridhub::providers::base::{ChatRequest, LLMProvider, LLMResponse, Message, ResponseFormat};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const PERSONA: &str = r#"{"name": "Chronos", "password": "generated", "voice_style": "clipped", "individual_goal": "map the grid"}"#;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

impl RecordedCall {
    pub fn system(&self) -> &str {
        &self.messages[0].content
    }

    pub fn task(&self) -> &str {
        &self.messages[1].content
    }
}

pub struct MockLLMProvider {
    responses: Mutex<VecDeque<LLMResponse>>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub default_response: String,
}

impl MockLLMProvider {
    pub fn with_responses(responses: Vec<LLMResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from(responses)),
            calls: Mutex::new(Vec::new()),
            default_response: "Mock response".to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls made in JSON mode, i.e. persona generation.
    pub fn persona_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.response_format == ResponseFormat::JsonObject)
            .count()
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    async fn chat(&self, req: ChatRequest<'_>) -> anyhow::Result<LLMResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: req.messages,
            temperature: req.temperature,
            response_format: req.response_format,
        });
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| text_response(&self.default_response)))
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

pub fn text_response(content: &str) -> LLMResponse {
    LLMResponse {
        content: Some(content.to_string()),
        input_tokens: None,
        output_tokens: None,
    }
}

pub fn action_response(thought: &str, name: &str, arguments: &str) -> LLMResponse {
    text_response(&format!(
        "THOUGHT: {thought}\nACTION: {{\"name\": \"{name}\", \"arguments\": {arguments}}}"
    ))
}

/// Provisioner that never leaves the process.
#[derive(Default)]
pub struct StaticProvisioner {
    pub credential: Option<String>,
    pub provisioned: Mutex<Vec<String>>,
}

#[async_trait]
impl Provisioner for StaticProvisioner {
    async fn provision(&self, id: &str, _password: &str) -> anyhow::Result<Option<String>> {
        self.provisioned.lock().unwrap().push(id.to_string());
        Ok(self.credential.clone())
    }
}

/// Every backend and the hub itself pointed at one mock server, no pacing.
pub fn config_for(base: &str) -> Config {
    let mut config = Config::default();
    config.services = ServicesConfig::all_at(base);
    config.agents.hub_url = base.to_string();
    config.agents.pacing_secs = 0;
    config
}
