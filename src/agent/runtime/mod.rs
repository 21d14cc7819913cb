//! One agent's decide-act-observe loop.
//!
//! A tick is a no-op while the agent is inactive or dormant. Otherwise it
//! makes exactly one model call, parses one action out of the reply, runs
//! it (locally or through the hub) and records the exchange in memory.

use crate::agent::action::{Decision, parse_decision};
use crate::agent::grid::GridClient;
use crate::agent::local::{self, LocalTool};
use crate::agent::memory::MemoryLog;
use crate::agent::profile::AgentProfile;
use crate::agent::prompt::{PromptInputs, system_prompt, task_prompt};
use crate::agent::state::AgentState;
use crate::config::AgentsConfig;
use crate::errors::GridError;
use crate::providers::base::{ChatRequest, LLMProvider, Message, ResponseFormat};
use crate::utils::{ensure_dir, truncate_chars};
use anyhow::Result;
use chrono::{DateTime, Local, TimeDelta, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const FORMAT_CORRECTION: &str =
    "Failed to parse your response. Ensure you use the ACTION: {...JSON...} format.";

const PROFILE_FILE: &str = "profile.json";
const STATE_FILE: &str = "state.json";
const MEMORY_FILE: &str = "memory.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Inactive,
    Dormant { until: DateTime<Utc> },
    /// The model call failed; nothing was recorded.
    ModelFailed,
    /// The reply had no usable ACTION; only the corrective last result changed.
    FormatViolation,
    Acted { tool: String },
}

/// Knobs copied out of [`AgentsConfig`] so an agent doesn't hold the whole config.
#[derive(Debug, Clone)]
struct Limits {
    temperature: f32,
    max_tokens: u32,
    result_record_chars: usize,
    last_result_chars: usize,
    action_record_chars: usize,
}

impl From<&AgentsConfig> for Limits {
    fn from(cfg: &AgentsConfig) -> Self {
        Self {
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            result_record_chars: cfg.result_record_chars,
            last_result_chars: cfg.last_result_chars,
            action_record_chars: cfg.action_record_chars,
        }
    }
}

pub struct Agent {
    id: String,
    dir: PathBuf,
    profile: Option<AgentProfile>,
    state: AgentState,
    memory: MemoryLog,
    limits: Limits,
    provider: Arc<dyn LLMProvider>,
    grid: Arc<dyn GridClient>,
}

impl Agent {
    /// Open (or create) the agent directory `dir` and load what is on disk.
    /// A missing profile is generated on the first tick.
    pub fn open(
        id: &str,
        dir: &Path,
        config: &AgentsConfig,
        provider: Arc<dyn LLMProvider>,
        grid: Arc<dyn GridClient>,
    ) -> Result<Self> {
        let dir = ensure_dir(dir)?;
        let profile = AgentProfile::load(&dir.join(PROFILE_FILE))?;
        let state = AgentState::load(&dir.join(STATE_FILE))?;
        let memory = MemoryLog::new(dir.join(MEMORY_FILE), config.memory_window_chars);
        Ok(Self {
            id: id.to_string(),
            dir,
            profile,
            state,
            memory,
            limits: Limits::from(config),
            provider,
            grid,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn profile(&self) -> Option<&AgentProfile> {
        self.profile.as_ref()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn memory(&self) -> &MemoryLog {
        &self.memory
    }

    pub fn set_active(&mut self, active: bool) -> Result<()> {
        self.state.active = active;
        self.save_state()
    }

    pub fn set_credential(&mut self, credential: Option<String>) -> Result<()> {
        self.state.credential = credential;
        self.save_state()
    }

    /// Load or generate the profile. Generation costs one model call and
    /// is persisted immediately so it never happens twice.
    pub async fn ensure_profile(&mut self) -> Result<&AgentProfile> {
        if self.profile.is_none() {
            let generated =
                AgentProfile::generate(self.provider.as_ref(), &self.id, self.limits.max_tokens)
                    .await?;
            generated.save(&self.dir.join(PROFILE_FILE))?;
            info!("persona for {} is {}", self.id, generated.display_name());
            self.profile = Some(generated);
        }
        match &self.profile {
            Some(profile) => Ok(profile),
            None => anyhow::bail!("profile for {} is missing", self.id),
        }
    }

    pub async fn set_password(&mut self, password: &str) -> Result<()> {
        self.ensure_profile().await?;
        if let Some(profile) = self.profile.as_mut() {
            profile.password = password.to_string();
            profile.save(&self.dir.join(PROFILE_FILE))?;
        }
        Ok(())
    }

    pub async fn tick(&mut self, extra_context: &str) -> Result<TickOutcome> {
        self.tick_at(Utc::now(), extra_context).await
    }

    /// One tick evaluated at `now`.
    ///
    /// Model and tool failures are folded into the outcome; only local I/O
    /// (state, profile or memory files) surfaces as `Err`.
    pub async fn tick_at(&mut self, now: DateTime<Utc>, extra_context: &str) -> Result<TickOutcome> {
        if !self.state.active {
            return Ok(TickOutcome::Inactive);
        }
        if let Some(until) = self.state.dormant_until.filter(|_| self.state.is_dormant_at(now)) {
            return Ok(TickOutcome::Dormant { until });
        }

        self.ensure_profile().await?;
        let Some(profile) = self.profile.clone() else {
            anyhow::bail!("profile for {} is missing", self.id);
        };
        info!("tick: {} ({}) is processing", profile.display_name(), self.id);

        let tools = match self.grid.list_tools().await {
            Ok(hub) => local::merge_catalog(hub),
            Err(e) => {
                warn!("tool catalog unavailable for {}: {:#}", self.id, e);
                local::merge_catalog(Vec::new())
            }
        };
        let memory = self.memory.read_window()?;
        let local_now = now.with_timezone(&Local);
        let system = system_prompt(&PromptInputs {
            profile: &profile,
            tools: &tools,
            memory: &memory,
            last_result: &self.state.last_action_result,
            now: &local_now,
        });

        let request = ChatRequest {
            messages: vec![Message::system(system), Message::user(task_prompt(extra_context))],
            model: None,
            max_tokens: self.limits.max_tokens,
            temperature: self.limits.temperature,
            response_format: ResponseFormat::Text,
        };
        let reply = match self.provider.chat(request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("model call failed for {}: {:#}", self.id, e);
                return Ok(TickOutcome::ModelFailed);
            }
        };

        let Decision { thought, action } = match parse_decision(reply.text()) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("unusable reply from {}: {}", self.id, GridError::from(e));
                self.state.last_action_result = FORMAT_CORRECTION.to_string();
                self.save_state()?;
                return Ok(TickOutcome::FormatViolation);
            }
        };

        let record = format!("THOUGHT: {}\nACTION: {}", thought, action.to_compact_json());
        self.memory.append_at(
            &local_now,
            truncate_chars(&record, self.limits.action_record_chars),
        )?;

        info!("{} calling tool: {}", self.id, action.name);
        let result = match LocalTool::from_action(&action) {
            Some(Ok(tool)) => self.run_local(tool, &profile, now).await,
            Some(Err(e)) => format!("ERROR: {e}"),
            None => match self
                .grid
                .call_tool(&action.name, &action.arguments, self.state.credential.as_deref())
                .await
            {
                Ok(r) => r.content,
                Err(e) => format!("ERROR: hub call failed: {e:#}"),
            },
        };
        info!("tool result: {}", truncate_chars(&result, 200));

        self.state.last_action_result =
            truncate_chars(&result, self.limits.last_result_chars).to_string();
        self.memory.append_at(
            &local_now,
            &format!("RESULT: {}", truncate_chars(&result, self.limits.result_record_chars)),
        )?;
        self.save_state()?;
        Ok(TickOutcome::Acted { tool: action.name })
    }

    async fn run_local(&mut self, tool: LocalTool, profile: &AgentProfile, now: DateTime<Utc>) -> String {
        match tool {
            LocalTool::Login { username, password } => {
                let username = username.unwrap_or_else(|| self.id.clone());
                let password = password.unwrap_or_else(|| profile.password.clone());
                info!("{} attempting login", self.id);
                match self.grid.login(&username, &password).await {
                    Ok(token) => {
                        self.state.credential = Some(token);
                        local::login_success(&username)
                    }
                    Err(e) => local::login_failure(&e),
                }
            }
            LocalTool::Sleep { minutes } => {
                let until = i64::try_from(minutes)
                    .ok()
                    .and_then(TimeDelta::try_minutes)
                    .and_then(|d| now.checked_add_signed(d));
                match until {
                    Some(until) => {
                        self.state.dormant_until = Some(until);
                        local::sleep_result(minutes)
                    }
                    None => format!(
                        "ERROR: {}",
                        GridError::invalid_arguments(local::SLEEP, "minutes is too large")
                    ),
                }
            }
        }
    }

    fn save_state(&self) -> Result<()> {
        self.state.save(&self.dir.join(STATE_FILE))
    }
}
