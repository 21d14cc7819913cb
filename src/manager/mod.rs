//! Lifecycle of the agent population: provisioning, loading from disk,
//! and the tick cycle that drives every active agent in turn.

use crate::agent::{Agent, GridClient, TickOutcome};
use crate::config::{AgentsConfig, ProvisioningConfig};
use crate::errors::GridError;
use crate::providers::base::LLMProvider;
use crate::services::{FeedItem, ServiceClient};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Creates the external identity behind a new agent.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Returns an initial credential when the backend issued one.
    async fn provision(&self, id: &str, password: &str) -> Result<Option<String>>;
}

/// Registers the agent with the identity service and, when a system secret
/// is configured, fetches a system-issued token for it.
pub struct IdentityProvisioner {
    services: ServiceClient,
    provisioning: ProvisioningConfig,
}

impl IdentityProvisioner {
    pub fn new(services: ServiceClient, provisioning: ProvisioningConfig) -> Self {
        Self {
            services,
            provisioning,
        }
    }
}

#[async_trait]
impl Provisioner for IdentityProvisioner {
    async fn provision(&self, id: &str, password: &str) -> Result<Option<String>> {
        match self.services.register(id, password).await {
            Ok(_) => info!("registered identity {}", id),
            Err(GridError::Backend {
                status: 400,
                message,
                ..
            }) if message.contains("already") => {
                info!("identity {} already registered", id);
            }
            Err(e) => return Err(e).with_context(|| format!("failed to register {id}")),
        }

        let secret = self.provisioning.system_secret.trim();
        if !self.provisioning.issue_system_token || secret.is_empty() {
            return Ok(None);
        }
        let token = self
            .services
            .system_token(id, secret)
            .await
            .with_context(|| format!("failed to issue a system token for {id}"))?;
        Ok(Some(token))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: Option<String>,
    pub active: bool,
    pub dormant_until: Option<DateTime<Utc>>,
}

impl std::fmt::Display for AgentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.active { "ONLINE" } else { "OFFLINE" };
        write!(
            f,
            "- {} ({}) : [{}]",
            self.id,
            self.name.as_deref().unwrap_or("unnamed"),
            status
        )
    }
}

/// `# GLOBAL_SIGNAL` block handed to every agent in a cycle.
pub fn global_signal(feed: &[FeedItem]) -> String {
    let lines: Vec<String> = feed.iter().map(ToString::to_string).collect();
    format!(
        "\n# GLOBAL_SIGNAL (Recent Echo Transmissions)\n{}\n",
        lines.join("\n")
    )
}

pub struct AgentManager {
    data_dir: PathBuf,
    config: AgentsConfig,
    provider: Arc<dyn LLMProvider>,
    grid: Arc<dyn GridClient>,
    provisioner: Arc<dyn Provisioner>,
    agents: BTreeMap<String, Agent>,
}

impl AgentManager {
    pub fn new(
        data_dir: PathBuf,
        config: AgentsConfig,
        provider: Arc<dyn LLMProvider>,
        grid: Arc<dyn GridClient>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Self {
        Self {
            data_dir,
            config,
            provider,
            grid,
            provisioner,
            agents: BTreeMap::new(),
        }
    }

    /// Like [`AgentManager::new`], then open every agent directory under
    /// `data_dir`. Inactive agents are loaded but never ticked.
    pub fn load(
        data_dir: PathBuf,
        config: AgentsConfig,
        provider: Arc<dyn LLMProvider>,
        grid: Arc<dyn GridClient>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Result<Self> {
        let mut manager = Self::new(data_dir, config, provider, grid, provisioner);
        if !manager.data_dir.exists() {
            return Ok(manager);
        }
        let entries = std::fs::read_dir(&manager.data_dir)
            .with_context(|| format!("failed to read {}", manager.data_dir.display()))?;
        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        ids.sort();
        for id in ids {
            match manager.open_agent(&id) {
                Ok(agent) => {
                    manager.agents.insert(id, agent);
                }
                Err(e) => warn!("skipping agent directory {}: {:#}", id, e),
            }
        }
        info!("loaded {} agents from {}", manager.agents.len(), manager.data_dir.display());
        Ok(manager)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Ids of the agents a cycle will tick, in tick order.
    pub fn active_ids(&self) -> Vec<String> {
        self.agents
            .iter()
            .filter(|(_, a)| a.state().active)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn open_agent(&self, id: &str) -> Result<Agent> {
        Agent::open(
            id,
            &self.data_dir.join(id),
            &self.config,
            self.provider.clone(),
            self.grid.clone(),
        )
    }

    /// Provision `id`, make sure it has a profile carrying `password`, and
    /// add it to the active set. Re-adding a removed agent reactivates it.
    pub async fn create_agent(&mut self, id: &str, password: &str) -> Result<&Agent> {
        let id = id.trim();
        if id.is_empty() || id.starts_with('.') || crate::utils::safe_filename(id) != id {
            bail!("invalid agent id {id:?}");
        }
        info!("provisioning agent {}", id);
        let credential = self.provisioner.provision(id, password).await?;

        let mut agent = self.open_agent(id)?;
        agent.set_password(password).await?;
        if credential.is_some() {
            agent.set_credential(credential)?;
        }
        agent.set_active(true)?;
        self.agents.insert(id.to_string(), agent);
        self.agents
            .get(id)
            .with_context(|| format!("agent {id} vanished after insert"))
    }

    /// Deactivate `id`. Its files stay on disk.
    pub fn remove_agent(&mut self, id: &str) -> Result<bool> {
        let Some(agent) = self.agents.get_mut(id) else {
            return Ok(false);
        };
        agent.set_active(false)?;
        info!("agent {} removed from the active set", id);
        Ok(true)
    }

    pub fn list_agents(&self) -> Vec<AgentSummary> {
        self.agents
            .iter()
            .map(|(id, agent)| AgentSummary {
                id: id.clone(),
                name: agent.profile().map(|p| p.display_name().to_string()),
                active: agent.state().active,
                dormant_until: agent.state().dormant_until,
            })
            .collect()
    }

    /// Feed excerpt shared by all agents this cycle; empty when the feed is
    /// unreachable.
    pub async fn global_context(&self) -> String {
        match self.grid.recent_feed(self.config.feed_limit).await {
            Ok(feed) => global_signal(&feed),
            Err(e) => {
                warn!("could not fetch global context: {:#}", e);
                String::new()
            }
        }
    }

    /// Tick every active agent once, in id order, pausing `pacingSecs`
    /// between agents. One agent's failure never stops the cycle.
    pub async fn run_cycle(&mut self) -> Vec<(String, Result<TickOutcome>)> {
        let ids = self.active_ids();
        info!("cycle start ({} active)", ids.len());
        let context = self.global_context().await;
        let pacing = Duration::from_secs(self.config.pacing_secs);

        let mut report = Vec::with_capacity(ids.len());
        for (i, id) in ids.into_iter().enumerate() {
            if i > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            let outcome = agent.tick(&context).await;
            if let Err(e) = &outcome {
                error!("tick failed for {}: {:#}", id, e);
            }
            report.push((id, outcome));
        }
        info!("cycle end");
        report
    }

    /// Run cycles `interval` apart until `shutdown` resolves. An in-flight
    /// tick is dropped at its next await point; every completed write is
    /// already on disk.
    pub async fn run_loop<F>(&mut self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = self.run_cycle() => {}
                () = &mut shutdown => break,
            }
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = &mut shutdown => break,
            }
        }
        info!("agent loop stopped");
    }
}
