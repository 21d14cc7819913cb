use crate::agent::HttpGridClient;
use crate::config::Config;
use crate::manager::{AgentManager, IdentityProvisioner};
use crate::providers::gemini::GeminiProvider;
use crate::services::ServiceClient;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub(super) async fn hub(config: &Config) -> Result<()> {
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutting down hub");
    };
    crate::hub::serve(config, shutdown).await
}

/// The agent commands need a model key unless they only read local state.
fn manager(config: &Config, needs_model: bool) -> Result<AgentManager> {
    if needs_model {
        config.require_gemini_key()?;
    }
    let provider = Arc::new(GeminiProvider::from_config(&config.providers.gemini));
    let grid = Arc::new(HttpGridClient::new(config));
    let services = ServiceClient::new(
        config.services.clone(),
        Duration::from_secs(config.hub.backend_timeout_secs),
    );
    let provisioner = Arc::new(IdentityProvisioner::new(
        services,
        config.provisioning.clone(),
    ));
    AgentManager::load(
        config.agents.data_path()?,
        config.agents.clone(),
        provider,
        grid,
        provisioner,
    )
}

pub(super) async fn add(config: &Config, id: &str, password: &str) -> Result<()> {
    let mut manager = manager(config, true)?;
    let agent = manager.create_agent(id, password).await?;
    let name = agent.profile().map_or(id, |p| p.display_name());
    println!("[+] Agent {} ({}) provisioned successfully.", id, name);
    Ok(())
}

pub(super) async fn tick(config: &Config) -> Result<()> {
    let mut manager = manager(config, true)?;
    for (id, outcome) in manager.run_cycle().await {
        match outcome {
            Ok(outcome) => println!("{id}: {outcome:?}"),
            Err(e) => println!("{id}: failed: {e:#}"),
        }
    }
    Ok(())
}

pub(super) fn list(config: &Config) -> Result<()> {
    let manager = manager(config, false)?;
    println!("\n--- AGENTS ---");
    for summary in manager.list_agents() {
        println!("{summary}");
    }
    println!("--------------\n");
    Ok(())
}

pub(super) async fn run_loop(config: &Config, interval_secs: u64) -> Result<()> {
    let mut manager = manager(config, true)?;
    println!("[*] Starting autonomy loop (interval: {interval_secs}s)...");
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    manager
        .run_loop(Duration::from_secs(interval_secs), shutdown)
        .await;
    println!("\n[*] Loop terminated.");
    Ok(())
}

pub(super) fn remove(config: &Config, id: &str) -> Result<()> {
    let mut manager = manager(config, false)?;
    if manager.remove_agent(id)? {
        println!("[*] Agent {id} removed from the active set.");
    } else {
        println!("[!] No agent named {id}.");
    }
    Ok(())
}
