mod subcommands;


use crate::config::{Config, load_config};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridhub")]
#[command(about = "PSX Grid tool hub and autonomous agent runtime")]
pub struct Cli {
    /// Config file (default: $GRIDHUB_HOME/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Onboard,
    /// Serve the tool hub over HTTP
    Hub {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Provision a new agent
    Add {
        /// Username / internal id
        id: String,
        /// Password for the grid identity
        password: String,
    },
    /// Run one cycle over all active agents
    Tick,
    /// List known agents
    List,
    /// Run cycles until interrupted
    Loop {
        /// Seconds between cycles (default: agents.loopIntervalSecs)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Take an agent out of the active set
    Remove { id: String },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Onboard => {
            onboard(config_path)?;
        }
        Commands::Hub { host, port } => {
            let mut config = load_config(config_path)?;
            if let Some(host) = host {
                config.hub.host = host;
            }
            if let Some(port) = port {
                config.hub.port = port;
            }
            config.validate()?;
            subcommands::hub(&config).await?;
        }
        Commands::Add { id, password } => {
            let config = load_config(config_path)?;
            subcommands::add(&config, &id, &password).await?;
        }
        Commands::Tick => {
            let config = load_config(config_path)?;
            subcommands::tick(&config).await?;
        }
        Commands::List => {
            let config = load_config(config_path)?;
            subcommands::list(&config)?;
        }
        Commands::Loop { interval } => {
            let config = load_config(config_path)?;
            let interval = interval.unwrap_or(config.agents.loop_interval_secs);
            subcommands::run_loop(&config, interval).await?;
        }
        Commands::Remove { id } => {
            let config = load_config(config_path)?;
            subcommands::remove(&config, &id)?;
        }
    }

    Ok(())
}

fn onboard(config_path: Option<&std::path::Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => crate::config::get_config_path()?,
    };
    if path.exists() {
        println!("Config already exists at {}", path.display());
        println!("Overwrite? (y/N): ");
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
    }

    let config = Config::default();
    crate::config::save_config(&config, Some(path.as_path()))?;
    println!("\u{2713} Created config at {}", path.display());

    let data_dir = config.agents.data_path()?;
    crate::utils::ensure_dir(&data_dir)?;
    println!("\u{2713} Agent data in {}", data_dir.display());

    println!("\nCredentials:");
    for (name, source) in crate::config::credentials::credential_sources(&config) {
        println!("  {name}: {source}");
    }

    println!("\nNext steps:");
    println!("  1. Set providers.gemini.apiKey (or GRIDHUB_GEMINI_API_KEY)");
    println!("  2. Start the hub: gridhub hub");
    println!("  3. Add an agent: gridhub add <id> <password>");
    Ok(())
}
