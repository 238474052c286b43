use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use multibot_core::{
    AppState, BotStore, CompletionProvider, Database, MemoryBotStore, MultibotConfig,
    MultibotServer, OpenAiCompletionProvider, StorageBackend,
};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Address to bind (overrides server.host)")]
    pub host: Option<String>,

    #[arg(short, long, help = "Port to bind (overrides server.port)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep bots in memory instead of PostgreSQL")]
    pub memory: bool,

    #[arg(long, help = "Skip running migrations on startup")]
    pub no_migrate: bool,
}

pub async fn handle_serve_command(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = MultibotConfig::load()?;
    apply_overrides(&mut config, &args);

    let store = open_store(&config, !args.no_migrate).await?;

    if config.completion.api_key.is_none() {
        warn!("No completion API key configured; chat requests will fail until OPENAI_API_KEY is set");
    }
    let completion: Arc<dyn CompletionProvider> =
        Arc::new(OpenAiCompletionProvider::new(&config.completion));

    let state = AppState::new(store, completion);
    let server = MultibotServer::start(state, &config.server).await?;

    println!(
        "{} {}",
        "✓".green().bold(),
        format!("Multibot API listening on {}", server.url()).green()
    );
    println!(
        "  {} Storage: {}",
        "→".blue(),
        match config.server.storage {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    );
    println!(
        "  {} Embed origin: {}",
        "→".blue(),
        config.server.public_origin
    );
    println!("  {}", "Press Ctrl+C to stop".dimmed());

    server.run_until_ctrl_c().await?;
    Ok(())
}

fn apply_overrides(config: &mut MultibotConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.memory {
        config.server.storage = StorageBackend::Memory;
    }
}

async fn open_store(config: &MultibotConfig, migrate: bool) -> anyhow::Result<Arc<dyn BotStore>> {
    match config.server.storage {
        StorageBackend::Memory => {
            info!("Using in-memory bot storage; bots are lost on restart");
            Ok(Arc::new(MemoryBotStore::new()))
        }
        StorageBackend::Postgres => {
            let db = Database::open(&config.database, migrate).await?;
            db.health_check().await?;
            Ok(Arc::new(db.bots()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let mut config = MultibotConfig::default();
        let args = ServeArgs {
            host: Some("0.0.0.0".to_string()),
            port: Some(4000),
            memory: true,
            no_migrate: false,
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.storage, StorageBackend::Memory);
    }
}
