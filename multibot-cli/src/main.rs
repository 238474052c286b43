#![allow(
    dead_code,
    unused_imports,
    clippy::needless_borrows_for_generic_args,
    clippy::useless_format
)]

use clap::{Parser, Subcommand};
use colored::Colorize;
use multibot_core::{CliErrorDisplay, Database, LoggingConfig, MultibotConfig, MultibotError};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{
    handle_bots_command, handle_serve_command, handle_snippet_command, BotsCommand, ServeArgs,
    SnippetArgs,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "multibot")]
#[command(version = VERSION)]
#[command(about = "Multibot - customer-support chatbots with an embeddable chat widget")]
#[command(long_about = r#"
Multibot hosts customer-support chatbots for many tenants. Each bot is
embedded on a customer site with a single script tag that loads the chat
widget, which talks to this server through an iframe.

Use 'multibot init' to prepare the database, 'multibot serve' to run the API,
and 'multibot snippet <bot-id>' to print the embed code for a bot.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the bot and chat API")]
    Serve(ServeArgs),

    #[command(about = "Initialize the database and run migrations")]
    Init,

    #[command(about = "Create, inspect and remove bots")]
    Bots {
        #[command(subcommand)]
        action: Option<BotsCommand>,
    },

    #[command(about = "Print the embed snippet and resolved iframe URL for a bot")]
    Snippet(SnippetArgs),

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A broken config is reported by the command that needs it.
    let logging = MultibotConfig::load()
        .map(|c| c.logging)
        .unwrap_or_default();
    init_logging(&logging, cli.verbose, cli.json_logs);

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<MultibotError>() {
                Some(err) => eprint!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(err)),
                None => eprintln!("{}: {}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json || logging.json_format {
        registry.with(fmt::layer().json().with_target(false)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => handle_serve_command(args).await,
        Commands::Init => cmd_init().await,
        Commands::Bots { action } => handle_bots_command(action).await,
        Commands::Snippet(args) => handle_snippet_command(args).await,
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

async fn cmd_init() -> anyhow::Result<()> {
    println!("{}", "Initializing Multibot...".cyan().bold());
    println!();

    let config = MultibotConfig::load()?;
    println!(
        "  {} Database URL: {}",
        "→".blue(),
        mask_password(&config.database.url)
    );

    println!("  {} Connecting and running migrations...", "→".blue());
    let db = Database::open(&config.database, true).await?;

    println!("  {} Verifying connection...", "→".blue());
    db.health_check().await?;

    db.close().await;

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        "Database initialized successfully!".green()
    );

    Ok(())
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Multibot Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!("  {:<15} {}", "Widget file:".bold(), multibot_core::widget::WIDGET_SCRIPT_NAME);
        println!("  {:<15} {}", "Embed path:".bold(), multibot_core::widget::EMBED_PATH);
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("multibot {}", VERSION);
    }

    Ok(())
}

pub(crate) fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let before_auth = &url[..proto_end + 3];
            let after_at = &url[at_pos..];
            if let Some(colon_pos) = url[proto_end + 3..at_pos].find(':') {
                let user = &url[proto_end + 3..proto_end + 3 + colon_pos];
                return format!("{}{}:****{}", before_auth, user, after_at);
            }
        }
    }
    url.to_string()
}
