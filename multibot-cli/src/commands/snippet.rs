use clap::Args;
use colored::Colorize;
use multibot_core::models::{embed_snippet, script_src};
use multibot_core::{BotConfigClient, FrameError, MemoryHost, MultibotConfig, WidgetController};
use tracing::warn;

const DEFAULT_PAGE: &str = "https://www.example.com/";

#[derive(Args, Debug)]
pub struct SnippetArgs {
    #[arg(help = "Bot id to embed")]
    pub bot_id: String,

    #[arg(short, long, help = "Origin serving the widget (defaults to server.public_origin)")]
    pub origin: Option<String>,

    #[arg(long, default_value = DEFAULT_PAGE, help = "Host page used to preview resolution")]
    pub page: String,

    #[arg(long, help = "Confirm the bot loads from the origin")]
    pub check: bool,
}

/// What the widget resolves on a host page that carries the snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetPreview {
    pub snippet: String,
    pub iframe_src: String,
    pub frame_origin: Option<String>,
}

pub fn preview(origin: &str, bot_id: &str, page: &str) -> anyhow::Result<SnippetPreview> {
    let host = MemoryHost::new(page).with_auto_init_script(script_src(origin, bot_id));
    let mut widget = WidgetController::new(host);
    widget.on_dom_content_loaded();

    let target = widget
        .target()
        .ok_or_else(|| anyhow::anyhow!("widget could not resolve '{}' from page {}", origin, page))?;

    Ok(SnippetPreview {
        snippet: embed_snippet(origin, bot_id),
        iframe_src: target.frame_src(),
        frame_origin: target.frame_origin(page),
    })
}

pub async fn handle_snippet_command(args: SnippetArgs) -> anyhow::Result<()> {
    let origin = match args.origin {
        Some(origin) => origin,
        None => match MultibotConfig::load() {
            Ok(config) => config.server.public_origin,
            Err(e) => {
                warn!("Could not load configuration ({}); using defaults", e);
                MultibotConfig::default().server.public_origin
            }
        },
    };

    let preview = preview(&origin, &args.bot_id, &args.page)?;

    println!("{}", "Embed snippet".cyan().bold());
    println!();
    println!("  {}", preview.snippet);
    println!();
    println!("  {:<14} {}", "Iframe URL:".bold(), preview.iframe_src);
    println!(
        "  {:<14} {}",
        "Frame origin:".bold(),
        preview.frame_origin.as_deref().unwrap_or("-")
    );

    if args.check {
        println!();
        match BotConfigClient::new(&origin).fetch(&args.bot_id).await {
            Ok(bot) => println!(
                "  {} Bot '{}' is live",
                "✓".green().bold(),
                bot.name
            ),
            Err(e) => {
                println!("  {} {}", "✗".red().bold(), e.user_message());
                return Err(e.into());
            }
        }
    }

    Ok(())
}
