use chrono::{DateTime, Utc};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use multibot_core::models::embed_snippet;
use multibot_core::{Bot, BotStore, BotUpdate, Database, MultibotConfig, MultibotError, NewBot};

#[derive(Subcommand)]
pub enum BotsCommand {
    #[command(about = "List bots, newest first")]
    List {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,

        #[arg(short, long, help = "Include inactive bots")]
        all: bool,
    },

    #[command(about = "Create a bot")]
    Create {
        #[arg(help = "Display name")]
        name: String,

        #[arg(short = 'p', long, help = "Instructions the bot follows")]
        system_prompt: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        company: Option<String>,
    },

    #[command(about = "Show one bot and its embed snippet")]
    Get {
        #[arg(help = "Bot id")]
        id: String,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Change fields of a bot")]
    Update {
        #[arg(help = "Bot id")]
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 'p', long)]
        system_prompt: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        company: Option<String>,

        #[arg(long, conflicts_with = "deactivate")]
        activate: bool,

        #[arg(long)]
        deactivate: bool,
    },

    #[command(about = "Delete a bot")]
    Delete {
        #[arg(help = "Bot id")]
        id: String,
    },
}

pub async fn handle_bots_command(cmd: Option<BotsCommand>) -> anyhow::Result<()> {
    let config = MultibotConfig::load()?;
    let db = Database::open(&config.database, false).await?;
    let repo = db.bots();
    let origin = config.server.public_origin.clone();

    let result = match cmd.unwrap_or(BotsCommand::List {
        format: "text".to_string(),
        all: false,
    }) {
        BotsCommand::List { format, all } => cmd_bots_list(&repo, &format, all).await,
        BotsCommand::Create {
            name,
            system_prompt,
            description,
            company,
        } => {
            let new_bot = NewBot {
                name: Some(name),
                description,
                company_name: company,
                system_prompt: Some(system_prompt),
            };
            cmd_bots_create(&repo, new_bot, &origin).await
        }
        BotsCommand::Get { id, format } => cmd_bots_get(&repo, &id, &format, &origin).await,
        BotsCommand::Update {
            id,
            name,
            system_prompt,
            description,
            company,
            activate,
            deactivate,
        } => {
            let changes = BotUpdate {
                name,
                description,
                company_name: company,
                system_prompt,
                is_active: active_flag(activate, deactivate),
            };
            cmd_bots_update(&repo, &id, changes).await
        }
        BotsCommand::Delete { id } => cmd_bots_delete(&repo, &id).await,
    };

    db.close().await;
    result
}

fn active_flag(activate: bool, deactivate: bool) -> Option<bool> {
    match (activate, deactivate) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

async fn cmd_bots_list(store: &dyn BotStore, format: &str, all: bool) -> anyhow::Result<()> {
    let bots = if all {
        store.get_all().await
    } else {
        store.list_active().await
    }
    .map_err(MultibotError::from)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&bots)?);
        return Ok(());
    }

    if bots.is_empty() {
        println!("{}", "No bots found.".yellow());
        println!(
            "{}",
            "Run 'multibot bots create <name> --system-prompt <text>' to add one.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Bots".cyan().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("Name").fg(Color::White),
            Cell::new("Company").fg(Color::White),
            Cell::new("Status").fg(Color::White),
            Cell::new("Created").fg(Color::White),
            Cell::new("Updated").fg(Color::White),
        ]);

    for bot in &bots {
        let status_cell = if bot.is_active {
            Cell::new("Active").fg(Color::Green)
        } else {
            Cell::new("Inactive").fg(Color::DarkGrey)
        };

        table.add_row(vec![
            Cell::new(&bot.id),
            Cell::new(&bot.name),
            Cell::new(bot.company_name.as_deref().unwrap_or("-")),
            status_cell,
            Cell::new(bot.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(format_age(&bot.updated_at, Utc::now())),
        ]);
    }

    println!("{table}");
    println!();
    println!("  Total: {} bots", bots.len());

    Ok(())
}

async fn cmd_bots_create(store: &dyn BotStore, new_bot: NewBot, origin: &str) -> anyhow::Result<()> {
    let bot = new_bot.into_bot()?;
    let created = store.create(&bot).await.map_err(MultibotError::from)?;

    println!(
        "{} {}",
        "✓".green().bold(),
        format!("Created bot '{}'", created.name).green()
    );
    println!("  {:<10} {}", "ID:".bold(), created.id);
    println!();
    println!("  {}", "Embed snippet:".bold());
    println!("    {}", created.embed_snippet(origin));

    Ok(())
}

async fn cmd_bots_get(
    store: &dyn BotStore,
    id: &str,
    format: &str,
    origin: &str,
) -> anyhow::Result<()> {
    let bot = find_bot(store, id).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&bot)?);
        return Ok(());
    }

    print_bot(&bot);
    println!();
    println!("  {}", "Embed snippet:".bold());
    println!("    {}", embed_snippet(origin, &bot.id));

    Ok(())
}

async fn cmd_bots_update(store: &dyn BotStore, id: &str, changes: BotUpdate) -> anyhow::Result<()> {
    if changes.is_empty() {
        println!("{}", "Nothing to update.".yellow());
        return Ok(());
    }

    let mut bot = find_bot(store, id).await?;
    changes.apply(&mut bot)?;

    let updated = store
        .update(&bot)
        .await
        .map_err(MultibotError::from)?
        .ok_or_else(|| MultibotError::BotNotFound(id.to_string()))?;

    println!("{} {}", "✓".green().bold(), "Bot updated".green());
    print_bot(&updated);

    Ok(())
}

async fn cmd_bots_delete(store: &dyn BotStore, id: &str) -> anyhow::Result<()> {
    let deleted = store.delete(id).await.map_err(MultibotError::from)?;
    if !deleted {
        return Err(MultibotError::BotNotFound(id.to_string()).into());
    }

    println!(
        "{} {}",
        "✓".green().bold(),
        format!("Deleted bot {}", id).green()
    );
    Ok(())
}

async fn find_bot(store: &dyn BotStore, id: &str) -> anyhow::Result<Bot> {
    store
        .get_by_id(id)
        .await
        .map_err(MultibotError::from)?
        .ok_or_else(|| MultibotError::BotNotFound(id.to_string()).into())
}

fn print_bot(bot: &Bot) {
    println!("{}", bot.name.cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  {:<10} {}", "ID:".bold(), bot.id);
    println!(
        "  {:<10} {}",
        "Status:".bold(),
        if bot.is_active {
            "Active".green()
        } else {
            "Inactive".dimmed()
        }
    );
    if let Some(company) = &bot.company_name {
        println!("  {:<10} {}", "Company:".bold(), company);
    }
    if let Some(description) = &bot.description {
        println!("  {:<10} {}", "About:".bold(), description);
    }
    println!(
        "  {:<10} {} ({})",
        "Updated:".bold(),
        format_datetime(&bot.updated_at),
        format_age(&bot.updated_at, Utc::now())
    );
    println!();
    println!("  {}", "System prompt:".bold());
    for line in bot.system_prompt.lines() {
        println!("    {}", line.dimmed());
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_age(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - *dt).num_seconds().max(0);
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}
