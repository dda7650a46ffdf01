//! # Bellhop — durable one-off reminders
//!
//! The command layer over the reminder scheduler: it hands already-separated
//! (task, time expression) pairs to the manager and raw IDs to delete.
//!
//! Usage:
//!   bellhop add "call mom" --at "5:30 pm"    # clock time, rolls to tomorrow if passed
//!   bellhop add "drink water" --at "10 minutes"
//!   bellhop list
//!   bellhop delete 3
//!   bellhop run                              # foreground: fire due reminders

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bellhop_core::{BellhopConfig, SystemClock};
use bellhop_scheduler::{ConsoleNotifier, Reminder, ReminderManager, ReminderStore, TimeResolver};

#[derive(Parser)]
#[command(name = "bellhop", version, about = "⏰ Bellhop — durable one-off reminders")]
struct Cli {
    /// Database path (default: from config, ~/.bellhop/reminders.db)
    #[arg(long)]
    db: Option<String>,

    /// IANA timezone for time expressions (default: from config)
    #[arg(long)]
    timezone: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Schedule a reminder
    Add {
        /// What to be reminded of
        text: String,
        /// When: a duration ("10 minutes") or clock time ("5:30 pm", "tomorrow 8am")
        #[arg(long)]
        at: String,
    },
    /// List reminders, soonest first
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete a reminder by ID
    Delete { id: i64 },
    /// Run in the foreground and fire reminders as they come due
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "bellhop=debug,bellhop_scheduler=debug"
    } else {
        "bellhop=info,bellhop_scheduler=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = BellhopConfig::load()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(tz) = &cli.timezone {
        config.timezone = tz.clone();
    }
    let tz = config.tz()?;

    let db_path = shellexpand::tilde(&config.db_path).to_string();
    let store = Arc::new(ReminderStore::open(Path::new(&db_path))?);
    let manager = ReminderManager::new(
        store,
        TimeResolver::new(tz),
        Arc::new(ConsoleNotifier),
        Arc::new(SystemClock),
    )?;

    match cli.command {
        Command::Add { text, at } => {
            let reminder = manager.add(&text, &at)?;
            println!(
                "📅 Reminder {} set for {}: {}",
                reminder.id,
                format_local(&reminder, tz),
                reminder.text
            );
            println!("   (fires while `bellhop run` is active)");
        }
        Command::List { json } => {
            let reminders = manager.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reminders)?);
            } else if reminders.is_empty() {
                println!("No reminders.");
            } else {
                for r in &reminders {
                    println!("{:>4}  {}  {}", r.id, format_local(r, tz), r.text);
                }
            }
        }
        Command::Delete { id } => {
            if manager.delete(id)? {
                println!("🗑 Deleted reminder {id}.");
            } else {
                println!("No reminder with ID {id}.");
            }
        }
        Command::Run => {
            let pending = manager.list()?;
            println!(
                "⏰ Bellhop running ({} reminder(s) on file). Ctrl-C to stop.",
                pending.len()
            );
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for ctrl-c")?;
            manager.shutdown();
            println!("\nGoodbye.");
        }
    }

    Ok(())
}

fn format_local(reminder: &Reminder, tz: chrono_tz::Tz) -> String {
    reminder.when_in(&tz).format("%I:%M %p on %b %d").to_string()
}
