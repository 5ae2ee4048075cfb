//! pizzabox - オフライン送信キューの CLI
//!
//! ```text
//! pizzabox add --name Zesty --by Lernantino --size large --topping cheese
//! pizzabox add --offline --name Zesty --by Lernantino
//! pizzabox pending
//! pizzabox sync
//! pizzabox watch --offline   # stdin に online / offline を流す
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use pizzabox_core::app::{App, AppBuilder, Submission};
use pizzabox_core::config::{Config, ENV_API_BASE_URL, ENV_DATA_DIR};
use pizzabox_core::domain::{Connectivity, FlushOutcome, FlushReport, PizzaDraft, PizzaSize, QueuedRecord};
use pizzabox_core::observability::{QueueSnapshot, init_logging};
use pizzabox_core::ports::{CONFIRMATION_MESSAGE, Notifier};

#[derive(Debug, Parser)]
#[command(name = "pizzabox", about = "Offline-first pizza submissions")]
struct Cli {
    /// Overrides PIZZABOX_API_BASE_URL.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    /// Overrides PIZZABOX_DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a pizza, or save it locally with --offline.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "by")]
        created_by: String,
        #[arg(long, default_value_t = PizzaSize::default())]
        size: PizzaSize,
        #[arg(long = "topping")]
        toppings: Vec<String>,
        /// Skip the server and queue the pizza for the next sync.
        #[arg(long)]
        offline: bool,
    },
    /// Show what is waiting in the local queue.
    Pending,
    /// Flush the local queue once.
    Sync,
    /// Run the sync engine and read `online` / `offline` lines from stdin.
    Watch {
        /// Start offline; the first `online` line triggers a flush.
        #[arg(long)]
        offline: bool,
    },
    /// Drop everything in the local queue without submitting it.
    Clear,
}

/// Prints the confirmation the way the page would alert it.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn confirm(&self, report: &FlushReport) {
        println!("{CONFIRMATION_MESSAGE} ({} pizza(s), {})", report.submitted, report.flush_id);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging("info");
    let cli = Cli::parse();
    let overrides = [
        (ENV_API_BASE_URL, cli.api_base_url.clone()),
        (ENV_DATA_DIR, cli.data_dir.clone()),
    ];
    let config = Config::from_lookup(|name: &str| {
        overrides
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.clone())
            .or_else(|| std::env::var(name).ok())
    })
    .context("loading configuration")?;

    let initial = match &cli.command {
        Command::Watch { offline: true } => Connectivity::Offline,
        _ => Connectivity::Online,
    };
    let app = AppBuilder::new(config)
        .with_notifier(Arc::new(ConsoleNotifier))
        .with_initial_connectivity(initial)
        .build()
        .await
        .context("building app")?;

    match cli.command {
        Command::Add {
            name,
            created_by,
            size,
            toppings,
            offline,
        } => {
            let draft = toppings
                .into_iter()
                .fold(PizzaDraft::new(name, created_by).with_size(size), |draft, topping| {
                    draft.with_topping(topping)
                });
            add(&app, &draft, offline).await?;
        }
        Command::Pending => {
            let snapshot = QueueSnapshot::capture(app.queue.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Sync => match app.engine.flush().await? {
            FlushOutcome::Idle => println!("nothing to sync"),
            FlushOutcome::Flushed(report) => {
                println!("{}", serde_json::to_string_pretty(&report.created)?)
            }
        },
        Command::Watch { .. } => watch(&app).await?,
        Command::Clear => {
            let removed = app.queue.clear().await?;
            println!("removed {removed} queued pizza(s)");
        }
    }

    Ok(())
}

async fn add(app: &App, draft: &PizzaDraft, offline: bool) -> anyhow::Result<()> {
    if offline {
        let key = app
            .submissions
            .save_record(QueuedRecord::from_payload(draft)?)
            .await?;
        println!("saved {key} for later submission");
        return Ok(());
    }

    match app.submissions.submit_pizza(draft).await? {
        Submission::Created(created) => println!("{}", serde_json::to_string_pretty(&created)?),
        Submission::Queued(key) => println!("server unreachable; saved {key} for later submission"),
    }
    Ok(())
}

async fn watch(app: &App) -> anyhow::Result<()> {
    let handle = app.start();
    info!(online = app.monitor.is_online(), "watching connectivity on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "online" => { app.monitor.report(Connectivity::Online); }
                    "offline" => { app.monitor.report(Connectivity::Offline); }
                    "" => {}
                    other => warn!(input = other, "expected `online` or `offline`"),
                }
            }
        }
    }

    handle.shutdown_and_join().await;
    Ok(())
}
