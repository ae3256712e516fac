//! Settle demo - settle-demo command

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use settle_core::config::{AppConfig, EXTERNAL_LINKS, NAVIGATION_ITEMS};
use settle_core::hooks::{Debounced, Mounted};
use settle_core::reactive::{Effect, Signal};
use settle_core::timer::{TimerHost, TokioTimers};
use settle_core::utils::{class_names, format_time, is_external_url};

/// Settle - reactive UI-state hooks, in a terminal
#[derive(Parser)]
#[command(name = "settle-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the live clock page
    Clock {
        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Debounce lines read from stdin and print each settled query
    Search {
        /// Quiet period in milliseconds (default: from configuration)
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Clock { ticks } => run_clock(&config, ticks).await,
        Commands::Search { delay_ms } => {
            let delay = delay_ms.map(Duration::from_millis).unwrap_or_else(|| config.debounce_delay());
            run_search(delay).await
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => {
            let mut config = AppConfig::default();
            config.apply_env();
            Ok(config)
        }
    }
}

async fn run_clock(config: &AppConfig, ticks: Option<u64>) -> Result<()> {
    let timers: Arc<dyn TimerHost> = Arc::new(TokioTimers::new());
    let mounted = Mounted::new(timers.clone());
    let now = Signal::new(Local::now());

    let nav = class_names(NAVIGATION_ITEMS.iter().map(|item| item.label));
    println!("{} - {}", config.name, config.description);
    println!("[{nav}]");

    let host = config.site_host().unwrap_or_default();
    for link in EXTERNAL_LINKS {
        let marker = if is_external_url(link.href, &host) { " (external)" } else { "" };
        println!("  {}/{}: {}{marker}", link.group, link.label, link.href);
    }

    let render = {
        let now = now.clone();
        let is_mounted = mounted.signal();
        Effect::new(move || {
            // Nothing time-dependent before mount.
            if is_mounted.get() {
                println!("{}", format_time(&now.get()));
            } else {
                println!("--:--:--");
            }
        })
    };

    let mut interval = tokio::time::interval(config.clock_tick());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut elapsed = 0u64;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                now.set(Local::now());
                elapsed += 1;
                if ticks.is_some_and(|limit| elapsed >= limit) {
                    break;
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    render.dispose();
    tracing::info!(ticks = elapsed, "clock stopped");
    Ok(())
}

async fn run_search(delay: Duration) -> Result<()> {
    let timers: Arc<dyn TimerHost> = Arc::new(TokioTimers::new());
    let query = Debounced::new(String::new(), timers);

    let render = {
        let settled = query.signal();
        Effect::new(move || {
            let q = settled.get();
            if !q.is_empty() {
                println!("search: {q:?}");
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        query.observe(line, delay);
    }

    // Input closed: give the last value its quiet period.
    if query.is_pending() {
        tokio::time::sleep(delay + Duration::from_millis(10)).await;
    }

    query.teardown();
    render.dispose();
    Ok(())
}
