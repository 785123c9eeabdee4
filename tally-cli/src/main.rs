use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tally_core::Transaction;
use tally_ingest::{load_transactions, FetchMode, HttpPageSource};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod menu;
mod state;

use config::Config;
use menu::Choice;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Fetch, clean, and summarize transactions from a paginated feed"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Feed base URL (pages are {base}/{n}.json); overrides config
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Fetch one page at a time
    #[arg(long, global = true, conflicts_with = "concurrency")]
    sequential: bool,

    /// Maximum page requests in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Log filter when RUST_LOG is unset (e.g. info, tally_ingest=debug)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,

    /// Print the total balance
    Balance,

    /// Print totals per ledger
    Ledgers,

    /// Print the running daily balance
    Running,

    /// Print every cleaned transaction
    List,

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut cfg = config::load_config()?;
    apply_overrides(&mut cfg, &cli);

    match cli.command.unwrap_or(Command::Menu) {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Menu => {
            let txns = fetch(&cfg).await?;
            let stdin = std::io::stdin();
            menu::run_menu(&txns, stdin.lock(), std::io::stdout())?;
        }

        Command::Balance => print_view(Choice::Balance, &fetch(&cfg).await?),
        Command::Ledgers => print_view(Choice::Ledgers, &fetch(&cfg).await?),
        Command::Running => print_view(Choice::Running, &fetch(&cfg).await?),
        Command::List => print_view(Choice::List, &fetch(&cfg).await?),
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(cfg: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.base_url {
        cfg.source.base_url = url.clone();
    }
    if cli.sequential {
        cfg.fetch.mode = "sequential".to_string();
    }
    if let Some(n) = cli.concurrency {
        cfg.fetch.mode = "concurrent".to_string();
        cfg.fetch.concurrency = n;
    }
}

fn print_view(choice: Choice, txns: &[Transaction]) {
    if let Some(text) = menu::render(choice, txns) {
        println!("{}", text.trim_end());
    }
}

/// Load every transaction or fail; Ctrl-C cancels an in-flight fetch.
async fn fetch(cfg: &Config) -> Result<Vec<Transaction>> {
    let options = cfg.fetch_options()?;
    let source = HttpPageSource::new(&cfg.source.base_url, cfg.page_timeout())
        .context("build HTTP client")?;

    let cancel = CancellationToken::new();
    let loaded = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        let loaded = loaded.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
                // Once loaded nothing watches the token; leave like an unhandled SIGINT.
                if loaded.load(Ordering::SeqCst) {
                    std::process::exit(130);
                }
            }
        });
    }

    let concurrency = match options.mode {
        FetchMode::Sequential => 1,
        FetchMode::Concurrent { concurrency } => concurrency,
    };
    info!(base_url = %cfg.source.base_url, concurrency, "loading transactions");

    let txns = load_transactions(&source, &options, &cancel)
        .await
        .with_context(|| format!("loading transactions from {}", cfg.source.base_url))?;
    loaded.store(true, Ordering::SeqCst);

    info!(count = txns.len(), "transactions loaded");
    Ok(txns)
}
