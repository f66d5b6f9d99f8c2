//! CLI entry and dispatch.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use orax_core::core::interrupt;
use orax_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "orax")]
#[command(version = "0.1")]
#[command(about = "Terminal client for on-chain oracles")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON-RPC endpoint of the node (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    rpc_url: Option<String>,

    /// Index into the node's account list to send from (overrides config)
    #[arg(long, value_name = "N", global = true)]
    account_index: Option<usize>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List the node's accounts
    Accounts,

    /// Request a fuel price refresh and print the result
    Price {
        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Ask the knowledge oracle a question
    Ask {
        /// The question to ask
        #[arg(value_name = "QUESTION")]
        question: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Ask the chat oracle a question
    Chat {
        /// The question to ask
        #[arg(value_name = "QUESTION")]
        question: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Common wait arguments for commands that await an answer event.
#[derive(clap::Args, Debug, Clone)]
struct WaitArgs {
    /// Seconds to wait for the answer event before giving up
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    timeout: u64,
}

impl WaitArgs {
    fn duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;

    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }
    if let Some(index) = cli.account_index {
        config.account_index = index;
    }

    // Dashboard mode owns stderr via the alternate screen, so its logs
    // go to files; one-shot commands log to stderr.
    let Some(command) = cli.command else {
        let _guard = logging::init_file_logging(&config::paths::logs_dir())?;
        return run_dashboard(&config).await;
    };
    logging::init_stderr_logging();

    match command {
        Commands::Accounts => commands::accounts::run(&config).await,
        Commands::Price { wait } => commands::price::run(&config, wait.duration()).await,
        Commands::Ask { question, wait } => {
            commands::ask::run(&config, &question, wait.duration()).await
        }
        Commands::Chat { question, wait } => {
            commands::chat::run(&config, &question, wait.duration()).await
        }
    }
}

#[cfg(feature = "tui")]
async fn run_dashboard(config: &config::Config) -> Result<()> {
    orax_tui::run_interactive(config).await
}

#[cfg(not(feature = "tui"))]
async fn run_dashboard(_config: &config::Config) -> Result<()> {
    anyhow::bail!("this build has no dashboard; use the price/ask/chat subcommands")
}
