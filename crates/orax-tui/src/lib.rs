//! Full-screen TUI for the ORAX oracle client.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
use orax_core::config::Config;
use orax_core::core::session::OracleSession;
pub use runtime::TuiRuntime;

/// Runs the interactive oracle dashboard.
pub async fn run_interactive(config: &Config) -> Result<()> {
    // The dashboard requires a terminal to render the TUI
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The dashboard requires a terminal.\n\
             Use `orax price`, `orax ask` or `orax chat` for non-interactive queries."
        );
    }

    let (session, session_rx) = OracleSession::connect(config).await?;

    // Print pre-TUI info to stderr (will be replaced by alternate screen)
    let mut err = stderr();
    writeln!(err, "ORAX Oracle Dashboard")?;
    writeln!(err, "Node: {}", config.rpc_url)?;
    writeln!(err, "Account: {}", session.account())?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(session, session_rx)?;
    runtime.run()?;

    // Print goodbye after TUI exits (terminal restored)
    writeln!(stderr(), "Goodbye!")?;

    Ok(())
}
