//! CLI command handlers.

pub mod accounts;
pub mod ask;
pub mod chat;
pub mod price;

use std::time::Duration;

use anyhow::Result;
use orax_core::core::events::SessionEvent;
use orax_core::core::interrupt;
use orax_core::core::session::SessionEventReceiver;
use orax_core::oracle::OracleKind;

/// Waits for the answer event of one oracle, ignoring events for the
/// others.
///
/// Returns `None` when the oracle answered with an empty payload or its
/// watcher reported an error, matching the placeholder behavior of the
/// dashboard.
///
/// # Errors
/// Returns an error if the submission was rejected, the wait times out,
/// or Ctrl+C is pressed.
async fn await_answer(
    rx: &mut SessionEventReceiver,
    kind: OracleKind,
    wait: Duration,
) -> Result<Option<String>> {
    let deadline = tokio::time::Instant::now() + wait;

    loop {
        let event = tokio::select! {
            () = interrupt::wait_for_interrupt() => {
                return Err(interrupt::InterruptedError.into());
            }
            () = tokio::time::sleep_until(deadline) => {
                anyhow::bail!(
                    "timed out after {}s waiting for the {kind} to answer",
                    wait.as_secs()
                );
            }
            event = rx.recv() => match event {
                Some(event) => event,
                None => anyhow::bail!("session closed before the {kind} answered"),
            },
        };

        if event.kind() != kind {
            continue;
        }
        match event {
            SessionEvent::Submitted { tx_hash, .. } => {
                tracing::info!(%tx_hash, "waiting for the answer event");
            }
            SessionEvent::SubmitFailed { message, .. } => {
                anyhow::bail!("the {kind} rejected the request: {message}");
            }
            SessionEvent::Answer { answer, .. } => return Ok(answer),
            SessionEvent::WatchError { message, .. } => {
                tracing::warn!(%message, "watch error while waiting");
                return Ok(None);
            }
        }
    }
}
