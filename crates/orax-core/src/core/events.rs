//! Session event types.
//!
//! This module defines the contract for events emitted by the oracle
//! session. The UI drains these from a channel and maps them onto panel
//! updates; one-shot commands await the matching variant.

use serde::{Deserialize, Serialize};

use crate::oracle::OracleKind;

/// Events emitted by the oracle session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A request transaction was accepted by the node.
    Submitted { kind: OracleKind, tx_hash: String },

    /// A request transaction could not be submitted. Terminal for that
    /// operation; nothing is retried.
    SubmitFailed { kind: OracleKind, message: String },

    /// The oracle emitted its answer event. `None` carries the
    /// empty-payload case; consumers substitute the fixed placeholder.
    Answer {
        kind: OracleKind,
        answer: Option<String>,
    },

    /// Event delivery failed (poll error or undecodable log data).
    /// Consumers treat this like an empty answer; the watcher keeps
    /// polling.
    WatchError { kind: OracleKind, message: String },
}

impl SessionEvent {
    /// Returns the oracle this event belongs to.
    pub fn kind(&self) -> OracleKind {
        match self {
            SessionEvent::Submitted { kind, .. }
            | SessionEvent::SubmitFailed { kind, .. }
            | SessionEvent::Answer { kind, .. }
            | SessionEvent::WatchError { kind, .. } => *kind,
        }
    }
}
