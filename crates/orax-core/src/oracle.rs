//! The three oracle contracts as the client sees them.
//!
//! Each oracle exposes one entry point and emits one answer event. The
//! bindings carry the derived selector and event topic so callers never
//! touch raw signatures.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::abi;
use crate::config::Contracts;

/// Placeholder shown when the chat oracle errors out or answers nothing.
pub const UNKNOWN_ANSWER: &str = "I don't know the answer to that one.";

/// Placeholder shown when the knowledge oracle cannot parse the question.
pub const CANNOT_UNDERSTAND: &str = "Sorry, I can't understand your question.";

/// The oracle contracts the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// Diesel/LPG price oracle: `update()` -> `newDieselPrice(string)`.
    DieselPrice,
    /// General Q&A oracle: `query(string)` -> `newWolframAnswer(string)`.
    Knowledge,
    /// Chat-bot oracle: `ask(string)` -> `newAskAnswer(string)`.
    Chat,
}

impl OracleKind {
    /// All oracle kinds, in display order.
    pub fn all() -> [OracleKind; 3] {
        [
            OracleKind::DieselPrice,
            OracleKind::Knowledge,
            OracleKind::Chat,
        ]
    }

    /// Human-readable name for status lines and logs.
    pub fn display_name(self) -> &'static str {
        match self {
            OracleKind::DieselPrice => "price oracle",
            OracleKind::Knowledge => "knowledge oracle",
            OracleKind::Chat => "chat oracle",
        }
    }

    fn entry_signature(self) -> &'static str {
        match self {
            OracleKind::DieselPrice => "update()",
            OracleKind::Knowledge => "query(string)",
            OracleKind::Chat => "ask(string)",
        }
    }

    fn event_signature(self) -> &'static str {
        match self {
            OracleKind::DieselPrice => "newDieselPrice(string)",
            OracleKind::Knowledge => "newWolframAnswer(string)",
            OracleKind::Chat => "newAskAnswer(string)",
        }
    }
}

impl std::fmt::Display for OracleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A deployed oracle instance: address plus derived ABI constants.
#[derive(Debug, Clone)]
pub struct OracleBinding {
    pub kind: OracleKind,
    pub address: String,
    pub selector: [u8; 4],
    pub event_topic: String,
}

impl OracleBinding {
    fn new(kind: OracleKind, address: &str) -> Result<Self> {
        if address.is_empty() {
            bail!(
                "no contract address configured for the {kind} \
                 (set [contracts] in config.toml)"
            );
        }
        Ok(Self {
            kind,
            address: address.to_string(),
            selector: abi::selector(kind.entry_signature()),
            event_topic: abi::event_topic(kind.event_signature()),
        })
    }
}

/// The full set of oracle bindings for a session.
#[derive(Debug, Clone)]
pub struct Bindings {
    diesel_price: OracleBinding,
    knowledge: OracleBinding,
    chat: OracleBinding,
}

impl Bindings {
    /// Builds bindings from configured contract addresses.
    ///
    /// # Errors
    /// Returns an error if any address is missing.
    pub fn from_contracts(contracts: &Contracts) -> Result<Self> {
        Ok(Self {
            diesel_price: OracleBinding::new(OracleKind::DieselPrice, &contracts.diesel_price)?,
            knowledge: OracleBinding::new(OracleKind::Knowledge, &contracts.knowledge)?,
            chat: OracleBinding::new(OracleKind::Chat, &contracts.chat)?,
        })
    }

    /// Returns the binding for an oracle kind.
    pub fn get(&self, kind: OracleKind) -> &OracleBinding {
        match kind {
            OracleKind::DieselPrice => &self.diesel_price,
            OracleKind::Knowledge => &self.knowledge,
            OracleKind::Chat => &self.chat,
        }
    }
}

/// Call data for the price oracle's `update()` entry point.
pub fn price_update_call(binding: &OracleBinding) -> String {
    abi::encode_call(binding.selector)
}

/// Call data for the knowledge oracle's `query(string)` entry point.
pub fn knowledge_query_call(binding: &OracleBinding, question: &str) -> String {
    abi::encode_call_string(binding.selector, question)
}

/// Call data for the chat oracle's `ask(string)` entry point.
///
/// The contract forwards its argument to the off-chain oracle verbatim, so
/// the question is wrapped into the fetch formula the oracle service
/// understands: `json(<gateway>/ask?question=<urlencoded>).result`.
pub fn chat_ask_call(binding: &OracleBinding, gateway_url: &str, question: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(question.as_bytes()).collect();
    let formula = format!("json({gateway_url}/ask?question={encoded}).result");
    abi::encode_call_string(binding.selector, &formula)
}

/// The price oracle's answer payload.
///
/// Values stay strings: they are rendered verbatim, never computed with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceQuote {
    pub diesel: String,
    pub lpg: String,
}

impl PriceQuote {
    /// Parses the JSON blob carried by a `newDieselPrice` event.
    ///
    /// # Errors
    /// Returns an error if the payload is not the expected JSON shape.
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).context("malformed price payload")
    }
}
