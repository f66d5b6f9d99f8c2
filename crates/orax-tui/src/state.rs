//! Application state for the TUI.
//!
//! One struct per panel plus the shared status line. The per-oracle
//! `pending` fields are the dispatcher's "pending question" slots: a
//! newer submission overwrites the older one (last-write-wins, see the
//! session docs), and the matching answer event consumes the slot.

use chrono::{DateTime, Local};

/// Which panel owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Price,
    Knowledge,
    Chat,
}

impl Panel {
    /// The next panel in Tab order.
    pub fn next(self) -> Panel {
        match self {
            Panel::Price => Panel::Knowledge,
            Panel::Knowledge => Panel::Chat,
            Panel::Chat => Panel::Price,
        }
    }
}

/// Price oracle panel: two read-only fields and a refresh action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceState {
    pub diesel: String,
    pub lpg: String,
    /// A refresh transaction is in flight.
    pub refreshing: bool,
}

impl Default for PriceState {
    fn default() -> Self {
        Self {
            diesel: "-".to_string(),
            lpg: "-".to_string(),
            refreshing: false,
        }
    }
}

/// Knowledge oracle panel: one question input, one answer line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeState {
    pub input: String,
    pub answer: String,
    /// Question awaiting its answer event.
    pub pending: Option<String>,
}

/// One question/answer pair in the chat history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    pub question: String,
    pub answer: String,
    pub at: DateTime<Local>,
}

/// Chat oracle panel: input, newest-first history, and a submit control
/// that stays disabled while an answer is outstanding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub input: String,
    /// Newest exchange first, mirroring the original's prepend.
    pub history: Vec<ChatExchange>,
    /// Question awaiting its answer event.
    pub pending: Option<String>,
    pub submit_enabled: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            input: String::new(),
            history: Vec::new(),
            pending: None,
            submit_enabled: true,
        }
    }
}

impl ChatState {
    /// Label for the submit control, tracking its enabled state.
    pub fn submit_label(&self) -> &'static str {
        if self.submit_enabled {
            "Enter to ask"
        } else {
            "Waiting for an answer..."
        }
    }
}

/// Top-level TUI state. Everything the reducer mutates lives here; the
/// runtime owns the session and terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub should_quit: bool,
    pub focus: Panel,
    /// Sender account, shown in the status bar.
    pub account: String,
    /// Status line text.
    pub status: String,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
    pub price: PriceState,
    pub knowledge: KnowledgeState,
    pub chat: ChatState,
}

impl AppState {
    /// Creates the initial state for a connected session.
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            focus: Panel::Chat,
            account: account.into(),
            status: "Ready.".to_string(),
            spinner_frame: 0,
            price: PriceState::default(),
            knowledge: KnowledgeState::default(),
            chat: ChatState::default(),
        }
    }

    /// True while any oracle request is awaiting its event.
    pub fn is_busy(&self) -> bool {
        self.price.refreshing || self.knowledge.pending.is_some() || self.chat.pending.is_some()
    }
}
