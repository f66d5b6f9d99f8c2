//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime
//! executes against the oracle session. This keeps the reducer pure: it
//! only mutates state and returns effects, never performs I/O.

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Ask the price oracle to fetch fresh prices.
    SubmitPriceUpdate,

    /// Send a question to the knowledge oracle.
    SubmitKnowledgeQuery { question: String },

    /// Send a question to the chat oracle.
    SubmitChatAsk { question: String },
}
