//! UI event types.

use orax_core::core::events::SessionEvent;

/// Events processed by the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Animation/render cadence tick.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// An event drained from the oracle session channel.
    Session(SessionEvent),
}
