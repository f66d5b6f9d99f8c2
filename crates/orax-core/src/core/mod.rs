//! Session layer: the event dispatcher and its support types.

pub mod events;
pub mod interrupt;
pub mod session;
