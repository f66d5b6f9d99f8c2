//! Core plumbing for the orax oracle client.
//!
//! This crate knows how to talk to an Ethereum node over JSON-RPC, how to
//! encode the three oracle contracts' entry points, and how to bridge
//! contract-emitted answer events into a channel the UI can drain.

pub mod abi;
pub mod config;
pub mod core;
pub mod logging;
pub mod oracle;
pub mod provider;
