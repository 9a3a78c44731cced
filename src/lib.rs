#![forbid(unsafe_code)]

//! `pipe-relay` — relay stdin lines to a named pipe and print the replies.
//!
//! Each line read from standard input is written to an existing named pipe;
//! the reply is awaited for a bounded time and copied verbatim to standard
//! output. The binary in `main.rs` wires these modules to the process
//! streams.

pub mod channel;
pub mod cli;
pub mod config;
pub mod errors;
pub mod relay;

pub use config::{RelayConfig, WaitBound};
pub use errors::{AppError, Result};
pub use relay::{Relay, RelaySummary, StopReason};
