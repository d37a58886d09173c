//! Action-button engine for EVM contracts
//!
//! Turns a JSON button definition into a concrete contract call: picks the
//! target function from the ABI, resolves placeholder and embedded-read
//! arguments, makes sure the wallet is on the right chain, then reads or
//! submits a transaction.

pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod store;

pub use crate::core::{Engine, Execution, Invocation};
pub use crate::domain::{ButtonConfig, EngineError, ErrorKind, UserInputs};
