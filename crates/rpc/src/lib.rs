//! Coffer RPC - CLI orchestrator
//!
//! This crate provides the `coffer` binary and command orchestration over a
//! journaled checking account.

pub mod commands;
pub mod context;

pub use context::AppContext;
