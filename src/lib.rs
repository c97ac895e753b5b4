//! Waitfor - startup-order synchronization for containers
//!
//! Blocks until a dependency is reachable (or unreachable), then replaces
//! itself with a follow-up command.

pub mod cli;
pub mod config;
pub mod error;
pub mod handoff;
pub mod logging;
pub mod wait_for;
