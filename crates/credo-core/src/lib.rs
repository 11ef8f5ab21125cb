//! Credo Core - Shared types for the credo component mesh.
//!
//! This crate provides the belief primitives, wire formats, and tracing
//! macros that every component in the mesh depends on.

pub mod belief;
pub mod logging;
pub mod wire;

pub use belief::{Belief, CommitDecision, CommitLog};
pub use wire::{BLS_SBA, BeliefCommit, BeliefSnapshot, ControlRequest, Sba};

// The credo_* macros resolve tracing through this path at their
// expansion sites.
#[doc(hidden)]
pub use tracing;

/// Crate version, surfaced by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
