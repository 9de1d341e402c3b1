//! game-core: Shared infrastructure for the absurd game workspace.
pub mod config;
pub mod error;
pub mod observability;
pub mod retry;

pub use tracing;
