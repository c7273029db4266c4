//! Shortsmith Common Utilities
//!
//! Shared infrastructure for all Shortsmith crates:
//! - Error taxonomy, pipeline stages and result aliases
//! - Configuration loading
//! - Tracing/logging initialization
//! - Deterministic output naming
//! - External program lookup

pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod process;

pub use config::*;
pub use error::*;
pub use naming::safe_name;
