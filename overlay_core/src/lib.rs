#![forbid(unsafe_code)]

//! Core domain model and decision logic for the poly-substance risk overlay.
//!
//! This crate provides:
//! - Domain types (log entries, categories, levels, results)
//! - Substance classification
//! - Window selection, stack scoring and interaction rules
//! - Rebound prediction and overall aggregation
//! - Configuration, logging and log-file loading
//!
//! All output is heuristic, conservative harm-reduction information.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod classifier;
pub mod window;
pub mod rationale;
pub mod stacking;
pub mod rules;
pub mod rebound;
pub mod aggregate;
pub mod engine;
pub mod log_source;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, EngineConfig};
pub use classifier::{classify, resolve, Classification};
pub use engine::{assess, assess_with};
pub use log_source::load_entries;
