//! Configuration module for LLMO-Audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; missing values fall back to the documented defaults.
//!
//! # Example
//!
//! ```no_run
//! use llmo_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("llmo-audit.toml")).unwrap();
//! println!("Run budget: {:?}", config.run.run_timeout());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuditConfig, ContentConfig, FetcherConfig, RunConfig, WeightsConfig, DEFAULT_USER_AGENTS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
