//! Configuration module for Paper-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key has a default, so a missing file section falls back to
//! the built-in target.
//!
//! # Example
//!
//! ```no_run
//! use paper_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling from: {}", config.source.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
