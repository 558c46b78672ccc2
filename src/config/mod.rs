//! Configuration module for Scrape-n-Serve
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so a missing file or an empty one is a valid
//! configuration.
//!
//! # Example
//!
//! ```no_run
//! use scrape_n_serve::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, hash_config_content, load_config,
    load_config_with_hash, DB_PATH_ENV, TARGET_WEBSITE_ENV,
};
pub use validation::{validate, MAX_DEPTH_LIMIT};
