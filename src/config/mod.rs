//! Configuration module for Steeple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use steeple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("steeple.toml")).unwrap();
//! println!("Crawling {} up to depth {}", config.organization.homepage, config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AnalyzerConfig, Config, CrawlerConfig, OrganizationConfig, OutputConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
