//! Configuration module for Linkcheck
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so running without a file is
//! the same as loading an empty one.
//!
//! # Example
//!
//! ```no_run
//! use linkcheck::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkcheck.toml")).unwrap();
//! println!("Crawl will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, SkipEntry, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
