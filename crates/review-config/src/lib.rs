//! Configuration for the review bot
//!
//! This crate provides:
//! - The per-repository configuration model (`Configuration`, `BotConfig`)
//! - Defaults, validation and org/repo resolution
//! - Configuration file lookup and loading (TOML)

pub mod bot_config;
pub mod config_file;

use std::path::PathBuf;
use thiserror::Error;

pub use bot_config::{BotConfig, Configuration};
pub use config_file::{find_config_file, load_config, parse_config};

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("A config item must list at least one org or repo")]
    EmptyRepos,

    #[error("Invalid repo entry '{0}', expected 'org' or 'org/repo'")]
    InvalidRepo(String),

    #[error("Invalid excluded repo '{0}', expected 'org/repo' of a listed org")]
    InvalidExcludedRepo(String),
}
