//! Configuration module for whattodo
//!
//! This module handles:
//! - Project-level configuration (whattodo.toml)
//! - TODO pattern and git backend selection
//! - CLI defaults

mod project_config;

pub use project_config::{
    glob_match, load_project_config, CliDefaults, HistoryConfig, ProjectConfig, ScanConfig,
    TodoConfig, CONFIG_FILE_NAME, DEFAULT_EXCLUDE_PATTERNS, EXAMPLE_CONFIG,
};
