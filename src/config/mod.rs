//! Configuration module for trustcheck
//!
//! This module handles:
//! - Project-level configuration (trustcheck.toml)
//! - Per-check enablement and risk overrides
//! - Scoring customization
//! - CLI defaults
//! - User-level credentials and endpoints

mod project_config;
mod user_config;

pub use project_config::{
    load_project_config, normalize_check_name, CheckConfigOverride, CliDefaults, ProjectConfig,
    ScoringConfig, CONFIG_FILE, CONFIG_FILE_JSON,
};
pub use user_config::UserConfig;
