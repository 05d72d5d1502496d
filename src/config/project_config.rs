//! Project-level configuration (`trustcheck.toml`)
//!
//! ```toml
//! [checks.branch-protection]
//! enabled = true
//! risk = "critical"
//!
//! [scoring]
//! branch_aggregation = "mean"
//!
//! [defaults]
//! format = "json"
//! workers = 4
//! check_timeout_secs = 60
//! timeout_secs = 600
//! ```

use crate::checker::CheckRegistry;
use crate::scoring::{AggregationPolicy, Risk};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "trustcheck.toml";
pub const CONFIG_FILE_JSON: &str = ".trustcheckrc.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Per-check overrides, keyed by check name in any casing
    #[serde(default)]
    pub checks: HashMap<String, CheckConfigOverride>,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub defaults: CliDefaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfigOverride {
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Weight in the overall score: critical, high, medium or low
    #[serde(default)]
    pub risk: Option<Risk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// How per-branch protection scores are combined
    #[serde(default)]
    pub branch_aggregation: AggregationPolicy,
}

/// Defaults for CLI flags; explicit flags win
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliDefaults {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub check_timeout_secs: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub show_details: Option<bool>,
    /// Checks to run when `--checks` is not given
    #[serde(default)]
    pub checks: Option<Vec<String>>,
}

/// Load project configuration from the repository root.
///
/// Searches `trustcheck.toml`, then `.trustcheckrc.json`. A file that fails
/// to parse is skipped with a warning. Returns defaults when nothing loads.
pub fn load_project_config(repo_path: &Path) -> ProjectConfig {
    let toml_path = repo_path.join(CONFIG_FILE);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = repo_path.join(CONFIG_FILE_JSON);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}

impl ProjectConfig {
    fn check_override(&self, name: &str) -> Option<&CheckConfigOverride> {
        let wanted = normalize_check_name(name);
        self.checks
            .iter()
            .find(|(key, _)| normalize_check_name(key) == wanted)
            .map(|(_, config)| config)
    }

    pub fn is_check_enabled(&self, name: &str) -> bool {
        self.check_override(name)
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    pub fn risk_override(&self, name: &str) -> Option<Risk> {
        self.check_override(name).and_then(|c| c.risk)
    }

    /// Checks turned off with `enabled = false`, as written in the file
    pub fn disabled_checks(&self) -> Vec<String> {
        let mut disabled: Vec<String> = self
            .checks
            .iter()
            .filter(|(_, c)| c.enabled == Some(false))
            .map(|(name, _)| name.clone())
            .collect();
        disabled.sort();
        disabled
    }

    /// Apply risk overrides to `registry`. Unknown check names are reported
    /// and ignored.
    pub fn apply_risks(&self, registry: &mut CheckRegistry) {
        for (name, config) in &self.checks {
            let Some(risk) = config.risk else {
                continue;
            };
            if !registry.set_risk(name, risk) {
                warn!("Ignoring risk override for unknown check '{}'", name);
            }
        }
    }
}

/// Normalize a check name for config lookup.
///
/// `Branch-Protection`, `branch_protection` and `BranchProtection` all
/// become `branch-protection`.
pub fn normalize_check_name(name: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = name.trim().chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            // camelCase boundary, or the last capital of an acronym (CIIBest -> cii-best)
            let prev_is_lower = i > 0 && chars[i - 1].is_lowercase();
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else if *c == '_' || *c == ' ' {
            result.push('-');
        } else {
            result.push(*c);
        }
    }
    result
}
