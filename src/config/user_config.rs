//! User-level configuration for trustcheck
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/trustcheck/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub osv: OsvConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// Personal access token; admin-only branch settings need admin scope
    pub token: Option<String>,

    /// REST API base (default: https://api.github.com)
    pub api_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct OsvConfig {
    /// OSV API base (default: https://api.osv.dev)
    pub api_url: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/trustcheck/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            let content = std::fs::read_to_string(&path)?;
            let user_config: UserConfig = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("invalid {}: {}", path.display(), e))?;
            config.merge(user_config);
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trustcheck").join("config.toml"))
    }

    /// Environment variables override everything
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("GITHUB_TOKEN").filter(|t| !t.is_empty()) {
            self.github.token = Some(token);
        }
        if let Some(url) = var("GITHUB_API_URL") {
            self.github.api_url = Some(url);
        }
        if let Some(url) = var("OSV_API_URL") {
            self.osv.api_url = Some(url);
        }
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.github.token.is_some() {
            self.github.token = other.github.token;
        }
        if other.github.api_url.is_some() {
            self.github.api_url = other.github.api_url;
        }
        if other.osv.api_url.is_some() {
            self.osv.api_url = other.osv.api_url;
        }
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_file() {
        let mut config: UserConfig = toml::from_str(
            r#"
[github]
token = "from-file"
api_url = "https://ghe.example.com/api/v3"
"#,
        )
        .expect("parse");

        let env: HashMap<&str, &str> = [("GITHUB_TOKEN", "from-env"), ("OSV_API_URL", "http://osv.local")]
            .into_iter()
            .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.github_token(), Some("from-env"));
        assert_eq!(config.github.api_url.as_deref(), Some("https://ghe.example.com/api/v3"));
        assert_eq!(config.osv.api_url.as_deref(), Some("http://osv.local"));
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let mut config = UserConfig::default();
        config.apply_env(|key| (key == "GITHUB_TOKEN").then(String::new));
        assert_eq!(config.github_token(), None);
    }
}
