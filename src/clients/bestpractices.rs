//! OpenSSF Best Practices badge lookups

use super::{BadgeClient, ProviderError, ProviderResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://www.bestpractices.dev";

#[derive(Deserialize, Debug)]
struct BadgeProject {
    badge_level: Option<String>,
}

pub struct BestPracticesClient {
    api_url: String,
    agent: ureq::Agent,
}

impl BestPracticesClient {
    pub fn new() -> Self {
        Self::with_api_url(DEFAULT_API_URL)
    }

    pub fn with_api_url(url: impl Into<String>) -> Self {
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(30)))
            .build()
            .new_agent();
        Self {
            api_url: url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }
}

impl Default for BestPracticesClient {
    fn default() -> Self {
        Self::new()
    }
}

/// First project's badge level. More than one entry means the URL matched
/// several projects; the oldest registration is authoritative.
fn first_badge_level(projects: Vec<BadgeProject>) -> Option<String> {
    projects.into_iter().next().and_then(|p| p.badge_level)
}

impl BadgeClient for BestPracticesClient {
    fn badge_level(&self, repo_url: &str) -> ProviderResult<Option<String>> {
        let url = format!("{}/projects.json", self.api_url);
        let response = self
            .agent
            .get(&url)
            .query("url", repo_url)
            .call()
            .map_err(|e| ProviderError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(ProviderError::Http {
                status,
                url,
                message,
            });
        }

        let projects: Vec<BadgeProject> =
            response
                .into_body()
                .read_json()
                .map_err(|e| ProviderError::Parse {
                    source_name: url,
                    message: e.to_string(),
                })?;
        let level = first_badge_level(projects);
        debug!("Best Practices badge for {}: {:?}", repo_url, level);
        Ok(level)
    }
}
