//! OSV.dev vulnerability lookups by commit hash

use super::{ProviderError, ProviderResult, VulnerabilityClient, VulnerabilityId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.osv.dev";

/// OSV.dev query request
#[derive(Serialize)]
struct OsvQuery<'a> {
    commit: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<String>,
}

/// OSV.dev query response
#[derive(Deserialize, Debug, Default)]
struct OsvResponse {
    #[serde(default)]
    vulns: Vec<OsvVuln>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OsvVuln {
    id: String,
    #[serde(default)]
    aliases: Vec<String>,
}

pub struct OsvClient {
    api_url: String,
    agent: ureq::Agent,
}

impl OsvClient {
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

    fn query_page(&self, sha: &str, page_token: Option<String>) -> ProviderResult<OsvResponse> {
        let url = format!("{}/v1/query", self.api_url);
        let query = OsvQuery {
            commit: sha,
            page_token,
        };

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send_json(&query)
            .map_err(|e| ProviderError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let text = response
            .into_body()
            .read_to_string()
            .map_err(|e| ProviderError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;
        if status >= 400 {
            return Err(ProviderError::Http {
                status,
                url,
                message: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(OsvResponse::default());
        }
        serde_json::from_str(&text).map_err(|e| ProviderError::Parse {
            source_name: url,
            message: e.to_string(),
        })
    }
}

impl Default for OsvClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse records describing the same vulnerability under different IDs
/// (e.g. a GHSA and its CVE alias) to the first ID seen.
fn dedupe_aliases(vulns: Vec<OsvVuln>) -> Vec<VulnerabilityId> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut ids = Vec::new();
    for vuln in vulns {
        if seen.contains(&vuln.id) || vuln.aliases.iter().any(|a| seen.contains(a)) {
            seen.extend(vuln.aliases);
            seen.insert(vuln.id);
            continue;
        }
        seen.extend(vuln.aliases);
        seen.insert(vuln.id.clone());
        ids.push(vuln.id);
    }
    ids
}

impl VulnerabilityClient for OsvClient {
    fn query_by_commit(&self, sha: &str) -> ProviderResult<Vec<VulnerabilityId>> {
        let mut vulns = Vec::new();
        let mut page_token = None;
        loop {
            let page = self.query_page(sha, page_token)?;
            vulns.extend(page.vulns);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        let ids = dedupe_aliases(vulns);
        debug!("OSV reports {} vulnerabilities for commit {}", ids.len(), sha);
        Ok(ids)
    }
}
