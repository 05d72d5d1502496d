//! `trustcheck run`: evaluate one repository and render the report

use super::Cli;
use crate::checker::{CheckEngine, CheckRequest, DEFAULT_WORKERS};
use crate::checks;
use crate::clients::{BestPracticesClient, GitHubClient, LocalDirClient, OsvClient, RepoClient};
use crate::config::{load_project_config, ProjectConfig, UserConfig};
use crate::reporters::{self, OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 900;

fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

fn open_repo(cli: &Cli, user: &UserConfig) -> Result<Arc<dyn RepoClient>> {
    match &cli.repo {
        Some(slug) => {
            let mut client = GitHubClient::new(slug, user.github_token().map(String::from))?;
            if let Some(url) = &user.github.api_url {
                client = client.with_api_url(url.as_str());
            }
            if user.github_token().is_none() {
                eprintln!(
                    "{} GITHUB_TOKEN is not set; requests are rate limited and some settings are not visible",
                    style("!").yellow()
                );
            }
            Ok(Arc::new(client))
        }
        None => {
            let client = LocalDirClient::new(&cli.path)
                .with_context(|| format!("cannot open {}", cli.path.display()))?;
            Ok(Arc::new(client))
        }
    }
}

/// Checks to run: `--checks`, else `[defaults] checks`, else every enabled check
fn requested_checks(cli: &Cli, config: &ProjectConfig, all: Vec<&'static str>) -> Vec<String> {
    if !cli.checks.is_empty() {
        return cli.checks.iter().map(|c| c.trim().to_string()).collect();
    }
    if let Some(checks) = &config.defaults.checks {
        return checks.clone();
    }
    all.into_iter()
        .filter(|name| config.is_check_enabled(name))
        .map(String::from)
        .collect()
}

/// Seconds to a timeout; 0 means none
fn timeout(flag: Option<u64>, config: Option<u64>, default: u64) -> Option<Duration> {
    match flag.or(config).unwrap_or(default) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

pub(super) fn run(cli: &Cli) -> Result<()> {
    let user = UserConfig::load()?;
    let config = load_project_config(&cli.path);

    let format = match cli.format.as_deref().or(config.defaults.format.as_deref()) {
        Some(f) => OutputFormat::from_str(f)?,
        None => OutputFormat::default(),
    };
    let workers = cli.workers.or(config.defaults.workers).unwrap_or(DEFAULT_WORKERS);
    let show_details = cli.show_details || config.defaults.show_details.unwrap_or(false);

    let repo = open_repo(cli, &user)?;

    let mut registry = checks::registry_with(config.scoring.branch_aggregation)?;
    config.apply_risks(&mut registry);
    let risks = registry.risks();
    let names = requested_checks(cli, &config, registry.names());

    let osv = match &user.osv.api_url {
        Some(url) => OsvClient::with_api_url(url.as_str()),
        None => OsvClient::new(),
    };
    let req = CheckRequest::new(Arc::clone(&repo))
        .with_vulnerability_client(Arc::new(osv))
        .with_badge_client(Arc::new(BestPracticesClient::new()));

    let mut engine = CheckEngine::new(registry, workers);
    if let Some(t) = timeout(cli.check_timeout, config.defaults.check_timeout_secs, DEFAULT_CHECK_TIMEOUT_SECS) {
        engine = engine.with_check_timeout(t);
    }
    if let Some(t) = timeout(cli.timeout, config.defaults.timeout_secs, DEFAULT_RUN_TIMEOUT_SECS) {
        engine = engine.with_run_timeout(t);
    }

    let bar = if console::Term::stderr().is_term() {
        let bar = ProgressBar::new(names.len() as u64);
        bar.set_style(create_bar_style());
        bar.set_message(format!("Checking {}...", repo.repo_name()));
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    } else {
        None
    };
    if let Some(bar) = &bar {
        let progress = bar.clone();
        engine = engine.with_progress_callback(Box::new(move |name, done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
            progress.set_message(name.to_string());
        }));
    }

    let outcome = engine.run(&req, &names)?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let summary = outcome.summary.clone();
    info!(
        "{} checks: {} scored, {} inconclusive, {} failed, {} skipped in {}ms ({} evidence fetches)",
        summary.checks_run,
        summary.succeeded,
        summary.inconclusive,
        summary.failed,
        summary.skipped,
        summary.total_duration_ms,
        req.raw.fetch_count(),
    );

    let report = outcome.into_report(repo.repo_name(), &risks);
    let output = reporters::render(&report, format, RenderOptions { show_details })?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("{} Report written to {}", style("✓").green(), path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_timeout_precedence() {
        assert_eq!(timeout(Some(5), Some(10), 20), Some(Duration::from_secs(5)));
        assert_eq!(timeout(None, Some(10), 20), Some(Duration::from_secs(10)));
        assert_eq!(timeout(None, None, 20), Some(Duration::from_secs(20)));
        assert_eq!(timeout(Some(0), Some(10), 20), None);
    }

    #[test]
    fn test_requested_checks_respects_config() {
        let mut config = ProjectConfig::default();
        config.checks.insert(
            "sast".to_string(),
            crate::config::CheckConfigOverride {
                enabled: Some(false),
                risk: None,
            },
        );
        let all = vec!["Packaging", "SAST"];

        let cli = Cli::try_parse_from(["trustcheck"]).expect("parse");
        assert_eq!(requested_checks(&cli, &config, all.clone()), vec!["Packaging"]);

        let cli = Cli::try_parse_from(["trustcheck", "--checks", "SAST"]).expect("parse");
        assert_eq!(requested_checks(&cli, &config, all), vec!["SAST"]);
    }
}
