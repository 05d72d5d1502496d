//! SAST check runs on merged changes and SAST tooling in workflows

use super::load_workflows;
use crate::checker::{CheckError, CheckRequest};
use crate::workflow::matcher::sast_tools;
use std::collections::BTreeSet;
use tracing::debug;

/// Check-run apps that perform static analysis
pub const SAST_APPS: &[&str] = &[
    "github-code-scanning",
    "lgtm-com",
    "sonarcloud",
    "sonarqubecloud",
    "semgrep-app",
    "snyk-io",
];

/// One merged change and whether SAST ran on its head commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SastCommit {
    pub sha: String,
    pub change_request: u64,
    /// SAST apps that completed a run on the change
    pub apps: Vec<String>,
}

/// A SAST tool configured in a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SastTool {
    pub name: String,
    pub path: String,
    pub line: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SastData {
    pub commits: Vec<SastCommit>,
    pub tools: Vec<SastTool>,
}

pub fn collect(req: &CheckRequest) -> Result<SastData, CheckError> {
    let mut data = SastData::default();

    let mut seen = BTreeSet::new();
    for commit in req.raw.commits(req)?.iter() {
        let Some(cr) = &commit.change_request else {
            continue;
        };
        if !seen.insert(cr.number) {
            continue;
        }
        let apps = req
            .raw
            .check_runs(req, &cr.head_sha)?
            .iter()
            .filter(|run| run.status == "completed")
            .filter_map(|run| run.app_slug.as_deref())
            .filter(|slug| SAST_APPS.contains(slug))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        data.commits.push(SastCommit {
            sha: commit.sha.clone(),
            change_request: cr.number,
            apps,
        });
    }

    for parsed in load_workflows(req)? {
        let workflow = match parsed {
            Ok(workflow) => workflow,
            Err(e) => {
                debug!("Skipping workflow for SAST: {}", e);
                continue;
            }
        };
        for (name, line) in sast_tools(&workflow) {
            data.tools.push(SastTool {
                name: name.to_string(),
                path: workflow.path.clone(),
                line,
            });
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeRepoClient;
    use crate::clients::{ChangeRequest, CheckRun, Commit};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn merged(sha: &str, number: u64) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: String::new(),
            author: None,
            committed_at: None,
            change_request: Some(ChangeRequest {
                number,
                author: None,
                head_sha: format!("head-{number}"),
                merged_by: None,
                merged_at: None,
                reviews: Vec::new(),
            }),
        }
    }

    fn run(app: &str, status: &str) -> CheckRun {
        CheckRun {
            name: "analyze".to_string(),
            status: status.to_string(),
            conclusion: Some("success".to_string()),
            app_slug: Some(app.to_string()),
        }
    }

    #[test]
    fn test_collects_sast_runs_per_change() {
        let repo = FakeRepoClient {
            commits: vec![merged("a", 1), merged("b", 2)],
            check_runs: HashMap::from([
                ("head-1".to_string(), vec![run("github-code-scanning", "completed")]),
                ("head-2".to_string(), vec![run("github-actions", "completed"), run("sonarcloud", "queued")]),
            ]),
            ..Default::default()
        }
        .with_file(
            ".github/workflows/codeql.yml",
            "on: push\njobs:\n  analyze:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: github/codeql-action/analyze@v3\n",
        );
        let req = CheckRequest::new(Arc::new(repo));
        let data = collect(&req).expect("collect");

        assert_eq!(data.commits.len(), 2);
        assert_eq!(data.commits[0].apps, vec!["github-code-scanning"]);
        assert!(data.commits[1].apps.is_empty());
        assert_eq!(data.tools.len(), 1);
        assert_eq!(data.tools[0].name, "CodeQL");
        assert_eq!(data.tools[0].line, 6);
    }
}
