use crate::models::{Finding, Location, Outcome};
use crate::raw::SastData;

pub const SAST_TOOL_RUNS_ON_ALL_COMMITS: &str = "sastToolRunsOnAllCommits";
pub const SAST_TOOL_CONFIGURED: &str = "sastToolConfigured";

fn commit_findings(data: &SastData) -> Vec<Finding> {
    if data.commits.is_empty() {
        return vec![Finding::new(
            SAST_TOOL_RUNS_ON_ALL_COMMITS,
            Outcome::NotApplicable,
            "no merged pull requests found",
        )];
    }
    data.commits
        .iter()
        .map(|c| {
            let finding = if c.apps.is_empty() {
                Finding::new(
                    SAST_TOOL_RUNS_ON_ALL_COMMITS,
                    Outcome::False,
                    format!("no SAST tool ran on pull request #{}", c.change_request),
                )
            } else {
                Finding::new(
                    SAST_TOOL_RUNS_ON_ALL_COMMITS,
                    Outcome::True,
                    format!("{} ran on pull request #{}", c.apps.join(", "), c.change_request),
                )
            };
            finding.with_value("commit", c.sha.as_str())
        })
        .collect()
}

fn tool_findings(data: &SastData) -> Vec<Finding> {
    if data.tools.is_empty() {
        return vec![Finding::new(
            SAST_TOOL_CONFIGURED,
            Outcome::False,
            "no SAST tool configured in workflows",
        )];
    }
    data.tools
        .iter()
        .map(|t| {
            Finding::new(
                SAST_TOOL_CONFIGURED,
                Outcome::True,
                format!("SAST tool {} configured", t.name),
            )
            .with_value("tool", t.name.as_str())
            .with_location(Location::at(t.path.as_str(), t.line))
        })
        .collect()
}

pub fn run(data: &SastData) -> Vec<Finding> {
    let mut findings = commit_findings(data);
    findings.extend(tool_findings(data));
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{SastCommit, SastTool};

    #[test]
    fn test_commit_and_tool_findings() {
        let data = SastData {
            commits: vec![
                SastCommit {
                    sha: "a".to_string(),
                    change_request: 1,
                    apps: vec!["github-code-scanning".to_string()],
                },
                SastCommit {
                    sha: "b".to_string(),
                    change_request: 2,
                    apps: Vec::new(),
                },
            ],
            tools: vec![SastTool {
                name: "CodeQL".to_string(),
                path: ".github/workflows/codeql.yml".to_string(),
                line: 12,
            }],
        };
        let findings = run(&data);
        let outcomes: Vec<_> = findings.iter().map(|f| (f.probe.as_str(), f.outcome)).collect();
        assert_eq!(
            outcomes,
            vec![
                (SAST_TOOL_RUNS_ON_ALL_COMMITS, Outcome::True),
                (SAST_TOOL_RUNS_ON_ALL_COMMITS, Outcome::False),
                (SAST_TOOL_CONFIGURED, Outcome::True),
            ]
        );
    }

    #[test]
    fn test_nothing_observed() {
        let findings = run(&SastData::default());
        assert_eq!(findings[0].outcome, Outcome::NotApplicable);
        assert_eq!(findings[1].outcome, Outcome::False);
    }
}
