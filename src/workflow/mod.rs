//! GitHub Actions workflow model
//!
//! A typed subset of the workflow syntax: triggers, jobs and steps. Enough
//! to recognise dangerous patterns, packaging jobs and SAST tooling. Line
//! numbers are recovered by searching the original text.

pub mod matcher;

use regex::Regex;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Directory GitHub loads workflows from
pub const WORKFLOW_DIR: &str = ".github/workflows/";

pub fn is_workflow_file(path: &str) -> bool {
    path.starts_with(WORKFLOW_DIR) && (path.ends_with(".yml") || path.ends_with(".yaml"))
}

#[derive(Error, Debug)]
#[error("invalid workflow {path}: {message}")]
pub struct WorkflowError {
    pub path: String,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawTriggers {
    Single(String),
    List(Vec<String>),
    Map(BTreeMap<String, IgnoredAny>),
}

#[derive(Deserialize, Debug, Default)]
struct RawWorkflow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "on")]
    on: Option<RawTriggers>,
    #[serde(default)]
    jobs: BTreeMap<String, Job>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Job {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "if")]
    pub condition: Option<String>,
    /// Reusable workflow call (`uses:` at job level)
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Step {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub with: BTreeMap<String, serde_json::Value>,
}

impl Step {
    /// Action name without its `@ref`, e.g. `actions/checkout`
    pub fn action(&self) -> Option<&str> {
        self.uses
            .as_deref()
            .map(|u| u.split('@').next().unwrap_or(u).trim())
    }

    /// A `with:` input rendered as text
    pub fn input(&self, key: &str) -> Option<String> {
        self.with.get(key).map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// One parsed workflow file
#[derive(Debug, Clone)]
pub struct Workflow {
    pub path: String,
    pub name: Option<String>,
    /// Event names that trigger the workflow
    pub triggers: Vec<String>,
    pub jobs: BTreeMap<String, Job>,
    content: String,
}

/// Quote a top-level `on:` key so YAML 1.1 parsers cannot read it as a boolean
fn quote_on_key(content: &str) -> String {
    static ON_KEY: OnceLock<Regex> = OnceLock::new();
    let re = ON_KEY.get_or_init(|| Regex::new(r"(?m)^on:").expect("on-key regex is valid"));
    re.replace_all(content, "\"on\":").into_owned()
}

impl Workflow {
    pub fn parse(path: &str, content: &str) -> Result<Self, WorkflowError> {
        let raw: RawWorkflow = if content.trim().is_empty() {
            RawWorkflow::default()
        } else {
            serde_yaml_bw::from_str(&quote_on_key(content)).map_err(|e| WorkflowError {
                path: path.to_string(),
                message: e.to_string(),
            })?
        };

        let triggers = match raw.on {
            None => Vec::new(),
            Some(RawTriggers::Single(event)) => vec![event],
            Some(RawTriggers::List(events)) => events,
            Some(RawTriggers::Map(events)) => events.into_keys().collect(),
        };

        Ok(Self {
            path: path.to_string(),
            name: raw.name,
            triggers,
            jobs: raw.jobs,
            content: content.to_string(),
        })
    }

    pub fn is_triggered_by(&self, event: &str) -> bool {
        self.triggers.iter().any(|t| t == event)
    }

    /// Every `(job id, step)` pair in file order per job
    pub fn steps(&self) -> impl Iterator<Item = (&str, &Step)> {
        self.jobs
            .iter()
            .flat_map(|(id, job)| job.steps.iter().map(move |s| (id.as_str(), s)))
    }

    /// 1-based line of the first occurrence of `needle`, 0 when absent
    pub fn line_of(&self, needle: &str) -> u32 {
        let needle = needle.trim();
        if needle.is_empty() {
            return 0;
        }
        self.content
            .lines()
            .position(|l| l.contains(needle))
            .map(|i| i as u32 + 1)
            .unwrap_or(0)
    }

    /// The source line at `line`, trimmed
    pub fn snippet(&self, line: u32) -> Option<String> {
        if line == 0 {
            return None;
        }
        self.content
            .lines()
            .nth(line as usize - 1)
            .map(|l| l.trim().to_string())
    }
}

/// Events whose workflows run with secrets against contributor-controlled code
pub const PRIVILEGED_TRIGGERS: &[&str] = &["pull_request_target", "workflow_run"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DangerousPattern {
    UntrustedCheckout,
    ScriptInjection,
}

/// One dangerous construct found in a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DangerousHit {
    pub pattern: DangerousPattern,
    pub path: String,
    pub job: String,
    pub line: u32,
    pub snippet: Option<String>,
    /// The offending expression or ref
    pub expression: String,
}

fn untrusted_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let patterns = [
            r"github\.event\.pull_request\.head\.(?:sha|ref)",
            r"github\.event\.workflow_run\.head_(?:sha|branch)",
            r"github\.event\.workflow_run\.head_commit\.id",
            r"github\.head_ref",
            r"refs/pull/",
        ];
        Regex::new(&patterns.join("|")).expect("untrusted ref regex is valid")
    })
}

/// `${{ ... }}` expressions that expand to attacker-controlled text
fn dangerous_expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let patterns = [
            r"github\.event\.issue\.title",
            r"github\.event\.issue\.body",
            r"github\.event\.pull_request\.title",
            r"github\.event\.pull_request\.body",
            r"github\.event\.pull_request\.head\.ref",
            r"github\.event\.pull_request\.head\.label",
            r"github\.event\.pull_request\.head\.repo\.default_branch",
            r"github\.head_ref",
            r"github\.event\.comment\.body",
            r"github\.event\.review\.body",
            r"github\.event\.review_comment\.body",
            r"github\.event\.discussion\.title",
            r"github\.event\.discussion\.body",
            r"github\.event\.pages\.[^}]*\.page_name",
            r"github\.event\.commits\.[^}]*\.message",
            r"github\.event\.commits\.[^}]*\.author\.(?:email|name)",
            r"github\.event\.commits\[\d*\]\.message",
            r"github\.event\.head_commit\.message",
            r"github\.event\.head_commit\.author\.(?:email|name)",
            r"github\.event\.workflow_run\.head_branch",
            r"github\.event\.workflow_run\.head_commit\.message",
            r"github\.event\.workflow_run\.head_commit\.author\.(?:email|name)",
        ];
        Regex::new(&format!(
            r"\$\{{\{{[^}}]*?({})[^}}]*\}}\}}",
            patterns.join("|")
        ))
        .expect("dangerous expression regex is valid")
    })
}

/// Checkouts of contributor-controlled refs in privileged workflows
pub fn untrusted_checkouts(workflow: &Workflow) -> Vec<DangerousHit> {
    if !PRIVILEGED_TRIGGERS.iter().any(|t| workflow.is_triggered_by(t)) {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for (job, step) in workflow.steps() {
        if step.action() != Some("actions/checkout") {
            continue;
        }
        let Some(git_ref) = step.input("ref") else {
            continue;
        };
        if !untrusted_ref_pattern().is_match(&git_ref) {
            continue;
        }
        let line = workflow.line_of(&git_ref);
        hits.push(DangerousHit {
            pattern: DangerousPattern::UntrustedCheckout,
            path: workflow.path.clone(),
            job: job.to_string(),
            line,
            snippet: workflow.snippet(line),
            expression: git_ref,
        });
    }
    hits
}

/// Untrusted context expressions expanded inside `run:` scripts or
/// `actions/github-script` sources
pub fn script_injections(workflow: &Workflow) -> Vec<DangerousHit> {
    let mut hits = Vec::new();
    for (job, step) in workflow.steps() {
        let script = match (&step.run, step.action()) {
            (Some(run), _) => run.clone(),
            (None, Some("actions/github-script")) => step.input("script").unwrap_or_default(),
            _ => continue,
        };
        for captures in dangerous_expression_pattern().captures_iter(&script) {
            let Some(expression) = captures.get(0).map(|m| m.as_str().to_string()) else {
                continue;
            };
            let line = workflow.line_of(&expression);
            hits.push(DangerousHit {
                pattern: DangerousPattern::ScriptInjection,
                path: workflow.path.clone(),
                job: job.to_string(),
                line,
                snippet: workflow.snippet(line),
                expression,
            });
        }
    }
    hits
}
