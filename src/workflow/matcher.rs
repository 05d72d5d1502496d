//! Step-signature matching for workflow jobs
//!
//! A template is an ordered list of step signatures. A job matches when its
//! steps contain every signature in order (other steps may sit in between).
//! Templates are tried in declaration order and the first match wins.

use super::{Step, Workflow};

/// What a single step must look like
#[derive(Debug, Clone, Copy, Default)]
pub struct StepSignature {
    /// Action name prefix, matched against `uses:` without its ref
    pub uses: Option<&'static str>,
    /// Substring of the `run:` script
    pub run: Option<&'static str>,
    /// `with:` input whose value contains the given text
    pub input: Option<(&'static str, &'static str)>,
}

impl StepSignature {
    const fn uses(action: &'static str) -> Self {
        Self {
            uses: Some(action),
            run: None,
            input: None,
        }
    }

    const fn run(script: &'static str) -> Self {
        Self {
            uses: None,
            run: Some(script),
            input: None,
        }
    }

    const fn uses_with(action: &'static str, key: &'static str, value: &'static str) -> Self {
        Self {
            uses: Some(action),
            run: None,
            input: Some((key, value)),
        }
    }

    pub fn matches(&self, step: &Step) -> bool {
        if let Some(prefix) = self.uses {
            match step.action() {
                Some(action) if action.starts_with(prefix) => {}
                _ => return false,
            }
        }
        if let Some(fragment) = self.run {
            match &step.run {
                Some(script) if script.contains(fragment) => {}
                _ => return false,
            }
        }
        if let Some((key, value)) = self.input {
            match step.input(key) {
                Some(v) if v.contains(value) => {}
                _ => return false,
            }
        }
        self.uses.is_some() || self.run.is_some() || self.input.is_some()
    }
}

/// A named, ordered set of step signatures
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub steps: &'static [StepSignature],
}

/// A template match inside one workflow job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    pub template: &'static str,
    pub path: String,
    pub job: String,
    /// Line of the last matched step
    pub line: u32,
}

fn job_matches(template: &Template, steps: &[Step]) -> Option<usize> {
    let mut remaining = template.steps.iter().peekable();
    let mut last = None;
    for (i, step) in steps.iter().enumerate() {
        let Some(signature) = remaining.peek() else {
            break;
        };
        if signature.matches(step) {
            last = Some(i);
            remaining.next();
        }
    }
    if remaining.peek().is_none() {
        last
    } else {
        None
    }
}

fn step_anchor(step: &Step) -> Option<&str> {
    step.uses
        .as_deref()
        .or_else(|| step.run.as_deref().and_then(|r| r.lines().next()))
}

/// First template (in order) matched by any job of `workflow`
pub fn first_match(templates: &[Template], workflow: &Workflow) -> Option<TemplateMatch> {
    for template in templates {
        for (job_id, job) in &workflow.jobs {
            if let Some(index) = job_matches(template, &job.steps) {
                let line = step_anchor(&job.steps[index])
                    .map(|a| workflow.line_of(a))
                    .unwrap_or(0);
                return Some(TemplateMatch {
                    template: template.name,
                    path: workflow.path.clone(),
                    job: job_id.clone(),
                    line,
                });
            }
        }
    }
    None
}

/// Publishing jobs for common package ecosystems
pub const PACKAGING_TEMPLATES: &[Template] = &[
    Template {
        name: "npm",
        steps: &[
            StepSignature::uses_with("actions/setup-node", "registry-url", "registry.npmjs.org"),
            StepSignature::run("npm publish"),
        ],
    },
    Template {
        name: "github-packages-npm",
        steps: &[
            StepSignature::uses_with("actions/setup-node", "registry-url", "npm.pkg.github.com"),
            StepSignature::run("npm publish"),
        ],
    },
    Template {
        name: "yarn",
        steps: &[StepSignature::run("yarn publish")],
    },
    Template {
        name: "maven",
        steps: &[
            StepSignature::uses("actions/setup-java"),
            StepSignature::run("deploy"),
        ],
    },
    Template {
        name: "gradle",
        steps: &[
            StepSignature::uses("actions/setup-java"),
            StepSignature::run("publish"),
        ],
    },
    Template {
        name: "pypi",
        steps: &[StepSignature::uses("pypa/gh-action-pypi-publish")],
    },
    Template {
        name: "python-semantic-release",
        steps: &[StepSignature::uses("relekang/python-semantic-release")],
    },
    Template {
        name: "goreleaser",
        steps: &[StepSignature::uses("goreleaser/goreleaser-action")],
    },
    Template {
        name: "cargo",
        steps: &[StepSignature::run("cargo publish")],
    },
    Template {
        name: "rubygems",
        steps: &[StepSignature::run("gem push")],
    },
    Template {
        name: "nuget",
        steps: &[StepSignature::run("nuget push")],
    },
    Template {
        name: "docker",
        steps: &[StepSignature::uses_with("docker/build-push-action", "push", "true")],
    },
    Template {
        name: "docker-cli",
        steps: &[StepSignature::run("docker push")],
    },
    Template {
        name: "semantic-release",
        steps: &[StepSignature::run("semantic-release")],
    },
];

/// Actions that run a static analysis tool
pub const SAST_ACTIONS: &[(&str, &str)] = &[
    ("github/codeql-action/analyze", "CodeQL"),
    ("github/codeql-action/init", "CodeQL"),
    ("SonarSource/sonarcloud-github-action", "SonarCloud"),
    ("SonarSource/sonarqube-scan-action", "SonarQube"),
    ("snyk/actions", "Snyk"),
    ("returntocorp/semgrep-action", "Semgrep"),
    ("semgrep/semgrep-action", "Semgrep"),
    ("securego/gosec", "gosec"),
    ("facebook/pysa-action", "Pysa"),
    ("JetBrains/qodana-action", "Qodana"),
];

/// Tools named in `run:` scripts that count as SAST
pub const SAST_COMMANDS: &[(&str, &str)] = &[("semgrep", "Semgrep"), ("gosec", "gosec")];

/// SAST tools configured anywhere in `workflow`, first-seen order
pub fn sast_tools(workflow: &Workflow) -> Vec<(&'static str, u32)> {
    let mut tools: Vec<(&'static str, u32)> = Vec::new();
    for (_, step) in workflow.steps() {
        let tool = match (step.action(), &step.run) {
            (Some(action), _) => SAST_ACTIONS
                .iter()
                .find(|(prefix, _)| action.starts_with(prefix))
                .map(|(_, tool)| *tool),
            (None, Some(script)) => SAST_COMMANDS
                .iter()
                .find(|(command, _)| script.contains(command))
                .map(|(_, tool)| *tool),
            _ => None,
        };
        if let Some(tool) = tool {
            if !tools.iter().any(|(t, _)| *t == tool) {
                let line = step_anchor(step).map(|a| workflow.line_of(a)).unwrap_or(0);
                tools.push((tool, line));
            }
        }
    }
    tools
}
