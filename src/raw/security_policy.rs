//! Security policy file

use crate::checker::{CheckError, CheckRequest};

/// Directories GitHub looks in for a security policy, in precedence order
const POLICY_DIRS: &[&str] = &["", ".github/", "docs/"];

const POLICY_NAMES: &[&str] = &[
    "security.md",
    "security.markdown",
    "security.adoc",
    "security.rst",
    "security.txt",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPolicyFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityPolicyData {
    /// The policy GitHub would show; `None` when there is none
    pub file: Option<SecurityPolicyFile>,
}

fn policy_rank(path: &str) -> Option<usize> {
    let (dir, name) = match path.rfind('/') {
        Some(i) => (&path[..=i], &path[i + 1..]),
        None => ("", path),
    };
    if !POLICY_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        return None;
    }
    POLICY_DIRS
        .iter()
        .position(|d| d.eq_ignore_ascii_case(dir))
}

pub fn collect(req: &CheckRequest) -> Result<SecurityPolicyData, CheckError> {
    let mut candidates = req.raw.files_matching(req, |p| policy_rank(p).is_some())?;
    candidates.sort_by_key(|p| (policy_rank(p), p.clone()));

    for path in candidates {
        if let Some(bytes) = req.raw.file_content(req, &path)? {
            return Ok(SecurityPolicyData {
                file: Some(SecurityPolicyFile {
                    path,
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                }),
            });
        }
    }
    Ok(SecurityPolicyData::default())
}
