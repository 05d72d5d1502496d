//! Known vulnerabilities affecting the snapshot's commit

use crate::checker::{CheckError, CheckRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VulnerabilitiesData {
    pub commit: String,
    /// OSV identifiers, aliases already collapsed
    pub ids: Vec<String>,
}

pub fn collect(req: &CheckRequest) -> Result<VulnerabilitiesData, CheckError> {
    let commit = req.raw.head_commit(req)?;
    let ids = req.raw.vulnerabilities(req, &commit)?.as_ref().clone();
    Ok(VulnerabilitiesData { commit, ids })
}
