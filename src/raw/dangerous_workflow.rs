//! Dangerous constructs in GitHub Actions workflows

use super::load_workflows;
use crate::checker::{CheckError, CheckRequest};
use crate::workflow::{script_injections, untrusted_checkouts, DangerousHit};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DangerousWorkflowData {
    pub workflow_count: usize,
    pub hits: Vec<DangerousHit>,
}

pub fn collect(req: &CheckRequest) -> Result<DangerousWorkflowData, CheckError> {
    let mut data = DangerousWorkflowData::default();
    for parsed in load_workflows(req)? {
        let workflow = parsed.map_err(|e| CheckError::Malformed(e.to_string()))?;
        data.workflow_count += 1;
        data.hits.extend(untrusted_checkouts(&workflow));
        data.hits.extend(script_injections(&workflow));
    }
    Ok(data)
}
