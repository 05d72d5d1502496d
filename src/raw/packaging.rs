//! Workflows that publish packages

use super::load_workflows;
use crate::checker::{CheckError, CheckRequest};
use crate::workflow::matcher::{first_match, TemplateMatch, PACKAGING_TEMPLATES};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagingData {
    pub workflow_count: usize,
    /// At most one match per workflow
    pub matches: Vec<TemplateMatch>,
}

pub fn collect(req: &CheckRequest) -> Result<PackagingData, CheckError> {
    let mut data = PackagingData::default();
    for parsed in load_workflows(req)? {
        let workflow = match parsed {
            Ok(workflow) => workflow,
            Err(e) => {
                debug!("Skipping workflow for packaging: {}", e);
                continue;
            }
        };
        data.workflow_count += 1;
        if let Some(hit) = first_match(PACKAGING_TEMPLATES, &workflow) {
            data.matches.push(hit);
        }
    }
    Ok(data)
}
