//! Raw evidence collection
//!
//! One collector per check. A collector reads evidence through the shared
//! [`RawResults`] cache and assembles a plain record for the probes. Records
//! are created once per run and never mutated.

mod cache;

pub mod binary_artifacts;
pub mod branch_protection;
pub mod code_review;
pub mod contributors;
pub mod best_practices;
pub mod dangerous_workflow;
pub mod packaging;
pub mod sast;
pub mod security_policy;
pub mod signed_releases;
pub mod vulnerabilities;

pub use cache::{EvidenceKey, EvidenceKind, RawResults};
pub use binary_artifacts::BinaryArtifactData;
pub use branch_protection::BranchProtectionData;
pub use code_review::{Changeset, CodeReviewData};
pub use contributors::ContributorsData;
pub use best_practices::BadgeData;
pub use dangerous_workflow::DangerousWorkflowData;
pub use packaging::PackagingData;
pub use sast::{SastCommit, SastData, SastTool};
pub use security_policy::{SecurityPolicyData, SecurityPolicyFile};
pub use signed_releases::SignedReleaseData;
pub use vulnerabilities::VulnerabilitiesData;

use crate::checker::{CheckError, CheckRequest};
use crate::workflow::{is_workflow_file, Workflow, WorkflowError};

/// Every workflow file in the snapshot, parsed. Parse failures are kept
/// per file so each collector decides how strict to be.
pub(crate) fn load_workflows(
    req: &CheckRequest,
) -> Result<Vec<Result<Workflow, WorkflowError>>, CheckError> {
    let paths = req.raw.files_matching(req, is_workflow_file)?;
    let mut workflows = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(bytes) = req.raw.file_content(req, &path)? else {
            continue;
        };
        workflows.push(Workflow::parse(&path, &String::from_utf8_lossy(&bytes)));
    }
    Ok(workflows)
}
