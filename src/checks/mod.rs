//! The compiled-in checks
//!
//! Each module wires a collector, its probes and an evaluator into a
//! [`CheckPipeline`](crate::checker::CheckPipeline) and exposes a
//! `registration()`. The table is built explicitly at startup.

pub mod best_practices;
pub mod binary_artifacts;
pub mod branch_protection;
pub mod code_review;
pub mod contributors;
pub mod dangerous_workflow;
pub mod packaging;
pub mod sast;
pub mod security_policy;
pub mod signed_releases;
pub mod vulnerabilities;

use crate::checker::{CheckRegistry, Registration, RegistryError};
use crate::scoring::AggregationPolicy;

/// Every check, with the given branch aggregation policy
pub fn all_registrations(branch_aggregation: AggregationPolicy) -> Vec<Registration> {
    vec![
        binary_artifacts::registration(),
        branch_protection::registration(branch_aggregation),
        best_practices::registration(),
        code_review::registration(),
        contributors::registration(),
        dangerous_workflow::registration(),
        packaging::registration(),
        sast::registration(),
        security_policy::registration(),
        signed_releases::registration(),
        vulnerabilities::registration(),
    ]
}

pub fn registry_with(branch_aggregation: AggregationPolicy) -> Result<CheckRegistry, RegistryError> {
    let mut registry = CheckRegistry::new();
    for registration in all_registrations(branch_aggregation) {
        registry.register(registration)?;
    }
    Ok(registry)
}

pub fn default_registry() -> Result<CheckRegistry, RegistryError> {
    registry_with(AggregationPolicy::default())
}
