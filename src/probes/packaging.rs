use crate::models::{Finding, Location, Outcome};
use crate::raw::PackagingData;

pub const PACKAGED_WITH_AUTOMATED_WORKFLOW: &str = "packagedWithAutomatedWorkflow";

pub fn run(data: &PackagingData) -> Vec<Finding> {
    if data.matches.is_empty() {
        let message = if data.workflow_count == 0 {
            "no workflows found"
        } else {
            "no publishing workflow detected"
        };
        return vec![Finding::new(PACKAGED_WITH_AUTOMATED_WORKFLOW, Outcome::False, message)];
    }
    data.matches
        .iter()
        .map(|m| {
            Finding::new(
                PACKAGED_WITH_AUTOMATED_WORKFLOW,
                Outcome::True,
                format!("{} packaging workflow detected in job '{}'", m.template, m.job),
            )
            .with_value("template", m.template)
            .with_location(Location::at(m.path.as_str(), m.line))
        })
        .collect()
}
