use crate::models::{Finding, Outcome};
use crate::raw::{Changeset, CodeReviewData};

pub const CODE_APPROVED: &str = "codeApproved";

/// Review state that counts as an approval
const APPROVED: &str = "APPROVED";

/// Approved by someone other than its author. Direct commits never are.
pub fn is_approved(changeset: &Changeset) -> bool {
    changeset.change_request.is_some()
        && changeset.reviews.iter().any(|r| {
            r.state.eq_ignore_ascii_case(APPROVED)
                && r.author.is_some()
                && r.author != changeset.author
        })
}

pub fn run(data: &CodeReviewData) -> Vec<Finding> {
    if data.changesets.is_empty() {
        return vec![Finding::new(
            CODE_APPROVED,
            Outcome::NotApplicable,
            "no changesets found on the default branch",
        )];
    }

    data.changesets
        .iter()
        .map(|cs| {
            let (outcome, message) = if is_approved(cs) {
                (Outcome::True, format!("changeset {} was approved", cs.id))
            } else if cs.change_request.is_none() {
                (
                    Outcome::False,
                    format!("commit {} was pushed without a pull request", cs.id),
                )
            } else {
                (
                    Outcome::False,
                    format!("changeset {} was merged without an approving review", cs.id),
                )
            };
            Finding::new(CODE_APPROVED, outcome, message).with_value("changeset", cs.id.as_str())
        })
        .collect()
}
