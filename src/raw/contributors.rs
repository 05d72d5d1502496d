//! Recent contributors and their affiliations

use crate::checker::{CheckError, CheckRequest};
use crate::clients::User;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorsData {
    pub users: Vec<User>,
}

pub fn collect(req: &CheckRequest) -> Result<ContributorsData, CheckError> {
    let users = req
        .raw
        .contributors(req)?
        .iter()
        .filter(|u| !u.is_bot)
        .cloned()
        .collect();
    Ok(ContributorsData { users })
}
