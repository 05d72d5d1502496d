//! OpenSSF Best Practices badge

use crate::checker::{CheckError, CheckRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeData {
    /// Raw badge level; `None` when the project is not registered
    pub level: Option<String>,
}

pub fn collect(req: &CheckRequest) -> Result<BadgeData, CheckError> {
    let level = req.raw.badge(req, &req.repo.repo_url())?;
    Ok(BadgeData { level })
}
