//! Recent releases and their assets

use crate::checker::{CheckError, CheckRequest};
use crate::clients::Release;

/// Number of most recent releases inspected
pub const RELEASE_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedReleaseData {
    /// Newest first, at most [`RELEASE_LOOKBACK`]
    pub releases: Vec<Release>,
}

pub fn collect(req: &CheckRequest) -> Result<SignedReleaseData, CheckError> {
    let releases = req
        .raw
        .releases(req)?
        .iter()
        .take(RELEASE_LOOKBACK)
        .cloned()
        .collect();
    Ok(SignedReleaseData { releases })
}
