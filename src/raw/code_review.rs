//! Changesets on the default branch and their reviews

use crate::checker::{CheckError, CheckRequest};
use crate::clients::Review;
use std::collections::BTreeMap;

/// One unit of change: a merged pull request, or a commit pushed directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
    /// `#<number>` for a pull request, the commit SHA otherwise
    pub id: String,
    pub author: Option<String>,
    pub change_request: Option<u64>,
    pub merged_by: Option<String>,
    pub reviews: Vec<Review>,
    pub commit_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeReviewData {
    pub changesets: Vec<Changeset>,
}

pub fn collect(req: &CheckRequest) -> Result<CodeReviewData, CheckError> {
    let commits = req.raw.commits(req)?;

    let mut by_request: BTreeMap<u64, Changeset> = BTreeMap::new();
    let mut changesets = Vec::new();
    for commit in commits.iter() {
        match &commit.change_request {
            Some(cr) => {
                by_request
                    .entry(cr.number)
                    .and_modify(|c| c.commit_count += 1)
                    .or_insert_with(|| Changeset {
                        id: format!("#{}", cr.number),
                        author: cr.author.clone().or_else(|| commit.author.clone()),
                        change_request: Some(cr.number),
                        merged_by: cr.merged_by.clone(),
                        reviews: cr.reviews.clone(),
                        commit_count: 1,
                    });
            }
            None => changesets.push(Changeset {
                id: commit.sha.clone(),
                author: commit.author.clone(),
                change_request: None,
                merged_by: None,
                reviews: Vec::new(),
                commit_count: 1,
            }),
        }
    }
    changesets.extend(by_request.into_values());
    Ok(CodeReviewData { changesets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeRepoClient;
    use crate::clients::{ChangeRequest, Commit};
    use std::sync::Arc;

    fn commit(sha: &str, cr: Option<u64>) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: String::new(),
            author: Some("dev".to_string()),
            committed_at: None,
            change_request: cr.map(|number| ChangeRequest {
                number,
                author: Some("dev".to_string()),
                head_sha: format!("head-{number}"),
                merged_by: None,
                merged_at: None,
                reviews: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_commits_grouped_by_pull_request() {
        let repo = FakeRepoClient {
            commits: vec![commit("a", Some(7)), commit("b", Some(7)), commit("c", None)],
            ..Default::default()
        };
        let req = CheckRequest::new(Arc::new(repo));
        let data = collect(&req).expect("collect");

        assert_eq!(data.changesets.len(), 2);
        assert_eq!(data.changesets[0].id, "c");
        assert_eq!(data.changesets[1].id, "#7");
        assert_eq!(data.changesets[1].commit_count, 2);
    }
}
