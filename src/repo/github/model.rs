use crate::domain::reviewer::{ReviewRequestRecord, Reviewer};

/// The slice of a REST pull-request object this tool reads.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PullRequest {
    pub requested_reviewers: Vec<Reviewer>,
}

impl From<PullRequest> for ReviewRequestRecord {
    fn from(pr: PullRequest) -> Self {
        ReviewRequestRecord::new(pr.requested_reviewers)
    }
}
