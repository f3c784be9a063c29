use std::future::Future;

use crate::domain::reviewer::ReviewRequestRecord;
use crate::error::FetchFailure;

pub mod github;
pub mod memory;

/// Anything that can list the reviewers requested on a repository's pull requests.
pub trait ReviewSource: Send + Sync + 'static {
    fn fetch_review_requests(
        &self,
    ) -> impl Future<Output = Result<Vec<ReviewRequestRecord>, FetchFailure>> + Send;
}
