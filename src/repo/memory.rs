use super::ReviewSource;
use crate::domain::reviewer::ReviewRequestRecord;
use crate::error::FetchFailure;

/// Serves a fixed set of records, or a fixed failure.
#[derive(Debug, Clone, Default)]
pub struct StaticReviewSource {
    records: Vec<ReviewRequestRecord>,
    fail: bool,
}

impl StaticReviewSource {
    pub fn with_seed(seed: impl IntoIterator<Item = ReviewRequestRecord>) -> Self {
        Self {
            records: seed.into_iter().collect(),
            fail: false,
        }
    }

    #[cfg(test)]
    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
        }
    }

    /// Sample data shown with `--demo`.
    pub fn demo() -> Self {
        Self::with_seed([
            ReviewRequestRecord::from_logins(["hoge"]),
            ReviewRequestRecord::from_logins(["kalupas", "hoge"]),
            ReviewRequestRecord::from_logins(["maria", "kalupas", "hoge"]),
            ReviewRequestRecord::from_logins(["marianu", "hoge"]),
        ])
    }
}

impl ReviewSource for StaticReviewSource {
    async fn fetch_review_requests(&self) -> Result<Vec<ReviewRequestRecord>, FetchFailure> {
        if self.fail {
            return Err(FetchFailure::transport());
        }
        Ok(self.records.clone())
    }
}
