use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A person requested to review a pull request. The login is the whole identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reviewer {
    pub login: String,
}

impl Reviewer {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// Reviewers requested on a single pull request, in API order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewRequestRecord {
    pub reviewers: Vec<Reviewer>,
}

impl ReviewRequestRecord {
    pub fn new(reviewers: impl IntoIterator<Item = Reviewer>) -> Self {
        Self {
            reviewers: reviewers.into_iter().collect(),
        }
    }

    /// Shorthand for building records from plain logins.
    pub fn from_logins<'a>(logins: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(logins.into_iter().map(Reviewer::new))
    }
}

pub fn flatten(records: &[ReviewRequestRecord]) -> Vec<Reviewer> {
    records
        .iter()
        .flat_map(|r| r.reviewers.iter().cloned())
        .collect()
}

/// Drop repeated logins, keeping the first occurrence of each.
pub fn distinct(reviewers: &[Reviewer]) -> Vec<Reviewer> {
    let mut seen: HashSet<&str> = HashSet::new();
    reviewers
        .iter()
        .filter(|r| seen.insert(r.login.as_str()))
        .cloned()
        .collect()
}

pub fn count(reviewers: &[Reviewer]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for reviewer in reviewers {
        *counts.entry(reviewer.login.clone()).or_default() += 1;
    }
    counts
}

/// Per-reviewer request counts plus the de-duplicated reviewer list.
///
/// `reviewers` holds exactly the keys of `counts`, ordered by first
/// appearance across the input records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewerTally {
    pub counts: HashMap<String, usize>,
    pub reviewers: Vec<Reviewer>,
}

impl ReviewerTally {
    pub fn from_records(records: &[ReviewRequestRecord]) -> Self {
        let flat = flatten(records);
        Self {
            counts: count(&flat),
            reviewers: distinct(&flat),
        }
    }
}
