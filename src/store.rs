//! Reviewer state and the single entry point that mutates it.
//!
//! [`reduce`] is the whole state machine. [`Store`] owns the state, runs the
//! fetch effect on the Tokio runtime and feeds the result back through its
//! queue, so every mutation happens on whichever task owns the store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::domain::reviewer::{ReviewRequestRecord, Reviewer, ReviewerTally};
use crate::error::{FailureKind, FetchFailure};
use crate::repo::ReviewSource;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewerState {
    pub reviewer_counts: HashMap<String, usize>,
    pub distinct_reviewers: Vec<Reviewer>,
    pub is_loading: bool,
}

impl ReviewerState {
    /// Spinner only while nothing is on screen yet.
    pub fn shows_spinner(&self) -> bool {
        self.is_loading && self.distinct_reviewers.is_empty()
    }

    /// Requests counted for `login`; 0 when unknown or after a failed fetch.
    pub fn count_for(&self, login: &str) -> usize {
        self.reviewer_counts.get(login).copied().unwrap_or(0)
    }

    /// `(login, count)` pairs in display order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.distinct_reviewers
            .iter()
            .map(|r| (r.login.as_str(), self.count_for(&r.login)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RequestFetch,
    FetchCompleted(Result<Vec<ReviewRequestRecord>, FetchFailure>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Fetch,
}

pub fn reduce(state: &mut ReviewerState, action: Action) -> Effect {
    match action {
        Action::RequestFetch => {
            if state.is_loading {
                debug!("fetch already in flight; ignoring request");
                return Effect::None;
            }
            state.is_loading = true;
            Effect::Fetch
        }
        Action::FetchCompleted(Ok(records)) => {
            let tally = ReviewerTally::from_records(&records);
            state.reviewer_counts = tally.counts;
            state.distinct_reviewers = tally.reviewers;
            state.is_loading = false;
            Effect::None
        }
        Action::FetchCompleted(Err(_)) => {
            // The reviewer list stays on screen; only the counts are dropped.
            state.reviewer_counts.clear();
            state.is_loading = false;
            Effect::None
        }
    }
}

pub struct Store<S: ReviewSource> {
    state: ReviewerState,
    last_failure: Option<FetchFailure>,
    source: Arc<S>,
    runtime: Handle,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
}

impl<S: ReviewSource> Store<S> {
    pub fn new(source: S, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: ReviewerState::default(),
            last_failure: None,
            source: Arc::new(source),
            runtime,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &ReviewerState {
        &self.state
    }

    /// Failure of the most recent completed fetch, cleared by the next success.
    pub fn last_failure(&self) -> Option<&FetchFailure> {
        self.last_failure.as_ref()
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatch");
        match &action {
            Action::FetchCompleted(Ok(records)) => {
                info!(pull_requests = records.len(), "review requests fetched");
                self.last_failure = None;
            }
            Action::FetchCompleted(Err(failure)) => {
                match failure.kind() {
                    FailureKind::Status(code) => warn!(status = code, "{failure}"),
                    kind => warn!(?kind, "{failure}"),
                }
                self.last_failure = Some(failure.clone());
            }
            Action::RequestFetch => {}
        }

        if reduce(&mut self.state, action) == Effect::Fetch {
            self.spawn_fetch();
        }
        debug!(state = ?self.state, "state updated");
    }

    fn spawn_fetch(&self) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let fetch = self
            .runtime
            .spawn(async move { source.fetch_review_requests().await });
        self.runtime.spawn(async move {
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "fetch task did not finish");
                    Err(FetchFailure::transport())
                }
            };
            // The receiver lives in the store; if it is gone nobody is listening.
            let _ = tx.send(Action::FetchCompleted(result));
        });
    }

    /// Apply every completion that has arrived. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Wait for the next queued completion and apply it.
    pub async fn next(&mut self) {
        if let Some(action) = self.rx.recv().await {
            self.dispatch(action);
        }
    }

    /// Run one fetch to completion.
    pub async fn refresh(&mut self) -> Result<(), FetchFailure> {
        self.dispatch(Action::RequestFetch);
        while self.state.is_loading {
            self.next().await;
        }
        match self.last_failure.clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}
