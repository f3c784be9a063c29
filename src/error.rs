use thiserror::Error;

/// What went wrong underneath a [`FetchFailure`].
///
/// Only used for logging. Callers treat every failure the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Status(u16),
    Decode,
}

/// The one failure a review-request fetch can resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch review requests")]
pub struct FetchFailure {
    kind: FailureKind,
}

impl FetchFailure {
    pub fn transport() -> Self {
        Self {
            kind: FailureKind::Transport,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            kind: FailureKind::Status(code),
        }
    }

    pub fn decode() -> Self {
        Self {
            kind: FailureKind::Decode,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }
}
