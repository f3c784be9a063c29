use tracing::warn;

use crate::repo::ReviewSource;
use crate::store::{Action, ReviewerState, Store};

pub struct App<S: ReviewSource> {
    store: Store<S>,
    pub title: String,
    pub profile_base: String,
    pub selected: usize,
    pub status: Option<String>,
    was_loading: bool,
}

impl<S: ReviewSource> App<S> {
    pub fn new(store: Store<S>, title: impl Into<String>, profile_base: impl Into<String>) -> Self {
        Self {
            store,
            title: title.into(),
            profile_base: profile_base.into(),
            selected: 0,
            status: None,
            was_loading: false,
        }
    }

    pub fn state(&self) -> &ReviewerState {
        self.store.state()
    }

    pub fn start_fetch(&mut self) {
        if self.state().is_loading {
            self.set_status("Fetch already running");
            return;
        }
        self.store.dispatch(Action::RequestFetch);
        self.was_loading = true;
        self.set_status("Fetching review requests...");
    }

    /// Apply finished fetches and update the status line once a fetch lands.
    pub fn poll_fetch(&mut self) {
        self.store.poll();
        let loading = self.state().is_loading;
        if self.was_loading && !loading {
            if self.store.last_failure().is_some() {
                self.set_status("Fetch failed; counts cleared");
            } else {
                let n = self.state().distinct_reviewers.len();
                self.set_status(&format!("Fetched {n} reviewers"));
            }
            self.clamp_selection();
        }
        self.was_loading = loading;
    }

    pub fn select_next(&mut self) {
        let len = self.state().distinct_reviewers.len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.state().distinct_reviewers.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn selected_login(&self) -> Option<&str> {
        self.state()
            .distinct_reviewers
            .get(self.selected)
            .map(|r| r.login.as_str())
    }

    pub fn profile_url(&self, login: &str) -> String {
        format!("{}/{login}", self.profile_base.trim_end_matches('/'))
    }

    pub fn open_selected(&mut self) {
        let Some(login) = self.selected_login().map(str::to_owned) else {
            self.set_status("No reviewer selected");
            return;
        };
        let url = self.profile_url(&login);
        match open::that(&url) {
            Ok(()) => self.set_status(&format!("Opened {url}")),
            Err(e) => {
                warn!(error = %e, %url, "failed to open browser");
                self.set_status(&format!("Could not open {url}"));
            }
        }
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status = Some(msg.to_string());
    }
}

/// Web profile root matching an API base: `https://github.com` for the public
/// API, the host root for GitHub Enterprise (`https://host/api/v3`).
pub fn profile_base_for(api_base: &str) -> String {
    let base = api_base.trim_end_matches('/');
    if base == "https://api.github.com" {
        return "https://github.com".to_string();
    }
    base.strip_suffix("/api/v3").unwrap_or(base).to_string()
}
