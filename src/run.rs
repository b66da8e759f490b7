use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum size for a logged response body before truncation (4KB)
pub const MAX_RESPONSE_LOG_SIZE: usize = 4 * 1024;

/// Where a run currently is. Every run ends in one of the terminal states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Fetching,
    NoMatch,
    Matched,
    Dispatching,
    Dispatched,
    DispatchFailed,
    DryRun,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::NoMatch | RunStatus::Dispatched | RunStatus::DispatchFailed | RunStatus::DryRun
        )
    }

    fn can_move_to(self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, NoMatch)
                | (Fetching, Matched)
                | (Matched, Dispatching)
                | (Matched, DryRun)
                | (Dispatching, Dispatched)
                | (Dispatching, DispatchFailed)
        )
    }
}

/// One invocation of the fetch / match / dispatch sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub commits_seen: usize,
    pub fetch_error: Option<String>,
    pub matched_sha: Option<String>,
    pub tag: Option<String>,
    pub response: Option<String>,
    pub error: Option<String>,
}

impl Run {
    /// Create a new run in Idle status
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            status: RunStatus::Idle,
            started_at: Utc::now(),
            completed_at: None,
            commits_seen: 0,
            fetch_error: None,
            matched_sha: None,
            tag: None,
            response: None,
            error: None,
        }
    }

    pub fn mark_fetching(&mut self) {
        self.transition(RunStatus::Fetching);
    }

    /// Fetch failed; the run continues as if no commits were seen
    pub fn mark_fetch_failed(&mut self, error: String) {
        self.fetch_error = Some(error);
        self.transition(RunStatus::NoMatch);
    }

    pub fn mark_no_match(&mut self, commits_seen: usize) {
        self.commits_seen = commits_seen;
        self.transition(RunStatus::NoMatch);
    }

    pub fn mark_matched(&mut self, commits_seen: usize, sha: Option<String>, tag: String) {
        self.commits_seen = commits_seen;
        self.matched_sha = sha;
        self.tag = Some(tag);
        self.transition(RunStatus::Matched);
    }

    pub fn mark_dispatching(&mut self) {
        self.transition(RunStatus::Dispatching);
    }

    pub fn mark_dry_run(&mut self) {
        self.transition(RunStatus::DryRun);
    }

    /// Mark dispatch as successful with the response body (truncates if too large)
    pub fn mark_dispatched(&mut self, mut response: String) {
        if response.len() > MAX_RESPONSE_LOG_SIZE {
            let mut cut = MAX_RESPONSE_LOG_SIZE;
            while !response.is_char_boundary(cut) {
                cut -= 1;
            }
            response.truncate(cut);
            response.push_str("... (truncated)");
        }
        self.response = Some(response);
        self.transition(RunStatus::Dispatched);
    }

    pub fn mark_dispatch_failed(&mut self, error: String) {
        self.error = Some(error);
        self.transition(RunStatus::DispatchFailed);
    }

    fn transition(&mut self, next: RunStatus) {
        debug_assert!(
            self.status.can_move_to(next),
            "invalid run transition {:?} -> {:?}",
            self.status,
            next
        );
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
    }
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}
