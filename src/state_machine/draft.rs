use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::JobDraftContext;
use super::state::{EventKind, State};

/// Number of accepted transitions a draft remembers unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// One accepted event and the states on either side of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: State,
    pub to: State,
    pub event: EventKind,
    pub at: DateTime<Utc>,
}

/// A single job-creation form session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDraft {
    pub id: String,
    pub state: State,
    pub context: JobDraftContext,
    pub history: VecDeque<TransitionRecord>,
    pub history_limit: usize,
    pub accepted_count: u64,
    pub ignored_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl JobDraft {
    pub fn new(history_limit: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            state: State::Init,
            context: JobDraftContext::default(),
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            accepted_count: 0,
            ignored_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn record(&mut self, from: State, to: State, event: EventKind) {
        let now = Utc::now();
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(TransitionRecord {
            from,
            to,
            event,
            at: now,
        });
        self.accepted_count += 1;
        self.updated_at = now;
    }

    /// States visited, starting with the oldest remembered source state.
    pub fn state_path(&self) -> Vec<State> {
        let mut path: Vec<State> = self.history.front().map(|r| r.from).into_iter().collect();
        if path.is_empty() {
            path.push(self.state);
        }
        path.extend(self.history.iter().map(|r| r.to));
        path
    }
}

/// Structured summary of a form session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub draft_id: String,
    pub final_state: State,
    pub state_path: Vec<State>,
    pub accepted_events: u64,
    pub ignored_events: u64,
    pub started_at: DateTime<Utc>,
    pub last_change_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl SessionRecord {
    pub fn from_draft(draft: &JobDraft) -> Self {
        let now = Utc::now();
        Self {
            draft_id: draft.id.clone(),
            final_state: draft.state,
            state_path: draft.state_path(),
            accepted_events: draft.accepted_count,
            ignored_events: draft.ignored_count,
            started_at: draft.created_at,
            last_change_at: draft.updated_at,
            duration_ms: (now - draft.created_at).num_milliseconds(),
        }
    }
}
