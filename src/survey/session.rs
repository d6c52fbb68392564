use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Where a user currently is in the survey. An explicit tagged state keeps
/// "mid-question with no question" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingStart,
    Question(usize),
    Terminated,
}

/// A voice answer recorded for later relay to the admin chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceForward {
    pub question_id: usize,
    pub message_id: i64,
}

/// Per-user in-memory survey progress. Created on /start, overwritten on
/// restart, dropped on cancel or completion. Only the state machine mutates
/// it.
#[derive(Debug, Clone)]
pub struct Session {
    pub stage: Stage,
    /// questionId → ordered answer entries. Multi-select questions accumulate
    /// several; single-select and free-form hold exactly one.
    pub answers: BTreeMap<usize, Vec<String>>,
    /// Guard against double-delivered button events: the token of the last
    /// processed tap. Deliberately remembers only one token.
    pub last_event_token: Option<String>,
    pub pending_forwards: Vec<VoiceForward>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::AwaitingStart,
            answers: BTreeMap::new(),
            last_event_token: None,
            pending_forwards: Vec::new(),
        }
    }

    /// Discard all progress, as a fresh /start does.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn selected(&self, question_id: usize) -> &[String] {
        self.answers
            .get(&question_id)
            .map_or(&[], |entries| entries.as_slice())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide session map keyed by user id. The outer lock only guards map
/// shape; each entry carries its own `tokio::Mutex` so events for one user are
/// processed strictly one at a time while distinct users proceed in parallel.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the slot for a user, creating an `AwaitingStart` session if none
    /// exists yet. A missing session is indistinguishable from a brand-new
    /// user, which is exactly the orphaned-input semantics the machine wants.
    pub fn slot(&self, user_id: i64) -> Arc<tokio::sync::Mutex<Session>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            sessions
                .entry(user_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Session::new()))),
        )
    }

    pub fn remove(&self, user_id: i64) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(&user_id);
    }

    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
