//! In-memory session store: one [`Session`] per conversation, created lazily
//! on first use and kept for the process lifetime. Owned by the controller,
//! never ambient.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use redbot_core::{Chat, Credential};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::controller::LoopOutcome;

pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_DURATION_MINUTES: u64 = 10;

/// Registration of an in-flight polling loop. `run_id` ties the registration
/// to one spawned loop so a terminating loop only clears its own slot.
pub struct ActiveLoop {
    pub run_id: u64,
    pub token: CancellationToken,
    pub handle: JoinHandle<LoopOutcome>,
}

/// Per-conversation state: remembered defaults, last credential, and the
/// in-flight loop if any. Defaults are mutated in place by the default-setting
/// commands; a running loop is never affected (it captured its own context at
/// start time).
pub struct Session {
    pub chat: Chat,
    pub default_code: Option<String>,
    /// Effective stop code of the most recent start.
    pub stop_code: Option<String>,
    pub interval_seconds: u64,
    pub duration_minutes: u64,
    pub credential: Option<Credential>,
    pub active: Option<ActiveLoop>,
}

impl Session {
    fn new(chat: Chat) -> Self {
        Self {
            chat,
            default_code: None,
            stop_code: None,
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            credential: None,
            active: None,
        }
    }

    /// True while an unfinished loop is registered for this conversation.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map(|active| !active.handle.is_finished())
            .unwrap_or(false)
    }
}

/// Map of conversation id to [`Session`] behind one async mutex. All
/// check-and-mutate sequences (notably check-and-launch in the controller)
/// run under a single guard, so two concurrent starts cannot both observe
/// Idle.
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
    next_run_id: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Locks the store. The controller holds the guard across its critical
    /// sections.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, HashMap<i64, Session>> {
        self.sessions.lock().await
    }

    /// Allocates an id for a new polling loop.
    pub(crate) fn allocate_run_id(&self) -> u64 {
        self.next_run_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the session for `chat`, creating it on first use.
    pub(crate) fn session_mut<'a>(
        sessions: &'a mut HashMap<i64, Session>,
        chat: &Chat,
    ) -> &'a mut Session {
        sessions
            .entry(chat.id)
            .or_insert_with(|| Session::new(chat.clone()))
    }

    /// Clears the active slot of `chat_id` if it still belongs to `run_id`.
    /// Called by a loop on its terminal path; a newer registration (a start
    /// racing with our teardown) is left untouched.
    pub(crate) async fn clear_active(&self, chat_id: i64, run_id: u64) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&chat_id) {
            if session.active.as_ref().map(|a| a.run_id) == Some(run_id) {
                session.active = None;
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
