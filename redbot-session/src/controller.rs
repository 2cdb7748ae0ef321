//! Polling session controller: the Idle → Running → Idle state machine.
//!
//! `start` performs its check-and-launch under the store lock so two
//! concurrent starts for the same conversation cannot both launch a loop.
//! The loop itself is a spawned task that captured an immutable
//! [`TickContext`] at start time; later mutation of the session defaults
//! never affects it. Cancellation is an explicit token raced against the
//! fetch and the inter-tick sleep, and the terminal status ([`LoopOutcome`])
//! is a plain value, not an unwound panic or error.

use std::sync::Arc;
use std::time::Duration;

use redbot_core::{Bot, Chat, Credential, PredictionSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::store::{ActiveLoop, SessionStore};

/// Sent when a loop runs through all its ticks.
pub const FINISHED_NOTICE: &str = "💯 Finished sending predictions!";
/// Sent by the loop itself when it observes cancellation (distinct from the
/// acknowledgement the stop command replies with).
pub const CANCELLED_NOTICE: &str = "⛔️ Prediction updates have been cancelled.";
/// Sent when a single tick's fetch fails; the loop skips the tick and keeps
/// going.
pub const UPSTREAM_TROUBLE_NOTICE: &str =
    "🚧 Couldn't fetch predictions right now, trying again next round.";

/// Result of a `start` call. Conflicts and input problems are reported
/// outcomes, not errors; none of them crash the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started {
        stop_code: String,
        interval_seconds: u64,
        duration_minutes: u64,
    },
    /// An unfinished loop already exists; it was left untouched.
    AlreadyRunning,
    /// The credential fetch failed; nothing was launched or stored.
    NoCredential,
    /// No explicit stop code and no remembered default.
    MissingCode,
}

/// Result of a `cancel` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NothingRunning,
}

/// Terminal status of one polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    Completed,
    Cancelled,
}

/// Snapshot of a session for the info command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub default_code: Option<String>,
    pub interval_seconds: u64,
    pub duration_minutes: u64,
    /// Stop code of the current loop, when one is running.
    pub running_stop_code: Option<String>,
}

/// Everything one loop needs, captured once at start time. Immutable so a
/// later default-setting command cannot leak into an in-flight loop.
#[derive(Debug, Clone)]
pub struct TickContext {
    pub credential: Credential,
    pub stop_code: String,
    pub interval_seconds: u64,
    pub tick_count: u64,
}

/// Number of fetch-format-reply cycles for one loop (integer floor).
pub fn tick_count(duration_minutes: u64, interval_seconds: u64) -> u64 {
    duration_minutes * 60 / interval_seconds
}

/// Owns the [`SessionStore`] and drives the polling loops. One instance per
/// process, shared by the command surface.
pub struct PollController {
    store: Arc<SessionStore>,
    source: Arc<dyn PredictionSource>,
    bot: Arc<dyn Bot>,
}

impl PollController {
    pub fn new(source: Arc<dyn PredictionSource>, bot: Arc<dyn Bot>) -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            source,
            bot,
        }
    }

    /// Starts a bounded polling loop for `chat`.
    ///
    /// Order of checks: already-running, then a fresh credential, then stop
    /// code resolution (explicit argument, else remembered default). The
    /// final running re-check and the launch happen under one store guard;
    /// the credential fetch is a network call and is kept outside the lock.
    #[instrument(skip(self, chat), fields(chat_id = chat.id))]
    pub async fn start(&self, chat: &Chat, explicit_code: Option<&str>) -> StartOutcome {
        {
            let mut sessions = self.store.lock().await;
            let session = SessionStore::session_mut(&mut sessions, chat);
            if session.is_running() {
                return StartOutcome::AlreadyRunning;
            }
        }

        let credential = match self.source.fetch_credential().await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Credential fetch failed, start aborted");
                return StartOutcome::NoCredential;
            }
        };

        let mut sessions = self.store.lock().await;
        let session = SessionStore::session_mut(&mut sessions, chat);
        if session.is_running() {
            // Another start won the race while we were fetching the credential.
            return StartOutcome::AlreadyRunning;
        }

        let stop_code = match explicit_code
            .map(str::to_string)
            .or_else(|| session.default_code.clone())
        {
            Some(code) => code,
            None => return StartOutcome::MissingCode,
        };

        session.credential = Some(credential.clone());
        session.stop_code = Some(stop_code.clone());

        let ctx = TickContext {
            credential,
            stop_code: stop_code.clone(),
            interval_seconds: session.interval_seconds,
            tick_count: tick_count(session.duration_minutes, session.interval_seconds),
        };
        let duration_minutes = session.duration_minutes;

        let run_id = self.store.allocate_run_id();
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.store.clone(),
            self.bot.clone(),
            self.source.clone(),
            chat.clone(),
            ctx,
            token.clone(),
            run_id,
        ));
        session.active = Some(ActiveLoop {
            run_id,
            token,
            handle,
        });

        info!(stop_code = %stop_code, "Polling loop started");
        StartOutcome::Started {
            stop_code,
            interval_seconds: session.interval_seconds,
            duration_minutes,
        }
    }

    /// Requests cancellation of the conversation's loop, if one is running.
    /// The loop observes the token at its next suspension point, sends its
    /// own cancelled notice, and terminates with [`LoopOutcome::Cancelled`].
    pub async fn cancel(&self, chat_id: i64) -> CancelOutcome {
        let mut sessions = self.store.lock().await;
        let session = match sessions.get_mut(&chat_id) {
            Some(session) => session,
            None => return CancelOutcome::NothingRunning,
        };

        match session.active.take() {
            Some(active) if !active.handle.is_finished() => {
                active.token.cancel();
                info!(chat_id, "Polling loop cancellation requested");
                CancelOutcome::Cancelled
            }
            _ => CancelOutcome::NothingRunning,
        }
    }

    /// Remembers a default stop code for future starts.
    pub async fn set_default_code(&self, chat: &Chat, code: &str) {
        let mut sessions = self.store.lock().await;
        let session = SessionStore::session_mut(&mut sessions, chat);
        session.default_code = Some(code.to_string());
    }

    /// Sets the tick interval used by future starts. Zero would break the
    /// tick arithmetic, so it is ignored and the previous value kept; the
    /// command surface additionally rejects it with a reply.
    pub async fn set_default_interval(&self, chat: &Chat, seconds: u64) {
        if seconds == 0 {
            warn!(chat_id = chat.id, "Ignoring zero interval");
            return;
        }
        let mut sessions = self.store.lock().await;
        let session = SessionStore::session_mut(&mut sessions, chat);
        session.interval_seconds = seconds;
    }

    /// Sets the loop duration used by future starts. Zero is ignored and the
    /// previous value kept; the command surface additionally rejects it with
    /// a reply.
    pub async fn set_default_duration(&self, chat: &Chat, minutes: u64) {
        if minutes == 0 {
            warn!(chat_id = chat.id, "Ignoring zero duration");
            return;
        }
        let mut sessions = self.store.lock().await;
        let session = SessionStore::session_mut(&mut sessions, chat);
        session.duration_minutes = minutes;
    }

    /// Snapshot of the session's defaults and running state.
    pub async fn info(&self, chat: &Chat) -> SessionInfo {
        let mut sessions = self.store.lock().await;
        let session = SessionStore::session_mut(&mut sessions, chat);
        SessionInfo {
            default_code: session.default_code.clone(),
            interval_seconds: session.interval_seconds,
            duration_minutes: session.duration_minutes,
            running_stop_code: if session.is_running() {
                session.stop_code.clone()
            } else {
                None
            },
        }
    }

    /// Waits for the conversation's loop to terminate and returns its
    /// outcome (test support).
    #[doc(hidden)]
    pub async fn join_loop(&self, chat_id: i64) -> Option<LoopOutcome> {
        let handle = {
            let mut sessions = self.store.lock().await;
            match sessions.get_mut(&chat_id).and_then(|s| s.active.take()) {
                Some(active) => active.handle,
                None => return None,
            }
        };
        handle.await.ok()
    }
}

/// One polling loop: runs the ticks, sends the terminal notice, and clears
/// the session's active slot (only if it still belongs to this run).
#[instrument(skip_all, fields(chat_id = chat.id, stop_code = %ctx.stop_code))]
async fn run_loop(
    store: Arc<SessionStore>,
    bot: Arc<dyn Bot>,
    source: Arc<dyn PredictionSource>,
    chat: Chat,
    ctx: TickContext,
    token: CancellationToken,
    run_id: u64,
) -> LoopOutcome {
    let outcome = poll_ticks(bot.as_ref(), source.as_ref(), &chat, &ctx, &token).await;

    let notice = match outcome {
        LoopOutcome::Completed => FINISHED_NOTICE,
        LoopOutcome::Cancelled => CANCELLED_NOTICE,
    };
    if let Err(e) = bot.send_message(&chat, notice).await {
        warn!(error = %e, "Failed to send terminal notice");
    }

    store.clear_active(chat.id, run_id).await;
    info!(?outcome, "Polling loop terminated");
    outcome
}

/// The tick sequence. Ticks are strictly sequential: a tick's fetch and reply
/// complete (or are cancelled) before the next begins. A failed fetch skips
/// the tick, with the inter-tick wait still applied. No sleep after the final
/// tick.
async fn poll_ticks(
    bot: &dyn Bot,
    source: &dyn PredictionSource,
    chat: &Chat,
    ctx: &TickContext,
    token: &CancellationToken,
) -> LoopOutcome {
    for tick in 0..ctx.tick_count {
        let fetched = tokio::select! {
            _ = token.cancelled() => return LoopOutcome::Cancelled,
            fetched = source.fetch_prediction(&ctx.credential, &ctx.stop_code) => fetched,
        };

        match fetched {
            Ok(payload) => {
                let records = redbot_parser::parse(&payload);
                debug!(tick, records = records.len(), "Tick fetched");
                let reply = redbot_parser::render(&records);
                if let Err(e) = bot.send_message(chat, &reply).await {
                    warn!(error = %e, tick, "Failed to send tick reply");
                }
            }
            Err(e) => {
                warn!(error = %e, tick, "Tick fetch failed, skipping");
                if let Err(e) = bot.send_message(chat, UPSTREAM_TROUBLE_NOTICE).await {
                    warn!(error = %e, tick, "Failed to send upstream notice");
                }
            }
        }

        if tick + 1 < ctx.tick_count {
            tokio::select! {
                _ = token.cancelled() => return LoopOutcome::Cancelled,
                _ = tokio::time::sleep(Duration::from_secs(ctx.interval_seconds)) => {}
            }
        }
    }

    LoopOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::tick_count;

    #[test]
    fn test_tick_count_is_floored() {
        assert_eq!(tick_count(10, 60), 10);
        assert_eq!(tick_count(1, 60), 1);
        assert_eq!(tick_count(1, 45), 1);
        assert_eq!(tick_count(2, 45), 2);
        assert_eq!(tick_count(1, 90), 0);
    }
}
