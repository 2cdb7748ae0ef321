//! # redbot-session
//!
//! Per-conversation polling sessions: the [`SessionStore`] keeps remembered
//! defaults and the handle of any in-flight loop; the [`PollController`] is
//! the state machine that starts, runs, and cancels bounded polling loops,
//! enforcing at most one active loop per conversation.

pub mod controller;
pub mod store;

pub use controller::{
    CancelOutcome, LoopOutcome, PollController, SessionInfo, StartOutcome, TickContext,
    tick_count, CANCELLED_NOTICE, FINISHED_NOTICE, UPSTREAM_TROUBLE_NOTICE,
};
pub use store::{Session, SessionStore, DEFAULT_DURATION_MINUTES, DEFAULT_INTERVAL_SECONDS};
