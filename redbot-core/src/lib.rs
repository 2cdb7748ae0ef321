//! # redbot-core
//!
//! Core types and traits for the transit prediction bot: [`Bot`], [`Handler`],
//! [`PredictionSource`], message and user types, and tracing initialization.
//! Transport-agnostic; used by redbot-session, redbot-red and redbot-telegram.

pub mod bot;
pub mod error;
pub mod logger;
pub mod source;
pub mod types;

pub use bot::Bot;
pub use error::{RedbotError, Result};
pub use logger::init_tracing;
pub use source::{Credential, PredictionSource};
pub use types::{Chat, Handler, HandlerResponse, Message, ToCoreMessage, ToCoreUser, User};
