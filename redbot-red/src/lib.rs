//! # redbot-red
//!
//! red.cl prediction source: scrapes the per-visit JWT from the "cuando
//! llega" page and queries the prediction endpoint with it. Implements
//! [`redbot_core::PredictionSource`]; both calls are single-shot, no retries.

mod client;

pub use client::{RedClient, DEFAULT_PREDICTION_URL, DEFAULT_TOKEN_URL};
