//! Prediction source seam: credential fetch and per-stop prediction fetch.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Opaque token required by the prediction endpoint. Obtained fresh on each
/// session start; never inspected by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Upstream prediction service. Both calls are single-shot: no retries, one
/// request per invocation. The payload stays a raw [`Value`] because the
/// upstream shape is key-suffix-driven; redbot-parser turns it into records.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Obtains a fresh credential for subsequent prediction calls.
    async fn fetch_credential(&self) -> Result<Credential>;

    /// Fetches the raw prediction payload for one stop.
    async fn fetch_prediction(&self, credential: &Credential, stop_code: &str) -> Result<Value>;
}
