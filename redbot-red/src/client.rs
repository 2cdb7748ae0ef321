//! HTTP client for red.cl: token scrape + prediction fetch.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use redbot_core::{Credential, PredictionSource, RedbotError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_TOKEN_URL: &str = "https://www.red.cl/planifica-tu-viaje/cuando-llega/";
pub const DEFAULT_PREDICTION_URL: &str = "https://www.red.cl/predictor/prediccion";

/// Per-request timeout. The polling loop treats a slow upstream like a
/// failed tick, so a request must not outlive the tick interval.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The token page embeds the credential as a base64-encoded JWT in an inline
/// script: `$jwt = '...'`.
fn jwt_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$jwt\s*=\s*'([^']+)'").expect("valid jwt pattern"))
}

/// red.cl client: one shared [`reqwest::Client`], token and prediction URLs
/// taken from config (env) with the public red.cl defaults.
pub struct RedClient {
    http: reqwest::Client,
    token_url: String,
    prediction_url: String,
}

impl RedClient {
    pub fn new(token_url: Option<String>, prediction_url: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RedbotError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            token_url: token_url.unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            prediction_url: prediction_url.unwrap_or_else(|| DEFAULT_PREDICTION_URL.to_string()),
        })
    }
}

#[async_trait]
impl PredictionSource for RedClient {
    #[instrument(skip(self))]
    async fn fetch_credential(&self) -> Result<Credential> {
        let body = self
            .http
            .get(&self.token_url)
            .send()
            .await
            .map_err(|e| RedbotError::Upstream(format!("Token page request failed: {e}")))?
            .text()
            .await
            .map_err(|e| RedbotError::Upstream(format!("Token page read failed: {e}")))?;

        let token = extract_jwt(&body)
            .ok_or_else(|| RedbotError::Upstream("No usable JWT on token page".to_string()))?;
        debug!("Fetched fresh credential");
        Ok(Credential::new(token))
    }

    #[instrument(skip(self, credential))]
    async fn fetch_prediction(&self, credential: &Credential, stop_code: &str) -> Result<Value> {
        let payload = self
            .http
            .get(&self.prediction_url)
            .query(&[
                ("t", credential.as_str()),
                ("codsimt", stop_code),
                ("codser", ""),
            ])
            .send()
            .await
            .map_err(|e| RedbotError::Upstream(format!("Prediction request failed: {e}")))?
            .json()
            .await
            .map_err(|e| RedbotError::Upstream(format!("Prediction payload not JSON: {e}")))?;
        Ok(payload)
    }
}

/// Extracts and decodes the first `$jwt = '...'` assignment in the page.
/// Returns None when the assignment is missing or the value is not
/// base64-encoded UTF-8.
fn extract_jwt(html: &str) -> Option<String> {
    let encoded = jwt_pattern().captures(html)?.get(1)?.as_str();
    let decoded = BASE64.decode(encoded).ok()?;
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_jwt_decodes_first_match() {
        // "secret-jwt" base64-encoded.
        let html = r#"
            <html><body>
            <script>var x = 1;</script>
            <script>$jwt = 'c2VjcmV0LWp3dA==';</script>
            <script>$jwt = 'aWdub3JlZA==';</script>
            </body></html>
        "#;
        assert_eq!(extract_jwt(html).as_deref(), Some("secret-jwt"));
    }

    #[test]
    fn test_extract_jwt_tolerates_spacing() {
        let html = "$jwt='c2VjcmV0LWp3dA=='";
        assert_eq!(extract_jwt(html).as_deref(), Some("secret-jwt"));
    }

    #[test]
    fn test_extract_jwt_missing_or_invalid() {
        assert_eq!(extract_jwt("<html>no script here</html>"), None);
        assert_eq!(extract_jwt("$jwt = '%%% not base64 %%%'"), None);
    }
}
