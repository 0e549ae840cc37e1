//! Text-generation collaborator for the excuse wizard.
//!
//! # Architecture
//!
//! The engine never talks HTTP directly. It depends on the [`TextGenerator`]
//! capability: one method that turns a prompt into text or a classified
//! [`GenerationError`]. [`gemini::GeminiClient`] is the production implementation;
//! tests substitute their own doubles.
//!
//! # Error Classification
//!
//! Exactly one distinction matters to callers: quota exhaustion versus everything
//! else. An HTTP `429 Too Many Requests` from the transport maps to
//! [`GenerationError::RateLimited`]; any other status, connection failure, or
//! undecodable body maps to [`GenerationError::Failed`]. No retries are attempted.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

pub use excuse_types;
pub(crate) use excuse_types::{ApiKey, ModelName};

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONNECT_TIMEOUT_SECS: u64 = 30;

// TCP keepalive; reqwest only exposes idle time, interval/retries use platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// HTTP status the generation service uses to signal quota exhaustion.
pub const RATE_LIMIT_STATUS: u16 = 429;

/// A single-operation text generation capability.
///
/// Implementations must convert every failure into a [`GenerationError`]; nothing
/// may panic across this boundary.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Classified generation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The service reported quota exhaustion.
    #[error("generation quota exceeded: {detail}")]
    RateLimited { detail: String },
    /// Any other failure: non-429 status, transport error, malformed body.
    #[error("generation request failed: {detail}")]
    Failed { status: Option<u16>, detail: String },
}

impl GenerationError {
    /// Classify an HTTP error status and its (possibly JSON) body.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_error_message(body)
            .unwrap_or_else(|| truncate_detail(body.trim()))
            .trim()
            .to_string();
        let detail = if detail.is_empty() {
            format!("HTTP {status}")
        } else {
            detail
        };

        if status == RATE_LIMIT_STATUS {
            Self::RateLimited { detail }
        } else {
            Self::Failed {
                status: Some(status),
                detail,
            }
        }
    }

    /// Classify a transport-level error (connect, timeout, decode).
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        if status == Some(RATE_LIMIT_STATUS) {
            return Self::RateLimited {
                detail: err.to_string(),
            };
        }
        Self::Failed {
            status,
            detail: err.to_string(),
        }
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(RATE_LIMIT_STATUS),
            Self::Failed { status, .. } => *status,
        }
    }
}

/// Pull the human-readable message out of a Google-style error envelope.
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let payload: serde_json::Value = serde_json::from_str(body.trim()).ok()?;
    payload
        .pointer("/error/message")
        .and_then(|value| value.as_str())
        .or_else(|| payload.pointer("/message").and_then(|value| value.as_str()))
        .map(truncate_detail)
}

fn truncate_detail(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_DETAIL_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
    out.push_str("...");
    out
}

/// Build the hardened HTTP client used for generation requests.
///
/// `https_only` is enforced unless the caller explicitly targets a plain-HTTP
/// base URL (local mock servers in tests).
pub fn http_client(https_only: bool) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(https_only)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .build()
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Credentials, model, and endpoint for the generation service.
///
/// ```rust
/// use excuse_providers::ApiConfig;
/// use excuse_types::{ApiKey, ModelName};
///
/// let config = ApiConfig::new(ApiKey::new("test").unwrap(), ModelName::default())
///     .with_base_url("http://127.0.0.1:8080/v1beta");
/// assert_eq!(config.base_url(), "http://127.0.0.1:8080/v1beta");
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_key: ApiKey,
    model: ModelName,
    base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(api_key: ApiKey, model: ModelName) -> Self {
        Self {
            api_key,
            model,
            base_url: GEMINI_API_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    #[must_use]
    pub fn model(&self) -> &ModelName {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Google Gemini API implementation.
///
/// Communicates with `{base_url}/models/{model}:generateContent` (non-streaming).
/// The whole message is short, so the response is read in one piece.
pub mod gemini;
