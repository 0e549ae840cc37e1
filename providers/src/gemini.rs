use serde::Deserialize;
use serde_json::{Value, json};

use crate::{ApiConfig, GenerationError, TextGenerator, http_client, read_capped_error_body};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    candidates: Option<Vec<Candidate>>,
    error: Option<ErrorInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    /// Set on thinking summaries; never part of the answer.
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorInfo {
    message: Option<String>,
    code: Option<u16>,
}

/// Known Gemini finish reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Language,
    Blocklist,
    ProhibitedContent,
    Spii,
    Other,
    Unknown,
}

impl FinishReason {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" => Self::Safety,
            "RECITATION" => Self::Recitation,
            "LANGUAGE" => Self::Language,
            "BLOCKLIST" => Self::Blocklist,
            "PROHIBITED_CONTENT" => Self::ProhibitedContent,
            "SPII" => Self::Spii,
            "OTHER" => Self::Other,
            _ => Self::Unknown,
        }
    }

    /// Returns a description if the model stopped abnormally.
    #[must_use]
    pub fn warning(self) -> Option<&'static str> {
        match self {
            Self::Stop | Self::MaxTokens | Self::Unknown => None,
            Self::Safety => Some("content filtered by safety settings"),
            Self::Recitation => Some("response blocked: recitation"),
            Self::Language => Some("unsupported language"),
            Self::Blocklist => Some("content contains blocked terms"),
            Self::ProhibitedContent => Some("prohibited content detected"),
            Self::Spii => Some("sensitive PII detected"),
            Self::Other => Some("generation stopped: unknown reason"),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// `TextGenerator` backed by Gemini's `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: ApiConfig) -> Result<Self, reqwest::Error> {
        let http = http_client(config.is_https())?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url(),
            self.config.model()
        )
    }

    async fn request(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.endpoint();
        tracing::debug!(model = %self.config.model(), prompt_len = prompt.len(), "Sending generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.config.api_key())
            .header("content-type", "application/json")
            .json(&build_request_body(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(GenerationError::from_status(status.as_u16(), &body));
        }

        let payload: Response = response
            .json()
            .await
            .map_err(|e| GenerationError::from_transport(&e))?;
        extract_text(payload)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.request(prompt).await
    }
}

fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }]
    })
}

/// Concatenate the answer text of the first candidate.
fn extract_text(response: Response) -> Result<String, GenerationError> {
    if let Some(error) = response.error {
        let detail = error
            .message
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(match error.code {
            Some(code) => GenerationError::from_status(code, &json!({ "message": detail }).to_string()),
            None => GenerationError::Failed {
                status: None,
                detail,
            },
        });
    }

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        tracing::warn!("Gemini response contained no candidates");
        return Ok(String::new());
    };

    if let Some(reason) = candidate.finish_reason.as_deref().map(FinishReason::parse)
        && let Some(warning) = reason.warning()
    {
        tracing::warn!(?reason, "Gemini finished abnormally: {warning}");
    }

    let text = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect::<String>();
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::{FinishReason, GeminiClient, Response, build_request_body, extract_text};
    use crate::{ApiConfig, GenerationError, TextGenerator};
    use excuse_types::{ApiKey, ModelName};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = ApiConfig::new(ApiKey::new("test-key").unwrap(), ModelName::default())
            .with_base_url(server.uri());
        GeminiClient::new(config).unwrap()
    }

    fn parse(value: serde_json::Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_body_wraps_prompt_as_single_user_turn() {
        let body = build_request_body("hello");
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn concatenates_text_parts_and_skips_thoughts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "planning...", "thought": true},
                    {"text": "Sorry, "},
                    {"text": "traffic was bad."}
                ]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(extract_text(response).unwrap(), "Sorry, traffic was bad.");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        assert_eq!(extract_text(parse(json!({}))).unwrap(), "");
        assert_eq!(
            extract_text(parse(json!({"candidates": [{"finishReason": "SAFETY"}]}))).unwrap(),
            ""
        );
    }

    #[test]
    fn inline_error_with_429_is_rate_limited() {
        let response = parse(json!({"error": {"code": 429, "message": "quota"}}));
        assert!(extract_text(response).unwrap_err().is_rate_limited());
    }

    #[test]
    fn finish_reasons_classify() {
        assert_eq!(FinishReason::parse("STOP"), FinishReason::Stop);
        assert!(FinishReason::Stop.warning().is_none());
        assert!(FinishReason::MaxTokens.warning().is_none());
        assert!(FinishReason::parse("SAFETY").warning().is_some());
        assert_eq!(FinishReason::parse("SOMETHING_NEW"), FinishReason::Unknown);
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "write it"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Sorry!"}]}, "finishReason": "STOP"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate("write it").await.unwrap();
        assert_eq!(text, "Sorry!");
    }

    #[tokio::test]
    async fn status_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("p").await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::RateLimited {
                detail: "Resource has been exhausted".to_string()
            }
        );
    }

    #[tokio::test]
    async fn server_errors_map_to_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("p").await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Failed {
                status: Some(503),
                detail: "overloaded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_failed_without_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("p").await.unwrap_err();
        assert!(!err.is_rate_limited());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn connection_refused_is_failed() {
        let config = ApiConfig::new(ApiKey::new("k").unwrap(), ModelName::default())
            .with_base_url("http://127.0.0.1:1");
        let client = GeminiClient::new(config).unwrap();
        let err = client.generate("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::Failed { status: None, .. }));
    }
}
