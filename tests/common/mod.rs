//! Shared test utilities and fixtures
//!
//! A wiremock server standing in for the Gemini API, plus the session helpers
//! the suites share.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use excuse_engine::{App, Clipboard, ClipboardError};
use excuse_providers::{ApiConfig, gemini::GeminiClient};
use excuse_types::{ApiKey, ModelName};

pub const TEST_KEY: &str = "test-key";
pub const TEST_MODEL: &str = "gemini-2.5-flash";

pub fn generate_path() -> String {
    format!("/models/{TEST_MODEL}:generateContent")
}

/// A `generateContent` response carrying `text` as the only candidate part.
pub fn text_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    })
}

pub async fn mount_text(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header("x-goog-api-key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body(text)))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, status: u16, message: &str) {
    let body = serde_json::json!({
        "error": { "code": status, "message": message, "status": "ERROR" }
    });
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub fn client_for(server: &MockServer) -> GeminiClient {
    let key = ApiKey::new(TEST_KEY).expect("non-empty key");
    let model = ModelName::parse(TEST_MODEL).expect("valid model");
    let config = ApiConfig::new(key, model).with_base_url(server.uri());
    GeminiClient::new(config).expect("http client")
}

pub fn app_for(server: &MockServer) -> App<GeminiClient> {
    App::new(Arc::new(client_for(server)))
}

/// Poll until a generation outcome is applied.
pub async fn settle(app: &mut App<GeminiClient>) {
    for _ in 0..400 {
        if app.poll_generation() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("no generation outcome was applied");
}

#[derive(Default)]
pub struct MemoryClipboard {
    pub writes: Vec<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.writes.push(text.to_string());
        Ok(())
    }
}

pub fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ctrl(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

/// Feed events through the key router. Returns whether the last one asked to quit.
pub fn press(
    app: &mut App<GeminiClient>,
    clipboard: &mut MemoryClipboard,
    events: impl IntoIterator<Item = Event>,
) -> bool {
    let mut quit = false;
    for event in events {
        quit = excuse_tui::apply_event(app, event, clipboard, Instant::now());
    }
    quit
}

pub fn type_text(text: &str) -> Vec<Event> {
    text.chars().map(|c| key(KeyCode::Char(c))).collect()
}
