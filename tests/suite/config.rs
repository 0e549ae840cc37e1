//! Config file to running client: key, model, base URL and language.

use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use excuse_config::{ExcuseConfig, Settings, SettingsError};
use excuse_engine::{App, Audience, GenerationStatus, Situation, Tone};
use excuse_providers::{ApiConfig, gemini::GeminiClient};

use crate::common::text_body;

fn write_config(dir: &tempfile::TempDir, content: &str) -> ExcuseConfig {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).expect("write config");
    ExcuseConfig::load_from(&path).expect("config parses")
}

#[tokio::test]
async fn config_settings_drive_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "from-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("Entschuldigung!")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(
        &dir,
        &format!(
            r#"
[app]
model = "gemini-2.0-flash"
language = "German"
ascii_only = true

[api_keys]
google = "${{EXCUSE_TEST_KEY}}"

[google]
base_url = "{}"
"#,
            server.uri()
        ),
    );

    let settings = Settings::resolve_with(Some(&config), |name| {
        (name == "EXCUSE_TEST_KEY").then(|| "from-env".to_string())
    })
    .expect("settings resolve");
    assert!(settings.ascii_only);
    assert_eq!(settings.language, "German");

    let mut api = ApiConfig::new(settings.api_key.clone(), settings.model.clone());
    if let Some(base_url) = settings.base_url.as_deref() {
        api = api.with_base_url(base_url);
    }
    let client = GeminiClient::new(api).expect("http client");
    let mut app = App::new(Arc::new(client)).with_language(settings.language.as_str());

    app.set_situation(Situation::SkipGathering);
    assert!(app.set_audience(Audience::Coworker));
    assert!(app.set_tone(Tone::Polite));
    assert!(app.generate());
    for _ in 0..400 {
        if app.poll_generation() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(app.status(), GenerationStatus::Succeeded);
    assert_eq!(app.result(), "Entschuldigung!");

    let requests = server.received_requests().await.unwrap_or_default();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("JSON body");
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    assert!(prompt.contains("German"));
}

#[test]
fn missing_key_everywhere_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, "[app]\nlanguage = \"English\"\n");

    let err = Settings::resolve_with(Some(&config), |_| None).unwrap_err();
    assert!(matches!(err, SettingsError::MissingApiKey));
}
