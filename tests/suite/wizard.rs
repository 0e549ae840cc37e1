//! End-to-end wizard flows against a mocked Gemini endpoint.

use std::time::Duration;

use crossterm::event::KeyCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use excuse_engine::{Audience, CopyLabel, GenerationStatus, Step, Tone, ui::InputMode};
use excuse_types::{Choice, Situation};

use crate::common::{
    MemoryClipboard, app_for, ctrl, generate_path, key, mount_status, mount_text, press, settle,
    text_body, type_text,
};

/// Prompt text of every request the server has seen, in order.
async fn received_prompts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let body: serde_json::Value =
                serde_json::from_slice(&request.body).expect("request body is JSON");
            body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[tokio::test]
async fn keyboard_walkthrough_generates_and_copies() {
    let server = MockServer::start().await;
    mount_text(&server, "So sorry, I'm running 15 minutes late.").await;
    let mut app = app_for(&server);
    let mut clipboard = MemoryClipboard::default();

    // Situation: first option.
    press(&mut app, &mut clipboard, [key(KeyCode::Enter)]);
    assert_eq!(app.focus(), Step::Audience);

    // Audience: third option.
    press(
        &mut app,
        &mut clipboard,
        [key(KeyCode::Down), key(KeyCode::Char('j')), key(KeyCode::Enter)],
    );
    assert_eq!(app.selection().audience(), Some(Audience::Friend));
    assert_eq!(app.focus(), Step::Tone);

    // Tone: first option, then the detail field.
    press(&mut app, &mut clipboard, [key(KeyCode::Char(' '))]);
    assert_eq!(app.focus(), Step::Detail);
    press(&mut app, &mut clipboard, [key(KeyCode::Enter)]);
    assert_eq!(app.input_mode(), InputMode::EditDetail);
    press(&mut app, &mut clipboard, type_text("the bus broke down"));
    press(&mut app, &mut clipboard, [key(KeyCode::Esc)]);
    assert_eq!(app.input_mode(), InputMode::Browse);
    assert_eq!(app.selection().detail(), "the bus broke down");

    press(&mut app, &mut clipboard, [key(KeyCode::Char('g'))]);
    assert_eq!(app.status(), GenerationStatus::Loading);
    settle(&mut app).await;
    assert_eq!(app.status(), GenerationStatus::Succeeded);
    assert_eq!(app.result(), "So sorry, I'm running 15 minutes late.");

    press(&mut app, &mut clipboard, [key(KeyCode::Char('c'))]);
    assert_eq!(clipboard.writes, vec![app.result().to_string()]);
    assert_eq!(
        app.presentation(std::time::Instant::now()).copy_label,
        CopyLabel::Confirmed
    );

    let prompts = received_prompts(&server).await;
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains(Situation::Late.label()));
    assert!(prompt.contains(Audience::Friend.label()));
    assert!(prompt.contains(Tone::Serious.label()));
    assert!(prompt.contains("the bus broke down"));
    assert!(prompt.contains("English"));
}

#[tokio::test]
async fn generate_key_does_nothing_until_three_answers() {
    let server = MockServer::start().await;
    mount_text(&server, "unused").await;
    let mut app = app_for(&server);
    let mut clipboard = MemoryClipboard::default();

    press(&mut app, &mut clipboard, [key(KeyCode::Enter), key(KeyCode::Enter)]);
    press(&mut app, &mut clipboard, [key(KeyCode::Char('g'))]);
    assert_eq!(app.status(), GenerationStatus::Idle);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(received_prompts(&server).await.is_empty());
}

#[tokio::test]
async fn repeated_generate_while_loading_sends_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_body("once"))
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;
    let mut app = app_for(&server);
    let mut clipboard = MemoryClipboard::default();
    app.set_situation(Situation::Late);
    assert!(app.set_audience(Audience::Boss));
    assert!(app.set_tone(Tone::Polite));

    press(
        &mut app,
        &mut clipboard,
        [
            key(KeyCode::Char('g')),
            key(KeyCode::Char('g')),
            key(KeyCode::Char('g')),
        ],
    );
    settle(&mut app).await;

    assert_eq!(app.result(), "once");
    assert_eq!(received_prompts(&server).await.len(), 1);
}

#[tokio::test]
async fn slow_response_for_an_older_answer_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_body("for the friend"))
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;
    let mut app = app_for(&server);
    app.set_situation(Situation::Late);
    assert!(app.set_audience(Audience::Friend));
    assert!(app.set_tone(Tone::Serious));
    assert!(app.generate());

    // Changing the audience clears the tone and the request.
    assert!(app.set_audience(Audience::Boss));
    assert_eq!(app.status(), GenerationStatus::Idle);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!app.poll_generation());
    assert_eq!(app.status(), GenerationStatus::Idle);
    assert_eq!(app.result(), "");
    assert_eq!(app.selection().tone(), None);
}

#[tokio::test]
async fn server_failure_is_quiet_and_retryable() {
    let server = MockServer::start().await;
    mount_status(&server, 503, "The model is overloaded.").await;
    let mut app = app_for(&server);
    let mut clipboard = MemoryClipboard::default();
    app.set_situation(Situation::LateWork);
    assert!(app.set_audience(Audience::Coworker));
    assert!(app.set_tone(Tone::Honest));

    press(&mut app, &mut clipboard, [key(KeyCode::Char('g'))]);
    settle(&mut app).await;
    assert_eq!(app.status(), GenerationStatus::Failed);
    let view = app.presentation(std::time::Instant::now());
    assert!(view.generate_visible);
    assert!(!view.lockout_visible);
    assert!(!view.result_visible);

    press(&mut app, &mut clipboard, [key(KeyCode::Char('g'))]);
    settle(&mut app).await;
    assert_eq!(received_prompts(&server).await.len(), 2);
}

#[tokio::test]
async fn ctrl_c_quits_while_editing() {
    let server = MockServer::start().await;
    let mut app = app_for(&server);
    let mut clipboard = MemoryClipboard::default();
    app.set_situation(Situation::Late);
    assert!(app.set_audience(Audience::Friend));
    assert!(app.set_tone(Tone::Funny));
    assert!(app.enter_detail_edit());

    // 'q' is text while editing.
    assert!(!press(&mut app, &mut clipboard, [key(KeyCode::Char('q'))]));
    assert_eq!(app.selection().detail(), "q");
    assert!(press(&mut app, &mut clipboard, [ctrl('c')]));
    assert!(app.should_quit());
}
