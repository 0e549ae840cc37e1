//! Quota exhaustion from the server ends the session.

use crossterm::event::{Event, KeyCode};
use wiremock::MockServer;

use excuse_engine::{Audience, GenerationStatus, Situation, Step, Tone};

use crate::common::{MemoryClipboard, app_for, key, mount_status, press, settle};

#[tokio::test]
async fn quota_exhaustion_locks_everything_but_quit() {
    let server = MockServer::start().await;
    mount_status(&server, 429, "Resource has been exhausted (e.g. check quota).").await;
    let mut app = app_for(&server);
    let mut clipboard = MemoryClipboard::default();
    app.set_situation(Situation::CancelPlans);
    assert!(app.set_audience(Audience::Partner));
    assert!(app.set_tone(Tone::Heartfelt));

    press(&mut app, &mut clipboard, [key(KeyCode::Char('g'))]);
    settle(&mut app).await;
    assert_eq!(app.status(), GenerationStatus::RateLimited);

    let view = app.presentation(std::time::Instant::now());
    assert!(view.lockout_visible);
    assert!(!view.generate_visible);
    assert!(!view.result_visible);

    let focus = app.focus();
    let revision = app.selection().revision();
    let ignored: Vec<Event> = [
        KeyCode::Char('g'),
        KeyCode::Char('c'),
        KeyCode::Tab,
        KeyCode::BackTab,
        KeyCode::Up,
        KeyCode::Enter,
        KeyCode::Esc,
    ]
    .into_iter()
    .map(key)
    .collect();
    assert!(!press(&mut app, &mut clipboard, ignored));
    assert_eq!(app.status(), GenerationStatus::RateLimited);
    assert_eq!(app.focus(), focus);
    assert_eq!(app.selection().revision(), revision);
    assert!(clipboard.writes.is_empty());
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);

    assert!(press(&mut app, &mut clipboard, [key(KeyCode::Char('q'))]));
}

#[tokio::test]
async fn reset_lifts_the_lockout() {
    let server = MockServer::start().await;
    mount_status(&server, 429, "quota").await;
    let mut app = app_for(&server);
    app.set_situation(Situation::Late);
    assert!(app.set_audience(Audience::Boss));
    assert!(app.set_tone(Tone::Serious));
    assert!(app.generate());
    settle(&mut app).await;
    assert_eq!(app.status(), GenerationStatus::RateLimited);

    app.reset();
    assert_eq!(app.status(), GenerationStatus::Idle);
    assert_eq!(app.selection().situation(), None);
    assert_eq!(app.focus(), Step::Situation);
}
