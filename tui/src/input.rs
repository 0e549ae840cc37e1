//! Input handling for the excuse wizard.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::debug;

use excuse_engine::{App, Clipboard, GenerationStatus, Step, TextGenerator, ui::InputMode};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

/// The detail is a single line; pasted line breaks become spaces.
fn flatten_paste(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured send in the input thread unblocks.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending terminal events into `app`. Returns `true` once the user asked to quit.
pub fn handle_events<G: TextGenerator>(
    app: &mut App<G>,
    input: &mut InputPump,
    clipboard: &mut impl Clipboard,
) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        processed += 1;
        if apply_event(app, ev, clipboard, Instant::now()) {
            return Ok(true);
        }
    }
    Ok(app.should_quit())
}

/// Route a single terminal event. Returns [`App::should_quit`] afterwards.
///
/// While the rate-limit lockout is up only the quit keys do anything.
pub fn apply_event<G: TextGenerator>(
    app: &mut App<G>,
    event: Event,
    clipboard: &mut impl Clipboard,
    now: Instant,
) -> bool {
    match event {
        Event::Key(key) => {
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                app.request_quit();
                return true;
            }

            if app.status() == GenerationStatus::RateLimited {
                if key.code == KeyCode::Char('q') {
                    app.request_quit();
                } else {
                    debug!(code = ?key.code, "Key ignored during lockout");
                }
                return app.should_quit();
            }

            match app.input_mode() {
                InputMode::Browse => handle_browse_mode(app, key, clipboard, now),
                InputMode::EditDetail => handle_edit_mode(app, key),
            }
        }
        Event::Paste(text) => {
            if app.status() != GenerationStatus::RateLimited
                && app.input_mode() == InputMode::EditDetail
            {
                app.insert_str(&flatten_paste(&text));
            }
        }
        _ => {}
    }
    app.should_quit()
}

fn handle_browse_mode<G: TextGenerator>(
    app: &mut App<G>,
    key: KeyEvent,
    clipboard: &mut impl Clipboard,
    now: Instant,
) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Tab | KeyCode::Right => app.focus_next(),
        KeyCode::BackTab | KeyCode::Left => app.focus_prev(),
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_focused(),
        KeyCode::Char('i') if app.focus() == Step::Detail => {
            app.enter_detail_edit();
        }
        KeyCode::Char('g') => {
            app.generate();
        }
        KeyCode::Char('c') => {
            app.copy_result(clipboard, now);
        }
        _ => {}
    }
}

fn handle_edit_mode<G: TextGenerator>(app: &mut App<G>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.exit_detail_edit(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.move_left(),
        KeyCode::Right => app.move_right(),
        KeyCode::Home => app.move_home(),
        KeyCode::End => app.move_end(),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.insert_char(c);
        }
        _ => {}
    }
}
