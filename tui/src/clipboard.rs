//! System clipboard backed by `arboard`.

use excuse_engine::{Clipboard, ClipboardError};

/// Opens the platform clipboard on first use and keeps the handle alive.
///
/// On X11 the copied text is only served while the handle lives, so dropping it
/// after every write would lose the content.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ClipboardError("clipboard unavailable".to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let result = self
            .handle()?
            .set_text(text)
            .map_err(|e| ClipboardError(e.to_string()));
        if result.is_err() {
            // A broken handle is reopened on the next attempt.
            self.inner = None;
        }
        result
    }
}
