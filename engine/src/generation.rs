//! Generation request lifecycle.
//!
//! One request may be outstanding. The request runs on a spawned task and reports
//! its outcome over a channel owned by the controller; the session drains that
//! channel every frame via [`GenerationController::poll`]. Each outcome carries the
//! controller-issued [`RequestId`] and the [`SelectionRevision`] captured when the
//! request was issued. An outcome is applied only while its request is still the
//! outstanding one and its revision is still current; anything else is dropped
//! unread. The in-flight task is never aborted.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use excuse_providers::{GenerationError, TextGenerator};

use crate::selection::SelectionRevision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    /// Quota exhausted. Stays until an explicit reset.
    RateLimited,
    /// Logged, then presented exactly like `Idle`.
    Failed,
}

impl GenerationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::RateLimited => "rate-limited",
            Self::Failed => "failed",
        }
    }

    /// Whether a new request may be issued from this state.
    #[must_use]
    pub const fn accepts_generate(self) -> bool {
        matches!(self, Self::Idle | Self::Succeeded | Self::Failed)
    }
}

/// Identity of one issued request. A controller never reuses one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Message sent from a request task back to the controller.
#[derive(Debug)]
pub struct GenerationOutcome {
    request: RequestId,
    revision: SelectionRevision,
    result: Result<String, GenerationError>,
}

/// Why [`GenerationController::start`] declined to issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejected {
    Busy,
    RateLimited,
}

#[derive(Debug)]
pub struct GenerationController<G> {
    generator: Arc<G>,
    status: GenerationStatus,
    result: String,
    /// Last id handed out by `start`.
    issued: u64,
    /// The outstanding request, if any.
    in_flight: Option<RequestId>,
    tx: mpsc::UnboundedSender<GenerationOutcome>,
    rx: mpsc::UnboundedReceiver<GenerationOutcome>,
}

impl<G: TextGenerator> GenerationController<G> {
    pub fn new(generator: Arc<G>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            generator,
            status: GenerationStatus::Idle,
            result: String::new(),
            issued: 0,
            in_flight: None,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    #[must_use]
    pub fn result(&self) -> &str {
        &self.result
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Issue a request for `prompt`, tagged with `revision`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, prompt: String, revision: SelectionRevision) -> Result<(), StartRejected> {
        match self.status {
            GenerationStatus::Loading => return Err(StartRejected::Busy),
            GenerationStatus::RateLimited => return Err(StartRejected::RateLimited),
            GenerationStatus::Idle | GenerationStatus::Succeeded | GenerationStatus::Failed => {}
        }

        self.issued += 1;
        let request = RequestId(self.issued);
        self.status = GenerationStatus::Loading;
        self.result.clear();
        self.in_flight = Some(request);
        tracing::info!(%request, %revision, prompt_len = prompt.len(), "Generation started");

        let generator = Arc::clone(&self.generator);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = generator.generate(&prompt).await;
            // Receiver gone means the session ended; nothing left to update.
            let _ = tx.send(GenerationOutcome {
                request,
                revision,
                result,
            });
        });
        Ok(())
    }

    /// Forget the outstanding request and any result.
    ///
    /// Status returns to `Idle` from every state, `RateLimited` included.
    pub fn invalidate(&mut self) {
        if self.status != GenerationStatus::Idle || self.in_flight.is_some() {
            tracing::debug!(from = self.status.as_str(), "Generation invalidated");
        }
        self.status = GenerationStatus::Idle;
        self.result.clear();
        self.in_flight = None;
    }

    /// Forget the outstanding request, leaving any settled result in place.
    ///
    /// Returns `true` if a request was outstanding; the status then drops from
    /// `Loading` back to `Idle`.
    pub fn abandon(&mut self) -> bool {
        let Some(request) = self.in_flight.take() else {
            return false;
        };
        tracing::debug!(%request, "Generation request abandoned");
        self.status = GenerationStatus::Idle;
        true
    }

    /// Drain finished requests. Returns `true` if state changed.
    pub fn poll(&mut self, current: SelectionRevision) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.rx.try_recv() {
            changed |= self.apply(outcome, current);
        }
        changed
    }

    fn apply(&mut self, outcome: GenerationOutcome, current: SelectionRevision) -> bool {
        let GenerationOutcome {
            request,
            revision,
            result,
        } = outcome;
        if self.in_flight != Some(request) || revision != current {
            tracing::debug!(%request, %revision, %current, "Discarding stale generation outcome");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(text) => {
                tracing::info!(%request, chars = text.chars().count(), "Generation succeeded");
                self.status = GenerationStatus::Succeeded;
                self.result = text;
            }
            Err(GenerationError::RateLimited { detail }) => {
                tracing::warn!(%request, %detail, "Generation quota exceeded");
                self.status = GenerationStatus::RateLimited;
            }
            Err(GenerationError::Failed { status, detail }) => {
                tracing::warn!(%request, ?status, %detail, "Generation failed");
                self.status = GenerationStatus::Failed;
            }
        }
        true
    }
}
