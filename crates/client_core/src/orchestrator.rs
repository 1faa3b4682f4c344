//! Analysis channel: selection → validation → submit → normalize → publish.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::{AnalysisMode, DetailLevel},
    protocol::{Endpoint, DEFAULT_LANGUAGE},
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    document::Document,
    error::AnalysisError,
    guard::ResetOnDrop,
    normalize::normalize,
    request::{RequestOptions, UploadRequest},
    transport::Transport,
    view_model::ViewModel,
    ClientEvent,
};

/// Phase message left behind when a submit future is dropped mid-request.
const CANCELLED: &str = "analysis cancelled before it completed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Validating,
    Submitting,
    Normalizing,
    Ready,
    Error(String),
}

impl UploadPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::Normalizing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Published(ViewModel),
    /// A request was already in flight; nothing was sent.
    Busy,
}

/// Point-in-time copy of the channel state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSnapshot {
    pub mode: AnalysisMode,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub language: String,
    pub detail: DetailLevel,
    pub phase: UploadPhase,
    pub published: Option<ViewModel>,
}

struct UploadState {
    mode: AnalysisMode,
    primary: Option<Document>,
    secondary: Option<Document>,
    language: String,
    detail: DetailLevel,
    phase: UploadPhase,
    published: Option<ViewModel>,
}

impl Default for UploadState {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            primary: None,
            secondary: None,
            language: DEFAULT_LANGUAGE.to_string(),
            detail: DetailLevel::default(),
            phase: UploadPhase::Idle,
            published: None,
        }
    }
}

/// Owns the selected inputs and the published [`ViewModel`].
///
/// The state lock is never held across the network call. Dropping a
/// [`UploadOrchestrator::submit`] future mid-request moves the channel to
/// `Error(CANCELLED)` so the next submit is accepted.
pub struct UploadOrchestrator<T: Transport> {
    transport: Arc<T>,
    state: Mutex<UploadState>,
    events: broadcast::Sender<ClientEvent>,
}

impl<T: Transport> UploadOrchestrator<T> {
    pub fn new(transport: Arc<T>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            transport,
            state: Mutex::new(UploadState::default()),
            events,
        }
    }

    /// Switching mode never touches the published result.
    pub async fn select_mode(&self, mode: AnalysisMode) {
        self.state().mode = mode;
    }

    pub async fn select_primary(&self, document: Document) {
        self.state().primary = Some(document);
    }

    pub async fn select_secondary(&self, document: Document) {
        self.state().secondary = Some(document);
    }

    pub async fn clear_secondary(&self) {
        self.state().secondary = None;
    }

    /// Blank input resets to the service default language.
    pub async fn set_language(&self, language: &str) {
        let language = language.trim();
        self.state().language = if language.is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            language.to_string()
        };
    }

    pub async fn set_detail_level(&self, detail: DetailLevel) {
        self.state().detail = detail;
    }

    pub async fn mode(&self) -> AnalysisMode {
        self.state().mode
    }

    pub async fn phase(&self) -> UploadPhase {
        self.state().phase.clone()
    }

    pub async fn published(&self) -> Option<ViewModel> {
        self.state().published.clone()
    }

    /// Drops the published result. Refused while a request is in flight so
    /// the completion step stays the only writer during a cycle.
    pub async fn clear_result(&self) -> bool {
        let mut state = self.state();
        if state.phase.is_in_flight() {
            return false;
        }
        state.published = None;
        true
    }

    pub async fn snapshot(&self) -> UploadSnapshot {
        let state = self.state();
        UploadSnapshot {
            mode: state.mode,
            primary: state.primary.as_ref().map(|d| d.file_name.clone()),
            secondary: state.secondary.as_ref().map(|d| d.file_name.clone()),
            language: state.language.clone(),
            detail: state.detail,
            phase: state.phase.clone(),
            published: state.published.clone(),
        }
    }

    pub async fn submit(&self) -> Result<SubmitOutcome, AnalysisError> {
        let request = {
            let mut state = self.state();
            if state.phase.is_in_flight() {
                debug!(phase = ?state.phase, "analysis already in flight; ignoring submit");
                return Ok(SubmitOutcome::Busy);
            }

            self.transition(&mut state, UploadPhase::Validating);
            let options = RequestOptions {
                language: state.language.clone(),
                detail: state.detail,
            };
            match UploadRequest::validate(
                state.mode,
                state.primary.as_ref(),
                state.secondary.as_ref(),
                options,
            ) {
                Ok(request) => {
                    self.transition(&mut state, UploadPhase::Submitting);
                    request
                }
                Err(err) => {
                    self.fail(&mut state, err.to_string());
                    return Err(err.into());
                }
            }
        };

        let mode = request.mode();
        info!(%mode, bytes = request.total_bytes(), "submitting analysis");
        let in_flight = ResetOnDrop::new(|| self.cancel());
        let result = self
            .transport
            .submit(Endpoint::Analyze, request.into_form())
            .await;
        in_flight.disarm();

        let mut state = self.state();
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%mode, status = ?err.status(), "analysis request failed: {err}");
                self.fail(&mut state, err.to_string());
                return Err(err.into());
            }
        };

        self.transition(&mut state, UploadPhase::Normalizing);
        match normalize(mode, &raw) {
            Ok(view) => {
                state.published = Some(view.clone());
                self.transition(&mut state, UploadPhase::Ready);
                let _ = self.events.send(ClientEvent::AnalysisPublished(view.clone()));
                info!(%mode, rows = view.comparison_table.len(), "analysis published");
                Ok(SubmitOutcome::Published(view))
            }
            Err(err) => {
                warn!(%mode, "analysis payload rejected: {err}");
                self.fail(&mut state, err.to_string());
                Err(err.into())
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, UploadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel(&self) {
        let mut state = self.state();
        if state.phase.is_in_flight() {
            warn!("analysis dropped while in flight");
            self.fail(&mut state, CANCELLED.to_string());
        }
    }

    fn transition(&self, state: &mut UploadState, phase: UploadPhase) {
        debug!(from = ?state.phase, to = ?phase, "analysis phase");
        state.phase = phase.clone();
        let _ = self.events.send(ClientEvent::AnalysisPhaseChanged(phase));
    }

    /// The published result is left as it was.
    fn fail(&self, state: &mut UploadState, message: String) {
        self.transition(state, UploadPhase::Error(message.clone()));
        let _ = self.events.send(ClientEvent::AnalysisFailed(message));
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
