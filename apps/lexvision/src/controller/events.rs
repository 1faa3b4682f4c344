//! Events delivered to the terminal renderer and error modeling for them.

use std::path::PathBuf;

use client_core::{
    AnalysisError, ClientEvent, ExportError, UploadPhase, UploadSnapshot, ValidationError,
    ViewModel, WhatIfExchange,
};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    Phase(UploadPhase),
    Published(ViewModel),
    Answer(WhatIfExchange),
    Saved(PathBuf),
    Snapshot(UploadSnapshot),
    Error(UiError),
}

impl UiEvent {
    /// Maps a client notification onto the renderer's vocabulary. Only the
    /// phases a user cares about are surfaced.
    pub fn from_client_event(event: ClientEvent) -> Option<Self> {
        match event {
            ClientEvent::AnalysisPhaseChanged(phase @ UploadPhase::Submitting) => {
                Some(Self::Phase(phase))
            }
            ClientEvent::AnalysisPhaseChanged(_) => None,
            ClientEvent::AnalysisPublished(view) => Some(Self::Published(view)),
            ClientEvent::AnalysisFailed(message) => Some(Self::Error(UiError::from_message(
                UiErrorContext::Analysis,
                message,
            ))),
            ClientEvent::WhatIfAnswered(exchange) => Some(Self::Answer(exchange)),
            ClientEvent::ExportSaved(path) => Some(Self::Saved(path)),
            ClientEvent::ExportFailed(message) => Some(Self::Error(UiError::from_message(
                UiErrorContext::Export,
                message,
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Export,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Analysis,
    WhatIf,
    Export,
    Session,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::WhatIf => "what-if",
            Self::Export => "export",
            Self::Session => "session",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Classifies by wording; used when only the rendered message survived
    /// the trip across the event bus.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("missing")
            || lower.contains("empty")
            || lower.contains("select file")
        {
            UiErrorCategory::Validation
        } else if lower.contains("http request failed")
            || lower.contains("server returned")
            || lower.contains("connection")
            || lower.contains("timed out")
            || lower.contains("did not answer")
        {
            UiErrorCategory::Transport
        } else if lower.contains("save") || lower.contains("export") {
            UiErrorCategory::Export
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_analysis_error(err: &AnalysisError) -> Self {
        let category = match err {
            AnalysisError::Validation(_) => UiErrorCategory::Validation,
            AnalysisError::Transport(_) => UiErrorCategory::Transport,
            AnalysisError::Normalization(_) => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context: UiErrorContext::Analysis,
            message: err.to_string(),
        }
    }

    pub fn from_validation_error(context: UiErrorContext, err: &ValidationError) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_export_error(err: &ExportError) -> Self {
        let category = match err {
            ExportError::Fetch(_) => UiErrorCategory::Transport,
            ExportError::EmptyArtifact | ExportError::Save { .. } => UiErrorCategory::Export,
        };
        Self {
            category,
            context: UiErrorContext::Export,
            message: err.to_string(),
        }
    }

    /// Transport failures are worth another try once the service is back.
    pub fn is_retryable(&self) -> bool {
        self.category == UiErrorCategory::Transport
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
