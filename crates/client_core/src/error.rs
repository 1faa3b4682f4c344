//! Error taxonomy for the three client channels.

use std::path::PathBuf;

use thiserror::Error;

/// Local, pre-network rejection of a user action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing primary document: select file 1 before analyzing")]
    MissingPrimaryDocument,
    #[error("missing secondary document: compare mode needs file 2")]
    MissingSecondaryDocument,
    #[error("what-if question is empty")]
    EmptyQuery,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
}

impl TransportError {
    /// HTTP status of the failed exchange, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Server { status, .. } => Some(*status),
        }
    }
}

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("analysis payload is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("analysis payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Everything an analysis submit can fail with.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export fetch failed: {0}")]
    Fetch(#[from] TransportError),
    #[error("export returned an empty artifact")]
    EmptyArtifact,
    #[error("failed to save export as {path}: {source}")]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}
