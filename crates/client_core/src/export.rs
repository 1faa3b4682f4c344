//! Export channel. The service exports whatever analysis it produced last;
//! no result identifier is sent, so two interleaved analyses (another tab,
//! another client) can make the downloaded artifact belong to the other one.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use shared::protocol::Endpoint;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{error::ExportError, guard::ResetOnDrop, transport::Transport, ClientEvent};

/// Host file-save mechanism.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Stores `bytes` under `file_name` and returns where they landed.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Busy,
}

pub struct ExportTrigger<T: Transport> {
    transport: Arc<T>,
    sink: Arc<dyn FileSink>,
    file_name: String,
    busy: AtomicBool,
    events: broadcast::Sender<ClientEvent>,
}

impl<T: Transport> ExportTrigger<T> {
    pub fn new(
        transport: Arc<T>,
        sink: Arc<dyn FileSink>,
        file_name: impl Into<String>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        Self {
            transport,
            sink,
            file_name: file_name.into(),
            busy: AtomicBool::new(false),
            events,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub async fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn export_current_result(&self) -> Result<ExportOutcome, ExportError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            debug!("export already in flight; ignoring trigger");
            return Ok(ExportOutcome::Busy);
        }

        let in_flight = ResetOnDrop::new(|| self.busy.store(false, Ordering::SeqCst));
        info!(file = self.file_name(), "downloading export");
        let result = self.fetch_and_save().await;
        drop(in_flight);

        match result {
            Ok(path) => {
                info!(path = %path.display(), "export saved");
                let _ = self.events.send(ClientEvent::ExportSaved(path.clone()));
                Ok(ExportOutcome::Saved(path))
            }
            Err(err) => {
                let status = match &err {
                    ExportError::Fetch(transport) => transport.status(),
                    _ => None,
                };
                warn!(?status, "export failed: {err}");
                let _ = self.events.send(ClientEvent::ExportFailed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn fetch_and_save(&self) -> Result<PathBuf, ExportError> {
        let bytes = self.transport.fetch_binary(Endpoint::ExportPdf).await?;
        if bytes.is_empty() {
            return Err(ExportError::EmptyArtifact);
        }
        self.sink.save(&self.file_name, &bytes).await
    }
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
