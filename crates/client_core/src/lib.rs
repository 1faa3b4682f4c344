use std::{path::PathBuf, sync::Arc};

use tokio::sync::broadcast;

pub mod document;
pub mod error;
pub mod export;
mod guard;
pub mod normalize;
pub mod orchestrator;
pub mod request;
pub mod transport;
pub mod view_model;
pub mod whatif;

pub use document::Document;
pub use error::{AnalysisError, ExportError, NormalizationError, TransportError, ValidationError};
pub use export::{ExportOutcome, ExportTrigger, FileSink};
pub use normalize::{normalize, normalize_value};
pub use orchestrator::{SubmitOutcome, UploadOrchestrator, UploadPhase, UploadSnapshot};
pub use request::{RequestOptions, UploadRequest};
pub use transport::{FormPart, FormPayload, HttpTransport, RawPayload, Transport};
pub use view_model::{ChartPoint, ComparisonRow, TimelineEntry, ViewModel};
pub use whatif::{AskOutcome, WhatIfChannel, WhatIfExchange, WhatIfResponse};

const EVENT_CAPACITY: usize = 64;

/// Notifications from the three channels to the presentation layer.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    AnalysisPhaseChanged(UploadPhase),
    AnalysisPublished(ViewModel),
    AnalysisFailed(String),
    WhatIfAnswered(WhatIfExchange),
    ExportSaved(PathBuf),
    ExportFailed(String),
}

/// The three independent channels over one shared transport. Each channel
/// owns its own state and busy flag; none of them locks another.
pub struct AnalysisClient<T: Transport> {
    pub upload: UploadOrchestrator<T>,
    pub what_if: WhatIfChannel<T>,
    pub export: ExportTrigger<T>,
    events: broadcast::Sender<ClientEvent>,
}

impl<T: Transport> AnalysisClient<T> {
    pub fn new(
        transport: Arc<T>,
        sink: Arc<dyn FileSink>,
        export_file_name: impl Into<String>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            upload: UploadOrchestrator::new(Arc::clone(&transport), events.clone()),
            what_if: WhatIfChannel::new(Arc::clone(&transport), events.clone()),
            export: ExportTrigger::new(transport, sink, export_file_name, events.clone()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
