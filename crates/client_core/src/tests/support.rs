//! Transport and sink doubles shared by the channel tests.

use std::{
    collections::{HashMap, VecDeque},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::protocol::Endpoint;
use tokio::sync::Notify;

use crate::{
    document::Document,
    error::{ExportError, TransportError},
    export::FileSink,
    transport::{FormPayload, RawPayload, Transport},
};

/// Holds every transport call until the test releases it.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    submits: Mutex<HashMap<Endpoint, VecDeque<Result<RawPayload, TransportError>>>>,
    downloads: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    calls: Mutex<Vec<(Endpoint, FormPayload)>>,
    gate: Option<Gate>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated() -> (Arc<Self>, Gate) {
        let gate = Gate::default();
        let transport = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (Arc::new(transport), gate)
    }

    pub fn push_body(&self, endpoint: Endpoint, body: &str) {
        self.push_submit(endpoint, Ok(RawPayload::new(body)));
    }

    pub fn push_status(&self, endpoint: Endpoint, status: u16, body: &str) {
        self.push_submit(
            endpoint,
            Err(TransportError::Server {
                status,
                body: body.to_string(),
            }),
        );
    }

    fn push_submit(&self, endpoint: Endpoint, response: Result<RawPayload, TransportError>) {
        self.submits
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(response);
    }

    pub fn push_download(&self, bytes: &[u8]) {
        self.downloads.lock().unwrap().push_back(Ok(bytes.to_vec()));
    }

    pub fn push_download_status(&self, status: u16, body: &str) {
        self.downloads
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Server {
                status,
                body: body.to_string(),
            }));
    }

    pub fn calls(&self) -> Vec<(Endpoint, FormPayload)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn hold(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

fn unscripted() -> TransportError {
    TransportError::Server {
        status: 599,
        body: "no scripted response".to_string(),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(
        &self,
        endpoint: Endpoint,
        form: FormPayload,
    ) -> Result<RawPayload, TransportError> {
        self.calls.lock().unwrap().push((endpoint, form));
        self.hold().await;
        let next = self
            .submits
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| Err(unscripted()))
    }

    async fn fetch_binary(&self, endpoint: Endpoint) -> Result<Vec<u8>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint, FormPayload::new()));
        self.hold().await;
        let next = self.downloads.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub saved: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

#[async_trait]
impl FileSink for MemorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let path = PathBuf::from("memory").join(file_name);
        if self.fail {
            return Err(ExportError::Save {
                path,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(path)
    }
}

pub fn pdf(name: &str) -> Document {
    Document::new(name, format!("%PDF-1.7 {name}").into_bytes())
}
