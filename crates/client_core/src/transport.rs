//! HTTP transport adapter shared by the analysis, what-if and export channels.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::protocol::Endpoint;
use tracing::{info, warn};
use url::Url;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: &'static str,
        value: String,
    },
    File {
        name: &'static str,
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => *name,
        }
    }
}

/// Transport-neutral multipart body. Converted to a `reqwest` form only at
/// the HTTP edge so orchestration code and test doubles never touch it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    parts: Vec<FormPart>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name,
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: &'static str,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|part| part.name() == name)
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if *n == name => Some(value.as_str()),
            _ => None,
        })
    }

    fn into_multipart(self) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    mime_type,
                    bytes,
                } => form.part(
                    name,
                    Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime_type)?,
                ),
            };
        }
        Ok(form)
    }
}

/// Undecoded body of a successful response. Decoding belongs to whichever
/// channel asked, so a malformed body surfaces as that channel's error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    body: String,
}

impl RawPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, endpoint: Endpoint, form: FormPayload)
        -> Result<RawPayload, TransportError>;
    async fn fetch_binary(&self, endpoint: Endpoint) -> Result<Vec<u8>, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    /// `base_url` is like `http://127.0.0.1:8001`; a trailing slash is dropped.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Url::parse(base_url)?;
        Ok(Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "service rejected request");
    Err(TransportError::Server {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(
        &self,
        endpoint: Endpoint,
        form: FormPayload,
    ) -> Result<RawPayload, TransportError> {
        let url = self.url(endpoint);
        info!(url = %url, parts = form.parts().len(), "posting multipart form");
        let response = self
            .http
            .post(&url)
            .multipart(form.into_multipart()?)
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;
        info!(url = %url, bytes = body.len(), "received response");
        Ok(RawPayload::new(body))
    }

    async fn fetch_binary(&self, endpoint: Endpoint) -> Result<Vec<u8>, TransportError> {
        let url = self.url(endpoint);
        info!(url = %url, "downloading artifact");
        let response = self.http.get(&url).send().await?;
        let bytes = ensure_success(response).await?.bytes().await?;
        info!(url = %url, bytes = bytes.len(), "downloaded artifact");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
