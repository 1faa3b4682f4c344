use serde::{Deserialize, Serialize};

/// Service endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Analyze,
    WhatIf,
    ExportPdf,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Analyze => "/analyze",
            Self::WhatIf => "/whatif",
            Self::ExportPdf => "/export/pdf",
        }
    }
}

/// Multipart field names understood by the analysis service.
pub mod fields {
    pub const PRIMARY_FILE: &str = "file1";
    pub const SECONDARY_FILE: &str = "file2";
    pub const LANGUAGE: &str = "language";
    pub const SUMMARY_MODE: &str = "summaryMode";
    pub const QUERY: &str = "query";
}

pub const DEFAULT_LANGUAGE: &str = "English";

/// Body of a successful `/whatif` call. The service reports "no document
/// analyzed yet" with a 200 and an `error` key rather than a status code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhatIfReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatif_reply_accepts_either_key() {
        let ok: WhatIfReply = serde_json::from_str(r#"{"response":"yes"}"#).unwrap();
        assert_eq!(ok.response.as_deref(), Some("yes"));
        assert!(ok.error.is_none());

        let err: WhatIfReply = serde_json::from_str(r#"{"error":"no document"}"#).unwrap();
        assert!(err.response.is_none());
        assert_eq!(err.error.as_deref(), Some("no document"));
    }

    #[test]
    fn endpoint_paths_are_rooted() {
        for endpoint in [Endpoint::Analyze, Endpoint::WhatIf, Endpoint::ExportPdf] {
            assert!(endpoint.path().starts_with('/'));
        }
    }
}
