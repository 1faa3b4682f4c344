use shared::{
    domain::{AnalysisMode, DetailLevel},
    protocol::fields,
};

use crate::{document::Document, error::ValidationError, transport::FormPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub language: String,
    pub detail: DetailLevel,
}

/// A well-formed `/analyze` request. Only [`UploadRequest::validate`] builds
/// one, so a request missing a document required by its mode cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRequest {
    Summarize {
        primary: Document,
        options: RequestOptions,
    },
    Compare {
        primary: Document,
        secondary: Document,
        options: RequestOptions,
    },
}

impl UploadRequest {
    pub fn validate(
        mode: AnalysisMode,
        primary: Option<&Document>,
        secondary: Option<&Document>,
        options: RequestOptions,
    ) -> Result<Self, ValidationError> {
        let primary = primary
            .cloned()
            .ok_or(ValidationError::MissingPrimaryDocument)?;
        match mode {
            AnalysisMode::Summarize => Ok(Self::Summarize { primary, options }),
            AnalysisMode::Compare => {
                let secondary = secondary
                    .cloned()
                    .ok_or(ValidationError::MissingSecondaryDocument)?;
                Ok(Self::Compare {
                    primary,
                    secondary,
                    options,
                })
            }
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        match self {
            Self::Summarize { .. } => AnalysisMode::Summarize,
            Self::Compare { .. } => AnalysisMode::Compare,
        }
    }

    pub fn total_bytes(&self) -> usize {
        match self {
            Self::Summarize { primary, .. } => primary.len(),
            Self::Compare {
                primary, secondary, ..
            } => primary.len() + secondary.len(),
        }
    }

    pub fn into_form(self) -> FormPayload {
        let (primary, secondary, options) = match self {
            Self::Summarize { primary, options } => (primary, None, options),
            Self::Compare {
                primary,
                secondary,
                options,
            } => (primary, Some(secondary), options),
        };

        let mut form = FormPayload::new().file(
            fields::PRIMARY_FILE,
            primary.file_name,
            primary.mime_type,
            primary.bytes,
        );
        if let Some(secondary) = secondary {
            form = form.file(
                fields::SECONDARY_FILE,
                secondary.file_name,
                secondary.mime_type,
                secondary.bytes,
            );
        }
        form.text(fields::LANGUAGE, options.language)
            .text(fields::SUMMARY_MODE, options.detail.as_str())
    }
}
