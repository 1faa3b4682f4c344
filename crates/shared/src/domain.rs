use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseDomainError;

/// The two analysis workflows offered by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    Summarize,
    Compare,
}

impl AnalysisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Compare => "compare",
        }
    }

    /// Number of documents a request in this mode must carry.
    pub fn required_documents(self) -> usize {
        match self {
            Self::Summarize => 1,
            Self::Compare => 2,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summarize" | "summary" => Ok(Self::Summarize),
            "compare" | "comparison" => Ok(Self::Compare),
            other => Err(ParseDomainError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    #[default]
    Concise,
    Detailed,
}

impl DetailLevel {
    /// Tag sent in the `summaryMode` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" | "short" => Ok(Self::Concise),
            "detailed" | "long" => Ok(Self::Detailed),
            other => Err(ParseDomainError::UnknownDetailLevel(other.to_string())),
        }
    }
}
