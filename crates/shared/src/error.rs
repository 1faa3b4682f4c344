use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDomainError {
    #[error("unknown analysis mode '{0}' (expected summarize or compare)")]
    UnknownMode(String),
    #[error("unknown detail level '{0}' (expected concise or detailed)")]
    UnknownDetailLevel(String),
}
