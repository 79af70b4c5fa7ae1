use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No element matched a signature or the loose class pattern.
    #[error("no content container found")]
    ContainerNotFound,

    /// Traversal blew up on malformed markup.
    #[error("parse anomaly: {0}")]
    ParseAnomaly(String),

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
