use crate::dom::NodeId;
use thiserror::Error;

/// Failures raised by a [`Document`](crate::dom::Document) implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("Node {0} has no parent")]
    Detached(NodeId),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("Stylesheet access denied: {0}")]
    SecurityError(String),

    #[error("Host error: {0}")]
    Host(String),
}

impl DomError {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to parse page snapshot: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to build document: {0}")]
    Dom(#[from] DomError),
}
