use thiserror::Error;

/// Failures reported by a realtime store backend.
///
/// Messages are carried through verbatim so the operator sees exactly what
/// the backend said (permission problems, malformed paths, ...).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Identifier generation failed: {0}")]
    IdGeneration(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Subscription closed for {0}")]
    SubscriptionClosed(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
