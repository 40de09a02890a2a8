use thiserror::Error;

/// Errors surfaced by the capture engine and its collaborators.
///
/// Configuration and state errors are returned synchronously from the
/// control surface. Network errors are retried by the ingestion thread and
/// only reach callers through the status channel. Storage errors are scoped
/// to a single clip save.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid state: {0}")]
    State(String),
}
