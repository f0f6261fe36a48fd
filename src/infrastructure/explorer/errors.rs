use thiserror::Error;

/// Errors from the block explorer client
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Explorer request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Explorer returned HTTP {0}")]
    Http(u16),

    #[error("Explorer error: {message} ({detail})")]
    Api { message: String, detail: String },

    #[error("Explorer endpoint is deprecated and no alternate route is configured")]
    Deprecated,

    #[error("Failed to decode explorer response: {0}")]
    Decode(String),
}
