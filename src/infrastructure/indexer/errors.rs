use thiserror::Error;

/// Why an indexer query produced no rows
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Indexer returned HTTP {0}")]
    Http(u16),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Response has no `{0}` field")]
    MissingField(String),

    #[error("Failed to decode indexer response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for IndexerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
