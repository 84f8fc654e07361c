use thiserror::Error;

/// Errors surfaced by the GraphQL transport and the price batcher.
///
/// Cloneable: a single failed request is handed to every caller whose
/// request was merged into it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    /// Backend answered with a non-2xx status
    #[error("GraphQL endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Backend answered 200 but the payload carried an `errors` array
    #[error("GraphQL errors: {0}")]
    Graphql(String),

    /// Connection, TLS or request building failure
    #[error("GraphQL transport failed: {0}")]
    Transport(String),

    /// Body could not be decoded into the expected shape
    #[error("malformed GraphQL response: {0}")]
    Decode(String),

    /// The batch holding this request was dropped before it was flushed
    #[error("price request dropped before its batch was dispatched")]
    Dropped,
}

impl From<reqwest::Error> for PriceError {
    fn from(e: reqwest::Error) -> Self {
        PriceError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for PriceError {
    fn from(e: serde_json::Error) -> Self {
        PriceError::Decode(e.to_string())
    }
}
