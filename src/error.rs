//! Bifrost error types

/// Bifrost error types
///
/// The bridge puts `error.to_string()` on the wire for failed requests,
/// so the `Display` strings of the protocol-level variants are the wire
/// error codes clients match on.
#[derive(Debug, thiserror::Error)]
pub enum BifrostError {
    // Prompt validation errors
    #[error("prompt must be a string")]
    InvalidPrompt,

    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("prompt too long: {length} exceeds limit {limit}")]
    PromptTooLong { length: usize, limit: usize },

    // Protocol errors
    #[error("invalid_json")]
    UnparsableMessage,

    #[error("invalid_message")]
    MalformedMessage,

    #[error("unknown_type")]
    UnknownOperation,

    // Backend/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Error reported inside an otherwise well-formed backend payload.
    #[error("backend error: {0}")]
    Backend(String),

    // Streaming errors
    #[error("stream error: {0}")]
    Stream(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for BifrostError {
    fn from(err: reqwest::Error) -> Self {
        BifrostError::Http(err.to_string())
    }
}

/// Result type alias for bifrost operations
pub type Result<T> = std::result::Result<T, BifrostError>;
