// Errors raised while editing or (de)serializing event trees

/// Errors that can occur while editing or loading events
#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Malformed event element: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for event tree operations
pub type EventsResult<T> = Result<T, EventsError>;
