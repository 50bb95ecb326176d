// Error taxonomy for store adapters.
//
// Absence of a single entity is reported as Ok(None), never as an error;
// everything the underlying driver raises is surfaced unchanged in the
// variant's message. Adapters perform no local recovery or retry.

/// Internal error type shared by every adapter backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connect/disconnect failures, and data operations attempted while the
    /// adapter holds no live connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed filter, invalid query shape, or an unusable id value.
    #[error("query error: {0}")]
    Query(String),

    /// Binding/configuration problems, detected synchronously at init time.
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other failure from the underlying store driver.
    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Unified result type for adapter operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
