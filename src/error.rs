use thiserror::Error;

/// Result type alias for store and adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the store, the persistence adapters and the HTTP API.
///
/// None of these are fatal to the process; they all map to a 4xx/5xx response
/// at the API boundary and are recoverable by user retry.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing or invalid
    #[error("validation failed: {0}")]
    Validation(String),

    /// Update or delete of an id that is not in the collection
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Registration with an e-mail that is already taken
    #[error("user already exists: {0}")]
    Duplicate(String),

    /// Missing or unresolvable x-user-id header, or bad credentials
    #[error("not authenticated")]
    Unauthorized,

    /// The persistence adapter failed to load or save a collection
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Unexpected failure inside the process, e.g. password hashing
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
