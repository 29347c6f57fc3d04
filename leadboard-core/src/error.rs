//! Error types for leadboard-core

use thiserror::Error;

/// Main error type for the leadboard-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Local SQLite lead store error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failure talking to the hosted lead table
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The lead source rejected a query or mutation
    #[error("data source error: {0}")]
    DataSource(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A date typed by the user could not be parsed
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Background dashboard worker is gone
    #[error("dashboard worker stopped")]
    WorkerStopped,
}

impl Error {
    /// True for failures that originate at the lead source boundary.
    ///
    /// These are the errors the dashboard reports to the user as a
    /// notification while keeping previously displayed values.
    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Http(_) | Error::Json(_) | Error::DataSource(_)
        )
    }
}

/// Result type alias for leadboard-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_classification() {
        assert!(Error::DataSource("rejected".to_string()).is_data_source());
        assert!(Error::Database(rusqlite::Error::InvalidQuery).is_data_source());
        assert!(!Error::Config("bad".to_string()).is_data_source());
        assert!(!Error::InvalidDate("32/13".to_string()).is_data_source());
    }

    #[test]
    fn test_local_failures_are_not_data_source() {
        // Runtime and thread startup failures surface as io errors
        let err: Error = std::io::Error::other("no threads").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_data_source());
        assert!(!Error::WorkerStopped.is_data_source());
    }
}
