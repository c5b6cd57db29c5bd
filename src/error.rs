//! Error types for the hotel data-access layer.

use thiserror::Error;

/// Result type alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the store client boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport, timeout or credential failure talking to the store.
    #[error("Connectivity failure: {0}")]
    Connectivity(String),

    /// A conditional write found the stored item in a different state.
    #[error("Conditional check failed")]
    ConditionFailed,

    /// The store answered but refused the request.
    #[error("{operation} failed: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

/// Errors surfaced by the provisioner and the repository.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Version conflict on hotel '{id}': expected version {expected_version}")]
    Conflict { id: String, expected_version: u64 },

    #[error("Failed to decode item: {0}")]
    Decode(String),

    #[error("Failed to encode item: {0}")]
    Encode(String),

    #[error("Invalid table spec: {0}")]
    InvalidSpec(String),

    #[error("Failed to provision table '{table}': {source}")]
    Provision {
        table: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns true when the failure came from reaching the store at all.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Error::Store(StoreError::Connectivity(_)) => true,
            Error::Provision { source, .. } => source.is_connectivity(),
            _ => false,
        }
    }

    pub(crate) fn provision(table: impl Into<String>, source: impl Into<Error>) -> Self {
        Error::Provision {
            table: table.into(),
            source: Box::new(source.into()),
        }
    }
}
