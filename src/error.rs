//! Error types for the cache and the entity services
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the object cache.
///
/// A miss is not an error; it is reported as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The stored value is not of the type the caller asked for
    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

// == Store Error Enum ==
/// Errors raised by a backing store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A unique column already holds this value
    #[error("Conflict: {0}")]
    Conflict(String),
}

// == Service Error Enum ==
/// Unified error type for the entity services.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Requested entity does not exist in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed validation
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Cache contract violation
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

// == Result Type Alias ==
/// Convenience Result type for the entity services.
pub type Result<T> = std::result::Result<T, ServiceError>;
