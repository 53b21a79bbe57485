use thiserror::Error;

use crate::registry::{Reference, ValueKind};

/// Errors that can occur while loading, navigating or dereferencing documents.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to load document '{path}': {message}")]
    Load { path: String, message: String },

    #[error("unsupported document extension for '{path}' (expected .json, .yaml or .yml)")]
    UnsupportedExtension { path: String },

    #[error("navigation error at {reference}: {message}")]
    Navigation { reference: Reference, message: String },

    #[error("expected {expected} at {reference}, found {actual}")]
    TypeMismatch {
        reference: Reference,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("no value at {reference}")]
    NotFound { reference: Reference },

    #[error("circular reference chain detected at {reference}")]
    CircularReference { reference: Reference },

    #[error("reference chain through {reference} exceeds the resolution depth limit of {limit}")]
    DepthExceeded { reference: Reference, limit: usize },
}

/// Convenience alias for results using `ResolveError`.
pub type Result<T> = std::result::Result<T, ResolveError>;
