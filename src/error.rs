//! Error handling types for section-toc
//!
//! This module provides error types used throughout the crate.

use std::sync::PoisonError;
use thiserror::Error;

/// Comprehensive error type for TOC operations
#[derive(Debug, Error)]
pub enum TocError {
    /// Block not found in the document tree
    #[error("Block not found: {id}")]
    BlockNotFound { id: String },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Document tree could not be parsed
    #[error("Document parse error: {0}")]
    Document(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for TOC operations
pub type TocResult<T> = Result<T, TocError>;

/// Helper trait to recover a lock guard from a poisoned mutex.
pub(crate) trait LockResultExt<G> {
    /// Recover from a PoisonError with logging.
    ///
    /// The context parameter identifies which operation triggered lock recovery,
    /// helping developers debug thread safety issues.
    fn recover_poison(self, context: &str) -> G;
}

impl<G> LockResultExt<G> for Result<G, PoisonError<G>> {
    fn recover_poison(self, context: &str) -> G {
        match self {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!(
                    target: "section_toc::lock_recovery",
                    "Recovered from poisoned lock in {}",
                    context
                );
                poisoned.into_inner()
            }
        }
    }
}

/// Helper functions for common error patterns
impl TocError {
    /// Create a block not found error
    pub fn block_not_found(id: impl Into<String>) -> Self {
        TocError::BlockNotFound { id: id.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        TocError::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        TocError::Internal(message.into())
    }
}
