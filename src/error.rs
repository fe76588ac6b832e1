//! Crate-wide error type
//!
//! Configuration problems are caught before any stepping happens; numerical
//! degeneracies abort the run immediately (integration is deterministic, so
//! there is never anything to retry)

use thiserror::Error;

/// Crate-wide result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid scenario or run parameter (unknown kernel/scheme names are
    /// rejected earlier, at deserialization)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A separation the active softening kernel does not regularize
    /// (e.g. an exactly coincident pair of bodies)
    #[error("numerical degeneracy: {0}")]
    Degenerate(String),

    /// Propagated I/O errors from persistence sinks
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
