// Error taxonomy for the scoring core.
//
// Only setup-level problems are fatal (BancaError). Per-record and per-section
// problems are values that travel next to the ranking so the batch always
// completes: InputError rejects a record before scoring, DegradedSection marks
// one section absent.

use serde::Serialize;
use thiserror::Error;

use crate::profile::Section;

/// Fatal errors that stop a whole scoring run.
#[derive(Debug, Error)]
pub enum BancaError {
    /// An embedder was used before its required setup (fit or load).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The encoder could not embed text that the run cannot do without
    /// (the query itself).
    #[error("embedding failed: {0}")]
    Embedding(String),
}

impl BancaError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        BancaError::Configuration(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        BancaError::Embedding(msg.into())
    }
}

/// Why a profile record was rejected before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum InputError {
    #[error("profile has no identifier")]
    MissingId,
    #[error("profile {id} has no name")]
    MissingName { id: String },
    #[error("duplicate profile identifier {id}")]
    DuplicateId { id: String },
}

/// A record that never reached scoring, kept so callers can report it.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedProfile {
    /// Position of the record in the caller's input
    pub index: usize,
    /// Name as given, possibly empty
    pub name: String,
    pub error: InputError,
}

/// A section that could not be embedded and was treated as absent.
#[derive(Debug, Clone, Serialize)]
pub struct DegradedSection {
    pub profile_id: String,
    pub section: Section,
    pub reason: String,
}

pub type Result<T> = std::result::Result<T, BancaError>;
