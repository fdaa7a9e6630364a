// src/error.rs

use crate::entry::EntryId;
use thiserror::Error;

/// Invalid user-supplied data. The operation that raised it changed nothing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("entry name must not be empty")]
    EmptyName,

    #[error("weight must be a positive number (got {0})")]
    NonPositiveWeight(f64),

    #[error("an entry named '{0}' already exists")]
    DuplicateName(String),

    #[error("no entry with id {0}")]
    UnknownEntry(EntryId),

    #[error("total weight would exceed the largest representable number")]
    TotalWeightOverflow,
}

/// An operation attempted in a state that forbids it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidStateError {
    #[error("add entries first")]
    EmptyPool,

    #[error("a draw is already in progress")]
    AlreadyDrawing,
}

/// Serialization or storage-backend failure.
///
/// Never propagated past the mutating call that triggered a flush; the
/// in-memory collections stay authoritative.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid record in '{key}': {reason}")]
    Schema { key: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors surfaced by state-changing lottery operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LotteryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    #[error("draw cancelled before it resolved")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, LotteryError>;
