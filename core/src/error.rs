//! Error types for fetching characters and driving the store.
//!
//! # Design
//! `FetchError` keeps three causes apart for diagnostics: no response at all,
//! a response with the wrong status, and a body that does not decode. UI code
//! only cares about the coarser `ErrorKind`, where a bad status counts as a
//! transport problem.

use std::fmt;

use thiserror::Error;
use tokio::task::JoinError;

/// Errors produced while fetching the character list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was obtained: DNS, connection, timeout, or a body that
    /// could not be read.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with something other than 200.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not a valid character page.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) | FetchError::Status { .. } => ErrorKind::Transport,
            FetchError::Decode(_) => ErrorKind::Decode,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Coarse classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => f.write_str("transport"),
            ErrorKind::Decode => f.write_str("decode"),
        }
    }
}

/// Errors returned by `RecordStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `load()` was called while a fetch was still in flight.
    #[error("a load is already in progress")]
    AlreadyLoading,

    /// The spawned fetch task panicked or was cancelled by the runtime.
    #[error("fetch task did not complete: {0}")]
    Join(#[from] JoinError),
}
