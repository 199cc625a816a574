//! Lifecycle snapshot of the most recent fetch.

use std::fmt;

use crate::error::{ErrorKind, FetchError};
use crate::types::Character;

/// Why the last fetch failed, kept for both display and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<FetchError> for FetchFailure {
    fn from(e: FetchError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    /// Characters in the order the server returned them.
    Succeeded(Vec<Character>),
    /// A failed fetch retains nothing from earlier successes.
    Failed(FetchFailure),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Records to list. Empty in every state but `Succeeded`.
    pub fn records(&self) -> &[Character] {
        match self {
            FetchState::Succeeded(records) => records,
            _ => &[],
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn find(&self, id: u32) -> Option<&Character> {
        self.records().iter().find(|c| c.id == id)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Succeeded(_) => "succeeded",
            FetchState::Failed(_) => "failed",
        }
    }
}

impl From<Result<Vec<Character>, FetchError>> for FetchState {
    fn from(result: Result<Vec<Character>, FetchError>) -> Self {
        match result {
            Ok(records) => FetchState::Succeeded(records),
            Err(e) => FetchState::Failed(e.into()),
        }
    }
}
