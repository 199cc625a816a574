//! Wire and domain types for the character API.
//!
//! # Design
//! The mock-server crate defines its own copy of the character schema.
//! Integration tests catch drift between the two.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One character as returned by `GET /character`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    pub id: u32,
    pub name: String,
    /// Free text such as `Alive`, `Dead` or `unknown`. New values may appear.
    pub status: String,
    pub species: String,
    #[serde(rename = "image")]
    pub image_ref: String,
}

impl Character {
    /// Whether the character is shown with the "alive" highlight.
    pub fn is_alive(&self) -> bool {
        self.status == "Alive"
    }
}

/// The page envelope. Only `results` is consumed; pagination info is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterPage {
    pub results: Vec<Character>,
}

impl CharacterPage {
    /// Reject pages serde accepts but the store cannot hold: zero or
    /// duplicate ids, or empty names.
    pub fn validate(self) -> Result<Vec<Character>, FetchError> {
        let mut seen = HashSet::with_capacity(self.results.len());
        for character in &self.results {
            if character.id == 0 {
                return Err(FetchError::Decode("character id must be positive".to_string()));
            }
            if character.name.is_empty() {
                return Err(FetchError::Decode(format!(
                    "character {} has an empty name",
                    character.id
                )));
            }
            if !seen.insert(character.id) {
                return Err(FetchError::Decode(format!(
                    "duplicate character id {}",
                    character.id
                )));
            }
        }
        Ok(self.results)
    }
}
