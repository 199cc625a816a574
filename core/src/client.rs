//! Stateless request builder and response parser for the character list.
//!
//! # Design
//! `CharacterClient` holds only the endpoint URL. `build_list_characters`
//! produces an `HttpRequest`; `parse_list_characters` consumes the matching
//! `HttpResponse`. Whoever sits in between performs the I/O, so everything in
//! this file is deterministic.

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Character, CharacterPage};

#[derive(Debug, Clone)]
pub struct CharacterClient {
    endpoint: String,
}

impl CharacterClient {
    /// Client for `{base_url}/character`.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ApiConfig::with_base_url(base_url))
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            endpoint: config.endpoint(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_list_characters(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint.clone(),
            headers: Vec::new(),
        }
    }

    /// Decode a list response. Anything but a 200 with a well-formed page is
    /// an error; there are no partial results.
    pub fn parse_list_characters(&self, response: HttpResponse) -> Result<Vec<Character>, FetchError> {
        if response.status != 200 {
            return Err(FetchError::Status {
                status: response.status,
                body: response.body,
            });
        }
        let page: CharacterPage = serde_json::from_str(&response.body)?;
        page.validate()
    }
}

impl Default for CharacterClient {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}
