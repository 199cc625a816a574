//! Endpoint configuration.

/// Public character API.
pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api/";

/// Resource path listing characters, relative to the base URL.
pub const CHARACTER_RESOURCE: &str = "character";

/// Where the character list is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub resource: String,
}

impl ApiConfig {
    /// Same resource path, different host. Used to point the core at a mock
    /// server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL of the list endpoint. Exactly one `/` separates the parts.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.resource.trim_start_matches('/')
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource: CHARACTER_RESOURCE.to_string(),
        }
    }
}
