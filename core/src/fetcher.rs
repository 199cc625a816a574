//! One-shot fetch of the character list.

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::CharacterClient;
use crate::error::FetchError;
use crate::state::FetchState;
use crate::transport::{Transport, UreqTransport};
use crate::types::Character;

/// Pairs the request builder with an injected transport. Every call to
/// `fetch` issues exactly one request: no retries, no pagination.
#[derive(Clone)]
pub struct Fetcher {
    client: CharacterClient,
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn new(client: CharacterClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    /// Fetcher for the public API over `ureq`.
    pub fn public() -> Self {
        Self::new(CharacterClient::default(), Arc::new(UreqTransport::new()))
    }

    pub fn client(&self) -> &CharacterClient {
        &self.client
    }

    pub async fn try_fetch(&self) -> Result<Vec<Character>, FetchError> {
        let request = self.client.build_list_characters();
        let response = self.transport.execute(request).await?;
        self.client.parse_list_characters(response)
    }

    /// Never fails; errors are folded into `FetchState::Failed`.
    pub async fn fetch(&self) -> FetchState {
        let result = self.try_fetch().await;
        match &result {
            Ok(records) => {
                info!(count = records.len(), endpoint = self.client.endpoint(), "fetched characters");
            }
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, endpoint = self.client.endpoint(), "character fetch failed");
            }
        }
        result.into()
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("endpoint", &self.client.endpoint())
            .finish_non_exhaustive()
    }
}
