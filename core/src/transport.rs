//! The I/O seam between `CharacterClient` and the network.
//!
//! # Design
//! A `Transport` turns one `HttpRequest` into one `HttpResponse`. It reports
//! every status code as data and only fails when no response was obtained.
//! `UreqTransport` drives a blocking `ureq` agent on tokio's blocking pool,
//! so the awaiting task yields instead of stalling the executor thread.
//! Response headers are not carried over; nothing downstream reads them.

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Production transport backed by `ureq` with the library's default timeouts.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    fn execute_blocking(agent: &ureq::Agent, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = match request.method {
            HttpMethod::Get => agent.get(&request.url),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let mut response = builder
            .call()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::Transport(format!("reading body: {e}")))?;

        Ok(HttpResponse::new(status, body))
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || Self::execute_blocking(&agent, &request))
            .await
            .map_err(|e| FetchError::Transport(format!("request task failed: {e}")))?
    }
}
