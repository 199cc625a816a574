//! Character list client core: fetch once, hold in memory, look up by id.
//!
//! # Overview
//! A `Fetcher` issues a single `GET {base}/character` request through an
//! injected `Transport` and folds the outcome into a `FetchState`. A
//! `RecordStore` owns the latest state, publishes every transition through a
//! `tokio::sync::watch` channel, and answers synchronous lookups for the
//! detail view.
//!
//! # Design
//! - `CharacterClient` only builds requests and parses responses; the
//!   transport does the I/O. Tests swap in scripted transports.
//! - Fetch errors never escape as faults: they become `FetchState::Failed`,
//!   which keeps the error kind for diagnostics.
//! - `RecordStore::load` refuses to start a second fetch while one is in
//!   flight, so a slow response can never overwrite a newer one.
//! - Wire types are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;

pub use client::CharacterClient;
pub use config::{ApiConfig, CHARACTER_RESOURCE, DEFAULT_BASE_URL};
pub use error::{ErrorKind, FetchError, StoreError};
pub use fetcher::Fetcher;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use state::{FetchFailure, FetchState};
pub use store::RecordStore;
pub use transport::{Transport, UreqTransport};
pub use types::{Character, CharacterPage};
