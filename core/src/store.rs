//! In-memory holder of the latest `FetchState`.
//!
//! # Design
//! The state lives in a `tokio::sync::watch` channel: the UI subscribes and
//! re-renders on every transition, while lookups read the current value
//! synchronously. The only writers are `load()`, which flips the state to
//! `Loading` before it returns, and the task it spawns, which writes the
//! settled result. That task holds a weak reference to the channel so a
//! result arriving after the store is gone is discarded. If the task ends
//! without a result (aborted handle, panicking transport) its guard settles
//! the state as `Failed`, so `Loading` never outlives the fetch.

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{ErrorKind, StoreError};
use crate::fetcher::Fetcher;
use crate::state::{FetchFailure, FetchState};
use crate::types::Character;

pub struct RecordStore {
    state: Arc<watch::Sender<FetchState>>,
    fetcher: Arc<Fetcher>,
}

impl RecordStore {
    /// A store in the `Idle` state. Nothing is fetched until `load()`.
    pub fn new(fetcher: Fetcher) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            state: Arc::new(state),
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    /// Receives every state transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Start a fetch. The state is `Loading` when this returns; the handle
    /// resolves to the settled state once the store has been updated.
    ///
    /// Rejected with `AlreadyLoading` while a previous fetch is in flight.
    /// Must be called from within a tokio runtime.
    pub fn load(&self) -> Result<JoinHandle<FetchState>, StoreError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = FetchState::Loading;
            true
        });
        if !started {
            debug!("load rejected, fetch already in flight");
            return Err(StoreError::AlreadyLoading);
        }
        debug!("store state -> loading");

        let fetcher = Arc::clone(&self.fetcher);
        // Built outside the task so an abort before the first poll still
        // drops it.
        let guard = SettleGuard::new(Arc::downgrade(&self.state));
        Ok(tokio::spawn(async move {
            let outcome = fetcher.fetch().await;
            guard.settle(outcome.clone());
            outcome
        }))
    }

    /// `load()` and wait for the fetch to settle.
    pub async fn refresh(&self) -> Result<FetchState, StoreError> {
        let settled = self.load()?.await?;
        Ok(settled)
    }

    /// Look up a character in the current `Succeeded` snapshot. Any other
    /// state has nothing to find.
    pub fn find_by_id(&self, id: u32) -> Option<Character> {
        self.state.borrow().find(id).cloned()
    }

    /// Lookup keyed by the id segment of a detail route, e.g. `"42"`.
    /// Anything that is not a canonical id is simply not found.
    pub fn find_by_route_id(&self, raw: &str) -> Option<Character> {
        parse_route_id(raw).and_then(|id| self.find_by_id(id))
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("state", &self.state.borrow().label())
            .field("fetcher", &self.fetcher)
            .finish()
    }
}

const FETCH_ABANDONED: &str = "fetch cancelled before completing";

/// Owned by the fetch task. Publishes the outcome through `settle`, or a
/// failure if it is dropped first.
struct SettleGuard {
    state: Weak<watch::Sender<FetchState>>,
    armed: bool,
}

impl SettleGuard {
    fn new(state: Weak<watch::Sender<FetchState>>) -> Self {
        Self { state, armed: true }
    }

    fn settle(mut self, outcome: FetchState) {
        self.armed = false;
        match self.state.upgrade() {
            Some(state) => {
                debug!(state = outcome.label(), "store state settled");
                state.send_replace(outcome);
            }
            None => debug!(state = outcome.label(), "store dropped before fetch settled, discarding result"),
        }
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let failed = state.send_if_modified(|current| {
            if !current.is_loading() {
                return false;
            }
            *current = FetchState::Failed(FetchFailure {
                kind: ErrorKind::Transport,
                message: FETCH_ABANDONED.to_string(),
            });
            true
        });
        if failed {
            warn!("fetch task ended without a result, store marked failed");
        }
    }
}

fn parse_route_id(raw: &str) -> Option<u32> {
    let id: u32 = raw.parse().ok()?;
    (id.to_string() == raw).then_some(id)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::client::CharacterClient;
    use crate::error::{ErrorKind, FetchError};
    use crate::http::{HttpRequest, HttpResponse};
    use crate::transport::Transport;

    const RICK: &str =
        r#"{"results":[{"id":1,"name":"Rick","status":"Alive","species":"Human","image":"u1"}]}"#;

    const FAMILY: &str = r#"{"results":[
        {"id":4,"name":"Beth Smith","status":"Alive","species":"Human","image":"u4"},
        {"id":2,"name":"Morty Smith","status":"Alive","species":"Human","image":"u2"},
        {"id":5,"name":"Jerry Smith","status":"unknown","species":"","image":"u5"}
    ]}"#;

    /// Replays queued responses in order. When gated, each request waits
    /// for one `Notify` permit first.
    struct Scripted {
        responses: Mutex<VecDeque<Result<HttpResponse, FetchError>>>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, FetchError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".to_string())))
        }
    }

    /// Never answers.
    struct Stalled;

    #[async_trait]
    impl Transport for Stalled {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, FetchError> {
            std::future::pending().await
        }
    }

    /// Panics on the first request, answers with `RICK` afterwards.
    struct PanicsOnce {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for PanicsOnce {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, FetchError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("transport bug");
            }
            ok(RICK)
        }
    }

    fn store_over(transport: Arc<dyn Transport>) -> RecordStore {
        RecordStore::new(Fetcher::new(CharacterClient::new("http://mock/api"), transport))
    }

    fn store_with(responses: Vec<Result<HttpResponse, FetchError>>, gate: Option<Arc<Notify>>) -> RecordStore {
        store_over(Arc::new(Scripted {
            responses: Mutex::new(responses.into()),
            gate,
        }))
    }

    fn ok(body: &str) -> Result<HttpResponse, FetchError> {
        Ok(HttpResponse::new(200, body))
    }

    #[test]
    fn new_store_is_idle_and_finds_nothing() {
        let store = store_with(Vec::new(), None);
        assert_eq!(store.state(), FetchState::Idle);
        for id in [0, 1, 2, 999, u32::MAX] {
            assert_eq!(store.find_by_id(id), None);
        }
    }

    #[tokio::test]
    async fn successful_load_keeps_order_and_count() {
        let store = store_with(vec![ok(FAMILY)], None);
        let settled = store.refresh().await.unwrap();
        assert_eq!(settled, store.state());

        let ids: Vec<u32> = store.state().records().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 2, 5]);
    }

    #[tokio::test]
    async fn every_loaded_record_is_found_by_id() {
        let store = store_with(vec![ok(FAMILY)], None);
        store.refresh().await.unwrap();
        for record in store.state().records() {
            assert_eq!(store.find_by_id(record.id).as_ref(), Some(record));
        }
        assert_eq!(store.find_by_id(1), None);
    }

    #[tokio::test]
    async fn single_character_page() {
        let store = store_with(vec![ok(RICK)], None);
        store.refresh().await.unwrap();
        assert_eq!(
            store.state(),
            FetchState::Succeeded(vec![Character {
                id: 1,
                name: "Rick".to_string(),
                status: "Alive".to_string(),
                species: "Human".to_string(),
                image_ref: "u1".to_string(),
            }])
        );
        assert_eq!(store.find_by_route_id("999"), None);
        assert_eq!(store.find_by_route_id("1").map(|c| c.name), Some("Rick".to_string()));
    }

    #[tokio::test]
    async fn server_error_fails_as_transport() {
        let store = store_with(vec![Ok(HttpResponse::new(500, "oops"))], None);
        let settled = store.refresh().await.unwrap();
        assert_eq!(settled.failure().unwrap().kind, ErrorKind::Transport);
        assert!(!settled.is_loading());
    }

    #[tokio::test]
    async fn wrong_shape_fails_as_decode() {
        let store = store_with(vec![ok(r#"{"bad":"shape"}"#)], None);
        let settled = store.refresh().await.unwrap();
        assert_eq!(settled.failure().unwrap().kind, ErrorKind::Decode);
    }

    #[tokio::test]
    async fn failure_clears_previous_records() {
        let store = store_with(
            vec![ok(RICK), Err(FetchError::Transport("offline".to_string()))],
            None,
        );
        store.refresh().await.unwrap();
        assert!(store.find_by_id(1).is_some());

        let settled = store.refresh().await.unwrap();
        assert!(matches!(settled, FetchState::Failed(_)));
        assert!(store.state().records().is_empty());
        assert_eq!(store.find_by_id(1), None);
    }

    #[tokio::test]
    async fn reload_after_failure_recovers() {
        let store = store_with(vec![Ok(HttpResponse::new(502, "")), ok(RICK)], None);
        assert!(store.refresh().await.unwrap().failure().is_some());
        assert_eq!(store.refresh().await.unwrap().records().len(), 1);
    }

    #[tokio::test]
    async fn a_later_fetch_replaces_records() {
        let store = store_with(vec![ok(RICK), ok(FAMILY)], None);
        store.refresh().await.unwrap();
        store.refresh().await.unwrap();
        assert_eq!(store.find_by_id(1), None);
        assert_eq!(store.state().records().len(), 3);
    }

    #[tokio::test]
    async fn load_sets_loading_before_returning() {
        let gate = Arc::new(Notify::new());
        let store = store_with(vec![ok(RICK)], Some(gate.clone()));

        let handle = store.load().unwrap();
        assert_eq!(store.state(), FetchState::Loading);
        assert_eq!(store.find_by_id(1), None);

        gate.notify_one();
        handle.await.unwrap();
        assert_eq!(store.state().records().len(), 1);
    }

    #[tokio::test]
    async fn load_while_loading_is_rejected() {
        let gate = Arc::new(Notify::new());
        let store = store_with(vec![ok(RICK), ok(FAMILY)], Some(gate.clone()));

        let handle = store.load().unwrap();
        assert!(matches!(store.load(), Err(StoreError::AlreadyLoading)));
        assert!(matches!(store.refresh().await, Err(StoreError::AlreadyLoading)));
        assert_eq!(store.state(), FetchState::Loading);

        gate.notify_one();
        handle.await.unwrap();
        // The rejected calls never reached the transport.
        assert_eq!(store.state().records()[0].name, "Rick");
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_result() {
        let gate = Arc::new(Notify::new());
        let store = store_with(vec![ok(RICK)], Some(gate.clone()));
        let mut rx = store.subscribe();

        let handle = store.load().unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_loading());

        gate.notify_one();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().records().len(), 1);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn dropping_store_mid_fetch_discards_result() {
        let gate = Arc::new(Notify::new());
        let store = store_with(vec![ok(RICK)], Some(gate.clone()));
        let mut rx = store.subscribe();

        let handle = store.load().unwrap();
        drop(store);
        gate.notify_one();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.records().len(), 1);
        // The receiver never saw the late result; the channel is closed.
        assert!(rx.borrow_and_update().is_loading());
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test]
    async fn aborted_load_settles_as_failed() {
        let store = store_over(Arc::new(Stalled));

        let handle = store.load().unwrap();
        tokio::task::yield_now().await;
        assert!(store.state().is_loading());

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        let state = store.state();
        let failure = state.failure().expect("aborted load must settle");
        assert_eq!(failure.kind, ErrorKind::Transport);
        assert_eq!(failure.message, FETCH_ABANDONED);
        assert!(store.load().is_ok());
    }

    #[tokio::test]
    async fn load_aborted_before_it_runs_settles_as_failed() {
        let store = store_over(Arc::new(Stalled));
        let mut rx = store.subscribe();

        let handle = store.load().unwrap();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        assert!(store.state().failure().is_some());
        assert!(rx.borrow_and_update().failure().is_some());
        assert!(store.load().is_ok());
    }

    #[tokio::test]
    async fn panicking_transport_does_not_wedge_the_store() {
        let store = store_over(Arc::new(PanicsOnce {
            calls: AtomicUsize::new(0),
        }));

        let err = store.refresh().await.unwrap_err();
        assert!(matches!(err, StoreError::Join(ref e) if e.is_panic()));
        assert_eq!(store.state().failure().unwrap().kind, ErrorKind::Transport);

        let settled = store.refresh().await.unwrap();
        assert_eq!(settled.records().len(), 1);
        assert_eq!(store.find_by_id(1).map(|c| c.name), Some("Rick".to_string()));
    }

    #[tokio::test]
    async fn settled_result_is_not_overwritten_by_the_guard() {
        let store = store_with(vec![ok(RICK)], None);
        let handle = store.load().unwrap();
        handle.await.unwrap();
        // The guard was consumed by a successful settle.
        assert_eq!(store.state().records().len(), 1);
        assert!(store.state().failure().is_none());
    }

    #[test]
    fn route_ids_must_be_canonical() {
        assert_eq!(parse_route_id("42"), Some(42));
        assert_eq!(parse_route_id("0"), Some(0));
        for raw in ["", "abc", "+1", "01", " 1", "-3", "4294967296"] {
            assert_eq!(parse_route_id(raw), None, "{raw:?}");
        }
    }
}
