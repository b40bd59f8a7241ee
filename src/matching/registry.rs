//! Participant registry with stale-load protection
//!
//! The registry owns the current roster as a single [`RosterState`] value inside
//! a watch channel. Every load is tagged with a request id taken from a counter
//! that only grows. A completed load is applied only if its id is still the
//! latest issued id, and that comparison runs inside the channel's modify
//! closure, so it happens atomically with the replacement of the state.
//!
//! Consequences:
//! - Overlapping loads resolve to the most recently *issued* one, whatever order
//!   they complete in
//! - A blank roster URL resets the state immediately and invalidates every
//!   in-flight load
//! - A failed fetch leaves an empty roster and is logged, never returned

use std::sync::Arc;

use futures::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use super::matcher::{MatchMode, RosterIndex};
use crate::Result;
use crate::provider::RosterProvider;
use crate::schema::{RawParticipant, parse_roster};
use crate::types::ProcessedEntry;

/// Whole-value registry state.
#[derive(Default, Debug, Clone)]
pub struct RosterState {
    /// Participants as parsed from the roster
    pub participants: Arc<Vec<RawParticipant>>,
    /// Matching index built from `participants`
    pub index: Arc<RosterIndex>,
    /// A load has been issued and not yet applied
    pub loading: bool,
    /// Id of the most recently issued load
    pub latest_request: u64,
    /// Trimmed URL of the most recently issued load
    pub source_url: String,
}

impl RosterState {
    pub fn is_registered(&self, entry: &ProcessedEntry, mode: MatchMode) -> bool {
        self.index.is_registered(entry, mode)
    }
}

/// Loads roster text through a [`RosterProvider`] and keeps the matching index.
pub struct ParticipantRegistry<P> {
    provider: P,
    state: watch::Sender<RosterState>,
}

impl<P: RosterProvider> ParticipantRegistry<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, state: watch::Sender::new(RosterState::default()) }
    }

    /// Load the roster at `url`, replacing the current participants.
    ///
    /// A blank URL clears the roster without fetching.
    pub async fn load(&self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            self.reset();
            return;
        }

        let request_id = self.begin_load(url);
        debug!("Fetching roster (request {}) from {}", request_id, url);

        let result = self.provider.fetch_roster(url).await;
        self.apply(request_id, result);
    }

    /// Issue a new request id for `url` and mark the registry as loading.
    ///
    /// Any load issued earlier becomes stale.
    pub fn begin_load(&self, url: &str) -> u64 {
        let mut request_id = 0;
        self.state.send_modify(|state| {
            state.latest_request += 1;
            state.loading = true;
            state.source_url = url.trim().to_string();
            request_id = state.latest_request;
        });
        request_id
    }

    /// Apply the outcome of load `request_id`.
    ///
    /// Returns `false` when the load is stale and was discarded.
    pub fn apply(&self, request_id: u64, result: Result<String>) -> bool {
        self.state.send_if_modified(|state| {
            if state.latest_request != request_id {
                debug!("Discarding stale roster result (request {}, latest {})", request_id, state.latest_request);
                return false;
            }

            let participants = match result {
                Ok(text) => {
                    let participants = parse_roster(&text);
                    info!("Loaded {} roster participants from {}", participants.len(), state.source_url);
                    participants
                }
                Err(e) => {
                    warn!("Failed to load roster from {}: {}", state.source_url, e);
                    Vec::new()
                }
            };

            state.index = Arc::new(RosterIndex::from_participants(&participants));
            state.participants = Arc::new(participants);
            state.loading = false;
            true
        })
    }

    /// Clear the roster and invalidate in-flight loads.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            state.latest_request += 1;
            state.participants = Arc::default();
            state.index = Arc::default();
            state.loading = false;
            state.source_url.clear();
        });
        debug!("Roster cleared");
    }

    /// Current state.
    pub fn snapshot(&self) -> RosterState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Whether `entry` matches a registered participant in the current roster.
    pub fn is_registered(&self, entry: &ProcessedEntry, mode: MatchMode) -> bool {
        self.state.borrow().is_registered(entry, mode)
    }

    pub fn subscribe(&self) -> watch::Receiver<RosterState> {
        self.state.subscribe()
    }

    /// Current state followed by every applied change.
    pub fn updates(&self) -> impl Stream<Item = RosterState> + 'static {
        WatchStream::new(self.state.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimingError;
    use crate::test_utils::entry;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    const ROSTER_A: &str = "Pos,Driver,Country,City,Team,Class,Car\n1,Ivan Ivanov,RU,Moscow,-,GT3,-";
    const ROSTER_B: &str = "Pos,Driver,Country,City,Team,Class,Car\n1,Petr Petrov,RU,Kazan,Team B,GT3,-\n2,Anna Smirnova,RU,Kazan,,GT4,-";

    /// Serves fixed responses per URL.
    struct StaticRoster(HashMap<&'static str, std::result::Result<&'static str, u16>>);

    #[async_trait::async_trait]
    impl RosterProvider for StaticRoster {
        async fn fetch_roster(&self, url: &str) -> Result<String> {
            match self.0.get(url) {
                Some(Ok(text)) => Ok(text.to_string()),
                Some(Err(status)) => Err(TimingError::status(url, *status)),
                None => Err(TimingError::status(url, 404)),
            }
        }
    }

    /// Holds each response until the test releases it.
    struct GatedRoster(Mutex<HashMap<String, oneshot::Receiver<String>>>);

    #[async_trait::async_trait]
    impl RosterProvider for GatedRoster {
        async fn fetch_roster(&self, url: &str) -> Result<String> {
            let gate = self.0.lock().unwrap().remove(url).expect("gate registered for url");
            Ok(gate.await.expect("gate released"))
        }
    }

    fn named(driver: &str) -> ProcessedEntry {
        let mut row = entry("id", None);
        row.driver_name = driver.to_string();
        row.car_class = "GT3".to_string();
        row
    }

    #[tokio::test]
    async fn loads_and_indexes_roster() {
        let _ = tracing_subscriber::fmt::try_init();
        let registry = ParticipantRegistry::new(StaticRoster(HashMap::from([("a", Ok(ROSTER_B))])));

        registry.load("  a ").await;

        let state = registry.snapshot();
        assert_eq!(state.participants.len(), 2);
        assert_eq!(state.participants[0].team.as_deref(), Some("Team B"));
        assert_eq!(state.participants[1].team, None);
        assert_eq!(state.source_url, "a");
        assert!(!state.loading);
        assert!(registry.is_registered(&named("Petrov Petr"), MatchMode::Strict));
        assert!(!registry.is_registered(&named("Ivan Ivanov"), MatchMode::Strict));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_empty_roster() {
        let registry = ParticipantRegistry::new(StaticRoster(HashMap::from([("a", Ok(ROSTER_A)), ("b", Err(500))])));

        registry.load("a").await;
        assert_eq!(registry.snapshot().participants.len(), 1);

        registry.load("b").await;
        let state = registry.snapshot();
        assert!(state.participants.is_empty());
        assert!(state.index.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn blank_url_resets_without_fetching() {
        // No responses at all: any fetch would fail and log, but must not happen
        let registry = ParticipantRegistry::new(StaticRoster(HashMap::new()));
        registry.load("   ").await;

        let state = registry.snapshot();
        assert!(state.participants.is_empty());
        assert!(state.source_url.is_empty());
        assert!(!state.loading);
        assert_eq!(state.latest_request, 1);
    }

    #[tokio::test]
    async fn older_request_completing_last_is_discarded() {
        let (release_a, gate_a) = oneshot::channel();
        let (release_b, gate_b) = oneshot::channel();
        let provider =
            GatedRoster(Mutex::new(HashMap::from([("a".to_string(), gate_a), ("b".to_string(), gate_b)])));
        let registry = ParticipantRegistry::new(provider);

        tokio::join!(registry.load("a"), registry.load("b"), async {
            release_b.send(ROSTER_B.to_string()).unwrap();
            tokio::task::yield_now().await;
            release_a.send(ROSTER_A.to_string()).unwrap();
        });

        let state = registry.snapshot();
        assert_eq!(state.latest_request, 2);
        assert_eq!(state.source_url, "b");
        assert_eq!(state.participants.len(), 2);
        assert_eq!(state.participants[0].driver, "Petr Petrov");
    }

    #[test]
    fn stale_apply_is_rejected() {
        let registry = ParticipantRegistry::new(StaticRoster(HashMap::new()));
        let first = registry.begin_load("a");
        let second = registry.begin_load("b");
        assert!(registry.is_loading());

        assert!(registry.apply(second, Ok(ROSTER_B.to_string())));
        assert!(!registry.apply(first, Ok(ROSTER_A.to_string())));

        let state = registry.snapshot();
        assert_eq!(state.participants.len(), 2);
        assert!(!state.loading);
    }

    #[test]
    fn reset_invalidates_in_flight_load() {
        let registry = ParticipantRegistry::new(StaticRoster(HashMap::new()));
        let pending = registry.begin_load("a");
        registry.reset();

        assert!(!registry.apply(pending, Ok(ROSTER_A.to_string())));
        assert!(registry.snapshot().participants.is_empty());
        assert!(!registry.is_loading());
    }

    #[tokio::test]
    async fn updates_yield_applied_states() {
        use futures::StreamExt;

        let registry = ParticipantRegistry::new(StaticRoster(HashMap::from([("a", Ok(ROSTER_A))])));
        let mut updates = Box::pin(registry.updates());

        let initial = updates.next().await.expect("initial state");
        assert!(initial.participants.is_empty());

        registry.load("a").await;
        let loaded = updates.next().await.expect("loaded state");
        assert_eq!(loaded.participants.len(), 1);
    }
}
