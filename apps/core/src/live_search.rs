//! Keystroke-driven search lifecycle.
//!
//! Every query change starts a new generation. Searches run on the blocking
//! pool and are never aborted; a completion is published only while its
//! generation is still the newest one and the controller is open.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::history::HistorySource;
use crate::model::{HistoryEntry, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    Published,
    Stale,
    Closed,
}

pub struct LiveSearch<S: HistorySource> {
    source: Arc<S>,
    state: Arc<watch::Sender<SearchResult<HistoryEntry>>>,
    latest: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
    query: Option<String>,
}

impl<S: HistorySource> LiveSearch<S> {
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(SearchResult::loading());
        Self {
            source: Arc::new(source),
            state: Arc::new(state),
            latest: Arc::new(AtomicU64::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
            query: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResult<HistoryEntry>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchResult<HistoryEntry> {
        self.state.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Starts a search for `query` unless it equals the current value.
    /// Must be called from within a tokio runtime.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<JoinHandle<Publication>> {
        let query = query.into();
        if self.closed.load(Ordering::SeqCst) || self.query.as_deref() == Some(query.as_str()) {
            return None;
        }
        self.query = Some(query.clone());

        // Bump and mark loading under the channel lock so a completing
        // search never observes the new generation half-applied.
        let mut generation = 0;
        self.state.send_modify(|current| {
            generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            current.is_loading = true;
        });
        debug!(generation, query = %query, "search requested");

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.latest);
        let closed = Arc::clone(&self.closed);

        Some(tokio::spawn(async move {
            let worker = Arc::clone(&source);
            let result = match tokio::task::spawn_blocking(move || worker.search(&query)).await {
                Ok(result) => result,
                Err(error) => {
                    warn!(generation, %error, "search task failed");
                    SearchResult::unavailable(source.unavailable_view())
                }
            };
            publish(&state, &latest, &closed, generation, result)
        }))
    }

    /// Detaches the consumer. In-flight searches finish but are never
    /// published.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl<S: HistorySource> Drop for LiveSearch<S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn publish(
    state: &watch::Sender<SearchResult<HistoryEntry>>,
    latest: &AtomicU64,
    closed: &AtomicBool,
    generation: u64,
    result: SearchResult<HistoryEntry>,
) -> Publication {
    let mut outcome = Publication::Closed;
    state.send_if_modified(|current| {
        if closed.load(Ordering::SeqCst) {
            outcome = Publication::Closed;
            return false;
        }
        if latest.load(Ordering::SeqCst) != generation {
            outcome = Publication::Stale;
            return false;
        }
        *current = result;
        outcome = Publication::Published;
        true
    });

    if outcome != Publication::Published {
        debug!(generation, ?outcome, "search result discarded");
    }
    outcome
}
