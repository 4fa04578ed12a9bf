//! In-memory event bus.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::application::ports::{
    EntryResult, EventPublishError, EventPublisherPort, PublishEntry, PublishOutcome,
};
use crate::domain::events::SymbolEvent;

/// Accepted entries kept by [`InMemoryEventBus::new`].
pub const DEFAULT_RETAINED_ENTRIES: usize = 1024;

/// Recording implementation of `EventPublisherPort`.
///
/// The most recent accepted entries are kept in publish order, up to the
/// retention limit; older ones are dropped. Failures can be scripted for the
/// next call, either as a whole-call error or as per-entry rejections.
#[derive(Debug)]
pub struct InMemoryEventBus {
    calls: AtomicUsize,
    accepted: Mutex<VecDeque<PublishEntry>>,
    retained_entries: usize,
    scripted_errors: Mutex<VecDeque<EventPublishError>>,
    scripted_rejections: Mutex<Option<BTreeSet<usize>>>,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_ENTRIES)
    }
}

impl InMemoryEventBus {
    /// Create a new empty bus with the default retention limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty bus keeping at most `retained_entries` accepted
    /// entries.
    #[must_use]
    pub fn with_retention(retained_entries: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            accepted: Mutex::new(VecDeque::new()),
            retained_entries,
            scripted_errors: Mutex::new(VecDeque::new()),
            scripted_rejections: Mutex::new(None),
        }
    }

    /// Fail the next publish call with `error`.
    pub fn fail_next_publish(&self, error: EventPublishError) {
        self.scripted_errors.lock().push_back(error);
    }

    /// Reject the entries at `positions` on the next publish call.
    pub fn reject_entries(&self, positions: &[usize]) {
        *self.scripted_rejections.lock() = Some(positions.iter().copied().collect());
    }

    /// Number of publish calls received, including failed ones.
    #[must_use]
    pub fn publish_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Retained accepted entries, oldest first.
    #[must_use]
    pub fn accepted_entries(&self) -> Vec<PublishEntry> {
        self.accepted.lock().iter().cloned().collect()
    }

    /// Retained accepted events, decoded from their entry details.
    #[must_use]
    pub fn published_events(&self) -> Vec<SymbolEvent> {
        self.accepted
            .lock()
            .iter()
            .filter_map(|entry| serde_json::from_str(&entry.detail).ok())
            .collect()
    }
}

#[async_trait]
impl EventPublisherPort for InMemoryEventBus {
    async fn publish_events(
        &self,
        entries: Vec<PublishEntry>,
    ) -> Result<PublishOutcome, EventPublishError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self.scripted_errors.lock().pop_front() {
            return Err(error);
        }

        let rejections = self.scripted_rejections.lock().take().unwrap_or_default();
        let mut accepted = self.accepted.lock();
        let results: Vec<EntryResult> = entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                if rejections.contains(&position) {
                    EntryResult::Rejected {
                        error_code: "InternalFailure".to_string(),
                        error_message: "entry rejected".to_string(),
                    }
                } else {
                    if self.retained_entries > 0 {
                        if accepted.len() == self.retained_entries {
                            accepted.pop_front();
                        }
                        accepted.push_back(entry);
                    }
                    EntryResult::Accepted {
                        event_id: Uuid::new_v4().to_string(),
                    }
                }
            })
            .collect();

        Ok(PublishOutcome {
            failed_entry_count: results.iter().filter(|r| r.is_rejected()).count(),
            entries: results,
        })
    }
}
