//! Bounded, newest-first store of received webhooks.
//!
//! A single mutex covers `add`, `list` and `clear`. Critical sections are
//! memory-only and never await, so a cancelled request can never leave a
//! half-written record behind.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::DEFAULT_STORE_CAPACITY;
use crate::error::ConfigError;

use super::types::{now_timestamp, NewWebhook, ReceivedWebhook};

/// In-memory ring buffer of the most recent deliveries.
///
/// Records are lost on restart. The id counter lives for the lifetime of
/// the store and is not reset by [`WebhookStore::clear`].
#[derive(Debug)]
pub struct WebhookStore {
    max_size: usize,
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Front is newest.
    records: VecDeque<ReceivedWebhook>,
    counter: u64,
}

impl WebhookStore {
    /// Create a store retaining at most `max_size` records.
    pub fn new(max_size: usize) -> Result<Self, ConfigError> {
        if max_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            max_size,
            inner: Mutex::new(StoreInner {
                records: VecDeque::with_capacity(max_size),
                counter: 0,
            }),
        })
    }

    /// Assign an id and timestamp, insert at the front and evict the oldest
    /// record if the bound is exceeded. Returns the stored record.
    pub fn add(&self, webhook: NewWebhook) -> ReceivedWebhook {
        let mut inner = self.lock();

        inner.counter += 1;
        let record = ReceivedWebhook {
            id: format!("wh_{}", inner.counter),
            valid: webhook.valid,
            error: webhook.error,
            events: webhook.events,
            received_at: now_timestamp(),
            raw_body: webhook.raw_body,
        };

        inner.records.push_front(record.clone());
        while inner.records.len() > self.max_size {
            inner.records.pop_back();
        }

        record
    }

    /// Snapshot of all retained records, newest first.
    pub fn list(&self) -> Vec<ReceivedWebhook> {
        self.lock().records.iter().cloned().collect()
    }

    /// Drop every retained record and return how many were dropped.
    /// The id counter keeps counting.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let removed = inner.records.len();
        inner.records.clear();
        removed
    }

    // Every critical section leaves the state consistent, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for WebhookStore {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_STORE_CAPACITY,
            inner: Mutex::new(StoreInner::default()),
        }
    }
}
