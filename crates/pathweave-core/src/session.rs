//! Process-wide build session: frequency store plus a generation counter.
//!
//! Every build takes a [`Generation`] when it starts (before any fetch).
//! Only the most recent generation may commit into the frequency store; a
//! build overtaken by a newer trigger is discarded instead of merged.

use crate::error::{CoreError, Result};
use crate::frequency::{FrequencyRow, FrequencyStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Session {
    store: Mutex<FrequencyStore>,
    generation: AtomicU64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new build; any build holding an older generation becomes stale.
    pub fn begin(&self) -> Generation {
        Generation(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }

    /// Run `apply` against the frequency store if `generation` is still current.
    ///
    /// The check and the mutation happen under the same lock, so a stale build
    /// can never write.
    pub fn commit<T>(
        &self,
        generation: Generation,
        apply: impl FnOnce(&mut FrequencyStore) -> T,
    ) -> Result<T> {
        let mut store = self.store.lock();
        let current = self.current();
        if current != generation {
            tracing::warn!(
                generation = generation.value(),
                current = current.value(),
                "discarding stale build"
            );
            return Err(CoreError::StaleBuild {
                generation: generation.value(),
                current: current.value(),
            });
        }
        Ok(apply(&mut store))
    }

    pub fn with_store<T>(&self, read: impl FnOnce(&FrequencyStore) -> T) -> T {
        read(&self.store.lock())
    }

    pub fn frequency_table(&self) -> Vec<FrequencyRow> {
        self.with_store(FrequencyStore::table)
    }

    /// Forget all accumulated frequencies and loaded pathways.
    pub fn reset(&self) {
        self.store.lock().reset();
    }
}
