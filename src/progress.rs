use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Reserved progress value: the caller has no steps left.
pub const PROGRESS_COMPLETE: i32 = -1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Per-caller pointer into the lesson step chain.
///
/// `advance_if_current` is the only mutation the turn pipeline performs:
/// a compare-and-swap against the previously read value, so two
/// overlapping turns for one caller cannot both advance from the same
/// step. The loser observes `false` and the turn is rejected.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Current step pointer, or `None` when the caller has no progress
    /// record at all.
    async fn current_step(&self, caller_id: &str) -> Result<Option<i32>, StoreError>;

    /// Atomically moves the pointer from `expected_current` to `next`.
    /// Returns `false` when the stored value no longer matches.
    async fn advance_if_current(
        &self,
        caller_id: &str,
        expected_current: i32,
        next: i32,
    ) -> Result<bool, StoreError>;

    /// Sets the pointer for a caller that does not have one yet. Existing
    /// progress is left alone.
    async fn initialize(&self, caller_id: &str, first_step_id: i32) -> Result<(), StoreError>;

    /// Unconditionally rewinds the pointer to `first_step_id`. Returns
    /// `false` when the caller is unknown.
    async fn reset(&self, caller_id: &str, first_step_id: i32) -> Result<bool, StoreError>;
}

/// Map-backed store for tests and single-process embedding. The mutex is
/// held only for the duration of each operation; the CAS semantics match
/// the SQL implementation.
#[derive(Default)]
pub struct MemoryProgressStore {
    entries: Mutex<HashMap<String, i32>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(caller_id: &str, step_id: i32) -> Self {
        let store = Self::new();
        store.entries.lock().insert(caller_id.to_string(), step_id);
        store
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn current_step(&self, caller_id: &str) -> Result<Option<i32>, StoreError> {
        Ok(self.entries.lock().get(caller_id).copied())
    }

    async fn advance_if_current(
        &self,
        caller_id: &str,
        expected_current: i32,
        next: i32,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock();
        match entries.get_mut(caller_id) {
            Some(current) if *current == expected_current => {
                *current = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn initialize(&self, caller_id: &str, first_step_id: i32) -> Result<(), StoreError> {
        self.entries
            .lock()
            .entry(caller_id.to_string())
            .or_insert(first_step_id);
        Ok(())
    }

    async fn reset(&self, caller_id: &str, first_step_id: i32) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock();
        match entries.get_mut(caller_id) {
            Some(current) => {
                *current = first_step_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
