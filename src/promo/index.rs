//! Concurrent coupon cache: aggregates coupon occurrences across files,
//! tracks load progress, and signals readiness once ingestion completes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use tokio::sync::Notify;
use tracing::{debug, instrument};

/// A single coupon record: the code and how many times `Set` has recorded
/// it during the current load.
///
/// Per spec, `file_count` is incremented once per `Set` call, not once per
/// distinct file — a code appearing ten times in one file raises its count
/// by ten. The "at least two" validity rule therefore really means "at
/// least two occurrences anywhere", not "two distinct files". This mirrors
/// the source behavior exactly (see `Index::set`) and is intentional, not
/// a bug to quietly fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub code: String,
    pub file_count: u64,
}

#[derive(Debug, Default)]
struct IndexState {
    store: HashMap<String, Coupon>,
    total_files: usize,
    loaded: usize,
    ready: bool,
    loaded_successfully: bool,
}

/// In-memory authoritative set of coupons plus ingestion-progress state.
///
/// All mutating fields are guarded by a single `RwLock` so that `ready`
/// can never be observed true before every preceding write (map entries,
/// counters) is visible — splitting the lock risks exactly that race.
/// The one-shot readiness signal is a `Notify` gated by an `AtomicBool` so
/// that `wait_until_ready` never busy-polls and late subscribers still see
/// an already-fired signal immediately.
#[derive(Debug, Default)]
pub struct Index {
    state: RwLock<IndexState>,
    ready_flag: AtomicBool,
    ready_signal: Notify,
}

impl Index {
    /// Creates a new, empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates a coupon. If `code` is absent, records it with
    /// `file_count = 1`. If present, increments the stored `file_count` by
    /// one. Atomic against concurrent `set`/`get`.
    #[instrument(skip(self))]
    pub fn set(&self, code: &str) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match state.store.get_mut(code) {
            Some(existing) => existing.file_count += 1,
            None => {
                state.store.insert(
                    code.to_string(),
                    Coupon {
                        code: code.to_string(),
                        file_count: 1,
                    },
                );
            }
        }
    }

    /// Exact-match read.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<Coupon> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.store.get(code).cloned()
    }

    /// Publishes the total number of files to be ingested. Called once
    /// before any `increment_loaded`.
    pub fn set_total_files(&self, n: usize) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.total_files = n;
    }

    /// Atomically bumps the loaded counter. If this makes `loaded ==
    /// total_files`, triggers `mark_ready` as a side effect.
    pub fn increment_loaded(&self) {
        let done = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.loaded += 1;
            state.loaded == state.total_files
        };
        if done {
            self.mark_ready();
        }
    }

    /// Returns `loaded / total_files`, or 0 when `total_files == 0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        if state.total_files == 0 {
            0.0
        } else {
            state.loaded as f64 / state.total_files as f64
        }
    }

    /// Idempotent. The first call flips `ready` to true, fires the
    /// one-shot readiness signal, and — only if `loaded == total_files` at
    /// that moment — sets `loaded_successfully = true`. Further calls are
    /// no-ops.
    #[instrument(skip(self))]
    pub fn mark_ready(&self) {
        let newly_ready = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            if state.ready {
                false
            } else {
                state.ready = true;
                if state.loaded == state.total_files {
                    state.loaded_successfully = true;
                }
                true
            }
        };
        if newly_ready {
            self.ready_flag.store(true, Ordering::SeqCst);
            self.ready_signal.notify_waiters();
            debug!("coupon index marked ready");
        }
    }

    /// Whether the readiness signal has fired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_flag.load(Ordering::SeqCst)
    }

    /// Blocks until the readiness signal fires (returns `true`) or the
    /// timeout elapses (returns `false`). Never busy-polls: `Notify`
    /// suspends the waiter until `notify_waiters` or the timer fires.
    pub async fn wait_until_ready(&self, timeout: std::time::Duration) -> bool {
        // Register interest before checking the flag: notify_waiters() only
        // wakes waiters already registered, so checking first would leave a
        // window where a concurrent mark_ready() notifies before we start
        // listening and we'd only recover by sleeping out the full timeout.
        let notified = self.ready_signal.notified();
        if self.ready_flag.load(Ordering::SeqCst) {
            return true;
        }
        tokio::select! {
            () = notified => true,
            () = tokio::time::sleep(timeout) => self.ready_flag.load(Ordering::SeqCst),
        }
    }

    /// Explicit override used by the load driver on clean completion, even
    /// if readiness was already asserted transiently by `increment_loaded`.
    pub fn mark_loaded_successfully(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.loaded_successfully = true;
    }

    #[must_use]
    pub fn loaded_successfully(&self) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.loaded_successfully
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn set_first_occurrence_has_file_count_one() {
        let index = Index::new();
        index.set("ABCDEFGH");
        assert_eq!(index.get("ABCDEFGH").unwrap().file_count, 1);
    }

    #[test]
    fn set_increments_file_count_per_call_not_per_file() {
        // Property 1 / 6 with the chosen semantics: Set is a multiset
        // counter. Ten calls for the same code within one conceptual
        // "file" raise file_count by ten, not one.
        let index = Index::new();
        for _ in 0..10 {
            index.set("ABCDEFGH");
        }
        assert_eq!(index.get("ABCDEFGH").unwrap().file_count, 10);
    }

    #[test]
    fn get_missing_code_returns_none() {
        let index = Index::new();
        assert!(index.get("NOPE1234").is_none());
    }

    #[test]
    fn progress_is_zero_when_total_files_is_zero() {
        let index = Index::new();
        assert_eq!(index.progress(), 0.0);
    }

    #[test]
    fn progress_reflects_loaded_over_total() {
        let index = Index::new();
        index.set_total_files(4);
        index.increment_loaded();
        assert!((index.progress() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn increment_loaded_marks_ready_when_totals_match() {
        let index = Index::new();
        index.set_total_files(2);
        assert!(!index.is_ready());
        index.increment_loaded();
        assert!(!index.is_ready());
        index.increment_loaded();
        assert!(index.is_ready());
        assert!(index.loaded_successfully());
    }

    #[test]
    fn mark_ready_is_idempotent() {
        let index = Index::new();
        index.set_total_files(1);
        index.mark_ready();
        assert!(index.is_ready());
        assert!(!index.loaded_successfully()); // loaded still 0 != total 1
        index.mark_ready();
        assert!(index.is_ready());
    }

    #[test]
    fn mark_loaded_successfully_overrides_even_after_partial_ready() {
        let index = Index::new();
        index.set_total_files(5);
        index.mark_ready(); // ready with loaded=0, not successful
        index.mark_loaded_successfully();
        assert!(index.loaded_successfully());
    }

    #[tokio::test]
    async fn wait_until_ready_returns_true_once_fired() {
        let index = Arc::new(Index::new());
        let waiter = Arc::clone(&index);
        let handle = tokio::spawn(async move { waiter.wait_until_ready(Duration::from_secs(5)).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        index.mark_ready();

        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn wait_until_ready_times_out_when_never_fired() {
        let index = Index::new();
        let fired = index.wait_until_ready(Duration::from_millis(20)).await;
        assert!(!fired);
    }

    #[tokio::test]
    async fn wait_until_ready_returns_immediately_if_already_ready() {
        let index = Index::new();
        index.mark_ready();
        let fired = index.wait_until_ready(Duration::from_millis(1)).await;
        assert!(fired);
    }

    #[tokio::test]
    async fn simultaneous_waiters_all_observe_the_same_transition() {
        let index = Arc::new(Index::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let waiter = Arc::clone(&index);
            handles.push(tokio::spawn(async move {
                waiter.wait_until_ready(Duration::from_secs(5)).await
            }));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        index.mark_ready();

        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }

    #[test]
    fn is_ready_transitions_false_to_true_exactly_once_and_stays() {
        let index = Index::new();
        assert!(!index.is_ready());
        index.mark_ready();
        assert!(index.is_ready());
        index.mark_ready();
        assert!(index.is_ready());
    }
}
