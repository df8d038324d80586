//! Coupon code validation: drives a one-time load of a coupon directory,
//! then classifies lookups against the resulting index.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};

use super::index::Index;
use super::loader::{load_coupons, LoaderConfig, LoaderError};

/// Worker count the validator always drives its load with.
const LOAD_WORKER_COUNT: i64 = 6;

/// Deadline the validator always drives its load with.
const LOAD_DEADLINE: Duration = Duration::from_secs(120);

/// Minimum and maximum valid coupon code length, inclusive, in bytes.
const MIN_CODE_LEN: usize = 8;
const MAX_CODE_LEN: usize = 10;

/// A code must appear in at least this many recorded occurrences to be
/// considered valid. See `Index::set`'s doc comment: this counts
/// occurrences, not distinct files.
const MIN_OCCURRENCES: u64 = 2;

/// Validation failures, classified the way the core taxonomy (bad-input /
/// internal) requires. `Validator` itself never returns a `Timeout`
/// variant to callers of `validate` — a timed-out load simply leaves the
/// validator answering every code as not-found via `InvalidCode`, since by
/// construction the index can never transition to ready with missing
/// entries silently filled in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid coupon code format")]
    InvalidFormat,

    #[error("invalid coupon code")]
    InvalidCode,

    #[error("invalid coupon code (not in enough files)")]
    NotDistinctEnough,
}

/// Non-fatal problem encountered while constructing the validator. A
/// `Validator` is always returned even when this is `Some` — per spec, a
/// failed or partial load degrades validation results, it never panics or
/// prevents the service from starting.
#[derive(Debug, Error)]
pub enum ValidatorInitError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Validates coupon codes against a directory of gzip-compressed coupon
/// files, loaded once at construction time.
#[derive(Debug)]
pub struct Validator {
    index: Arc<Index>,
}

impl Validator {
    /// Starts loading `dir` with a fixed worker count and deadline. Always
    /// returns a `Validator` — the second element of the tuple carries any
    /// load error for the caller to log, but never blocks startup on it.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn new(dir: impl AsRef<Path>) -> (Self, Option<ValidatorInitError>) {
        let index = Arc::new(Index::new());
        let cfg = LoaderConfig::new(dir.as_ref(), LOAD_WORKER_COUNT);

        let result = load_coupons(cfg, Arc::clone(&index), LOAD_DEADLINE).await;
        let error = match result {
            Ok(()) => {
                info!("coupon index load finished");
                None
            }
            Err(e) => {
                warn!(error = %e, "coupon index load did not finish cleanly");
                Some(ValidatorInitError::from(e))
            }
        };

        (Self { index }, error)
    }

    /// Constructs a validator around an already-populated index. Used by
    /// tests and by callers that manage loading themselves.
    #[must_use]
    pub fn from_index(index: Arc<Index>) -> Self {
        Self { index }
    }

    /// Blocks until the underlying index is ready, or `timeout` elapses.
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        self.index.wait_until_ready(timeout).await
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.index.is_ready()
    }

    /// Validates `code` against length, presence, and distinctness, in
    /// that order — the first failing rule wins.
    #[instrument(skip(self))]
    pub fn validate(&self, code: &str) -> Result<(), ValidationError> {
        let len = code.len();
        if len < MIN_CODE_LEN || len > MAX_CODE_LEN {
            return Err(ValidationError::InvalidFormat);
        }

        let coupon = self.index.get(code).ok_or(ValidationError::InvalidCode)?;

        if coupon.file_count < MIN_OCCURRENCES {
            return Err(ValidationError::NotDistinctEnough);
        }

        Ok(())
    }
}
