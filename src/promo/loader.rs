//! Bulk concurrent ingestion of a directory of gzip-compressed coupon
//! files into the shared [`Index`].
//!
//! This is a canonical producer/N-consumer pipeline: one dispatcher feeds
//! file paths into a bounded channel, a fixed pool of workers drains it,
//! and a single completion barrier (`JoinHandle` join) gates readiness.
//! The shape follows the teacher's semaphore-gated `DownloadEngine`
//! (`process_queue`), generalized from an open-ended work queue to a
//! closed, pre-enumerated file list dispatched over a bounded channel.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use flate2::read::GzDecoder;
use globset::Glob;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::index::Index;

/// Worker count used when the caller supplies a non-positive value.
const DEFAULT_WORKER_COUNT: usize = 4;

/// Bound on the dispatch channel. Small and fixed: files are cheap paths,
/// not payloads, so there is no benefit to a large buffer.
const WORK_CHANNEL_CAPACITY: usize = 16;

/// Input parameters to a load.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub dir: PathBuf,
    pub worker_count: usize,
}

impl LoaderConfig {
    /// `worker_count <= 0` normalizes to [`DEFAULT_WORKER_COUNT`]. Takes an
    /// `i64` rather than `usize` so a non-positive caller value is a real,
    /// reachable comparison rather than one the unsigned type would make
    /// dead code.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, worker_count: i64) -> Self {
        let worker_count = usize::try_from(worker_count).unwrap_or(0);
        Self {
            dir: dir.into(),
            worker_count: if worker_count == 0 {
                DEFAULT_WORKER_COUNT
            } else {
                worker_count
            },
        }
    }
}

/// Errors surfaced from a load attempt.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Directory enumeration failed (the directory is missing, or its
    /// entries could not be read).
    #[error("failed to enumerate coupon directory {dir}: {source}")]
    Enumerate {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The load did not finish within the caller's deadline. The index is
    /// left exactly as it was at the moment the deadline elapsed — safely
    /// readable, just possibly incomplete.
    #[error("timed out waiting for coupon load to finish")]
    Timeout,

    /// The `*.gz` glob pattern failed to compile. Unreachable in practice
    /// since the pattern is a fixed literal, but kept as a real error path
    /// rather than an `expect` so a future pattern change fails safely.
    #[error("invalid coupon file glob pattern: {0}")]
    Pattern(#[from] globset::Error),
}

/// Drives a bounded-worker-pool load of every `*.gz` file directly under
/// `cfg.dir` into `index`, returning once all files have been processed or
/// `deadline` elapses, whichever comes first.
///
/// Per-file failures (bad gzip stream, read error) are logged and
/// swallowed — they never abort the load, and the file simply contributes
/// no codes to the index.
#[instrument(skip(index), fields(dir = %cfg.dir.display(), workers = cfg.worker_count))]
pub async fn load_coupons(
    cfg: LoaderConfig,
    index: Arc<Index>,
    deadline: Duration,
) -> Result<(), LoaderError> {
    let files = enumerate_gz_files(&cfg.dir)?;
    index.set_total_files(files.len());

    if files.is_empty() {
        info!("no .gz files found, marking index ready immediately");
        index.mark_ready();
        return Ok(());
    }

    info!(count = files.len(), "found coupon files, starting load");

    let (tx, rx) = mpsc::channel::<PathBuf>(WORK_CHANNEL_CAPACITY);
    let rx = Arc::new(tokio::sync::Mutex::new(rx));

    let mut worker_handles = Vec::with_capacity(cfg.worker_count);
    for worker_id in 0..cfg.worker_count {
        let rx = Arc::clone(&rx);
        let index = Arc::clone(&index);
        worker_handles.push(tokio::spawn(async move {
            worker_loop(worker_id, rx, index).await;
        }));
    }

    let deadline_at = Instant::now() + deadline;
    let dispatch_handle = tokio::spawn(dispatch(files, tx, deadline_at));

    let all_done = async {
        // The dispatcher's completion only indicates feeding stopped;
        // workers keep draining until the channel is closed and empty.
        let _ = dispatch_handle.await;
        for handle in worker_handles {
            let _ = handle.await;
        }
    };

    tokio::select! {
        () = all_done => {
            index.mark_loaded_successfully();
            index.mark_ready();
            info!("all coupon files processed");
            Ok(())
        }
        () = tokio::time::sleep_until(deadline_at) => {
            warn!("timeout while loading coupons");
            Err(LoaderError::Timeout)
        }
    }
}

/// Feeds file paths into the work channel, checking the deadline between
/// sends so a slow/blocked pool cannot run unboundedly past it. Unlike the
/// well-known Go pitfall of a non-blocking `break` inside a `select` that
/// doesn't actually exit the loop, this checks the deadline as an ordinary
/// loop condition, so exceeding it genuinely stops dispatch.
async fn dispatch(files: Vec<PathBuf>, tx: mpsc::Sender<PathBuf>, deadline_at: Instant) {
    for file in files {
        if Instant::now() >= deadline_at {
            debug!("dispatch stopping: deadline reached");
            return;
        }
        if tx.send(file).await.is_err() {
            // All workers dropped their receiver handle; nothing left to feed.
            return;
        }
    }
}

async fn worker_loop(worker_id: usize, rx: Arc<tokio::sync::Mutex<mpsc::Receiver<PathBuf>>>, index: Arc<Index>) {
    loop {
        let path = {
            let mut rx = rx.lock().await;
            rx.recv().await
        };
        let Some(path) = path else {
            break;
        };

        match load_one(path.clone(), Arc::clone(&index)).await {
            Ok(()) => debug!(worker_id, file = %path.display(), "loaded file"),
            Err(e) => warn!(worker_id, file = %path.display(), error = %e, "failed to load coupon file"),
        }
        index.increment_loaded();
        debug!(worker_id, progress = index.progress(), "progress");
    }
}

/// Errors while reading a single coupon file. Always recovered by the
/// caller — never propagated past `worker_loop`.
#[derive(Debug, Error)]
enum LoadOneError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read gzip stream from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("coupon file loading task panicked: {0}")]
    Panicked(#[from] tokio::task::JoinError),
}

async fn load_one(path: PathBuf, index: Arc<Index>) -> Result<(), LoadOneError> {
    // Blocking file IO + gzip inflate is bridged onto a blocking thread,
    // the same shape the teacher uses for its own blocking-adjacent work.
    tokio::task::spawn_blocking(move || load_one_blocking(&path, &index)).await?
}

fn load_one_blocking(path: &Path, index: &Index) -> Result<(), LoadOneError> {
    let file = std::fs::File::open(path).map_err(|source| LoadOneError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = GzDecoder::new(file);
    let reader = BufReader::new(decoder);

    for line in reader.lines() {
        let line = line.map_err(|source| LoadOneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let code = line.trim();
        if code.is_empty() {
            continue;
        }
        index.set(code);
    }
    Ok(())
}

fn enumerate_gz_files(dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
    let glob = Glob::new("*.gz")?.compile_matcher();

    let entries = std::fs::read_dir(dir).map_err(|source| LoaderError::Enumerate {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoaderError::Enumerate {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            if let Some(name) = path.file_name() {
                if glob.is_match(name) {
                    files.push(path);
                }
            }
        }
    }
    files.sort();
    Ok(files)
}
