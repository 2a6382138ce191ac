use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::domain::{Record, SequenceCollection};
use crate::entrez::{RecordSource, SearchSession};
use crate::error::LassaError;
use crate::segment;

pub const BATCH_SIZE: usize = 100;
pub const MAX_ATTEMPTS: usize = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Cooperative cancellation flag, checked before every window and before
/// every retry sleep. Cancelling never corrupts output: files are written
/// only after the whole pipeline completes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub records: SequenceCollection,
    pub total_found: usize,
    /// Start offsets of windows dropped after exhausting retries.
    pub skipped_windows: Vec<usize>,
}

/// Drives batched retrieval: one initial search, then fixed-size windows in
/// ascending order. Search exhaustion is fatal; a window that fails every
/// attempt is skipped and recorded. Each record is tagged with its frozen
/// segment verdict and original header the moment it is ingested.
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    batch_size: usize,
    max_attempts: usize,
    retry_delay: Duration,
    cancel: CancelToken,
}

impl Default for FetchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchOrchestrator {
    pub fn new() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            cancel: CancelToken::new(),
        }
    }

    /// Tightened retry policy for tests; production code uses the defaults.
    pub fn with_retry_policy(batch_size: usize, max_attempts: usize, retry_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_attempts: max_attempts.max(1),
            retry_delay,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Search only: resolve the total count without fetching anything.
    pub fn probe<S: RecordSource>(
        &self,
        source: &S,
        term: &str,
    ) -> Result<SearchSession, LassaError> {
        self.search_with_retries(source, term)
    }

    pub fn run<S: RecordSource>(&self, source: &S, term: &str) -> Result<FetchOutcome, LassaError> {
        let session = self.search_with_retries(source, term)?;
        tracing::info!(count = session.count, "search complete");

        let mut records = Vec::new();
        let mut skipped_windows = Vec::new();
        let mut start = 0;
        while start < session.count {
            self.check_cancelled()?;
            let size = self.batch_size.min(session.count - start);
            match self.fetch_window_with_retries(source, &session, start, size) {
                Ok(batch) => {
                    for raw in batch {
                        let verdict = segment::classify_record(&raw);
                        records.push(Record::tagged(raw, verdict));
                    }
                }
                Err(LassaError::Cancelled) => return Err(LassaError::Cancelled),
                Err(err) => {
                    tracing::warn!(start, size, error = %err, "skipping window after exhausted retries");
                    skipped_windows.push(start);
                }
            }
            start += self.batch_size;
        }

        Ok(FetchOutcome {
            records,
            total_found: session.count,
            skipped_windows,
        })
    }

    fn search_with_retries<S: RecordSource>(
        &self,
        source: &S,
        term: &str,
    ) -> Result<SearchSession, LassaError> {
        let mut attempt = 0;
        loop {
            self.check_cancelled()?;
            attempt += 1;
            match source.search(term) {
                Ok(session) => return Ok(session),
                Err(err) if attempt < self.max_attempts => {
                    tracing::warn!(attempt, error = %err, "search attempt failed, retrying");
                    self.sleep_before_retry()?;
                }
                Err(err) => return Err(LassaError::SearchFailed(err.to_string())),
            }
        }
    }

    fn fetch_window_with_retries<S: RecordSource>(
        &self,
        source: &S,
        session: &SearchSession,
        start: usize,
        size: usize,
    ) -> Result<Vec<crate::domain::RawRecord>, LassaError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match source.fetch_window(session, start, size) {
                Ok(batch) => return Ok(batch),
                Err(err) if attempt < self.max_attempts => {
                    tracing::warn!(start, attempt, error = %err, "window fetch failed, retrying");
                    self.sleep_before_retry()?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn sleep_before_retry(&self) -> Result<(), LassaError> {
        self.check_cancelled()?;
        thread::sleep(self.retry_delay);
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), LassaError> {
        if self.cancel.is_cancelled() {
            return Err(LassaError::Cancelled);
        }
        Ok(())
    }
}
