//! Sequential, paced upload of every candidate row.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::client::{CreateProductRequest, ProductCreator};
use crate::config::UploadSettings;
use crate::draft::{Candidate, RowStatus, SharedRowStore};
use crate::error::RunError;
use crate::upload::cancel::CancelHandle;
use crate::upload::pacing::{PaceOutcome, Pacer};
use crate::upload::progress::{RunTracker, UploadPhase, UploadProgressBroadcaster};

/// Message left on a row whose dispatch future was dropped mid-flight.
pub const INTERRUPTED_MESSAGE: &str = "upload interrupted";

/// Outcome of one run. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Candidates actually processed (validated and possibly dispatched).
    pub attempted: usize,
    pub succeeded: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn all_succeeded(&self) -> bool {
        !self.cancelled && self.succeeded == self.attempted
    }

    /// Run-level banner text, or `None` when every candidate succeeded.
    pub fn banner(&self) -> Option<String> {
        if self.cancelled {
            Some(format!(
                "upload cancelled: {}/{} uploaded successfully",
                self.succeeded, self.attempted
            ))
        } else if self.all_succeeded() {
            None
        } else {
            Some(format!(
                "{}/{} uploaded successfully; check individual rows",
                self.succeeded, self.attempted
            ))
        }
    }
}

/// Clears the in-progress flag and the published index when a run ends,
/// however it ends.
struct RunGuard<'a>(&'a UploadOrchestrator);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.set_current_index(None);
        self.0.running.store(false, Ordering::Release);
    }
}

/// Marks a claimed row as failed if its dispatch never reports back, so no
/// row is left in `uploading`.
struct InFlight<'a> {
    store: &'a SharedRowStore,
    row_id: &'a str,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, status: RowStatus) {
        self.store.set_status(self.row_id, status);
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.store
                .set_status(self.row_id, RowStatus::error(INTERRUPTED_MESSAGE));
        }
    }
}

/// Drives draft rows through the creation API one at a time.
pub struct UploadOrchestrator {
    store: SharedRowStore,
    creator: Arc<dyn ProductCreator>,
    settings: UploadSettings,
    progress: UploadProgressBroadcaster,
    cancel: CancelHandle,
    running: AtomicBool,
    current_index: Mutex<Option<usize>>,
    run_error: Mutex<Option<String>>,
}

impl UploadOrchestrator {
    pub fn new(
        store: SharedRowStore,
        creator: Arc<dyn ProductCreator>,
        settings: UploadSettings,
    ) -> Self {
        let progress = UploadProgressBroadcaster::new(settings.progress_capacity);
        Self {
            store,
            creator,
            settings,
            progress,
            cancel: CancelHandle::new(),
            running: AtomicBool::new(false),
            current_index: Mutex::new(None),
            run_error: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &SharedRowStore {
        &self.store
    }

    pub fn progress(&self) -> &UploadProgressBroadcaster {
        &self.progress
    }

    /// Handle that aborts the run currently in flight.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Candidate index being processed right now, if a run is active.
    pub fn current_index(&self) -> Option<usize> {
        *self.current_index.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run-level message from the last run: "no valid rows", the partial
    /// summary, or the cancellation notice. Cleared by a fully successful run.
    pub fn run_error(&self) -> Option<String> {
        self.run_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_current_index(&self, index: Option<usize>) {
        *self.current_index.lock().unwrap_or_else(|e| e.into_inner()) = index;
    }

    fn set_run_error(&self, message: Option<String>) {
        *self.run_error.lock().unwrap_or_else(|e| e.into_inner()) = message;
    }

    /// Uploads every candidate row, in store order, one request at a time.
    ///
    /// Row failures become row state; the only errors returned are
    /// [`RunError::NoValidRows`] and [`RunError::AlreadyRunning`].
    #[tracing::instrument(name = "upload_all", skip_all)]
    pub async fn upload_all(&self) -> Result<RunSummary, RunError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Upload requested while another run is in progress");
            return Err(RunError::AlreadyRunning);
        }
        let _guard = RunGuard(self);
        self.cancel.clear();

        let candidates = self.store.candidates();
        if candidates.is_empty() {
            warn!("Upload requested but no row has name, price and SKU");
            self.set_run_error(Some(RunError::NoValidRows.to_string()));
            return Err(RunError::NoValidRows);
        }

        let tracker = self.progress.start_run(&uuid::Uuid::new_v4().to_string());
        info!(
            "Starting upload run {} with {} candidate(s)",
            tracker.run_id(),
            candidates.len()
        );
        tracker.report(UploadPhase::RunStarted {
            candidates: candidates.len(),
        });

        let summary = self.process_candidates(&candidates, &tracker).await;
        self.set_current_index(None);

        info!(
            "Upload run {} finished: {}/{} succeeded{}",
            tracker.run_id(),
            summary.succeeded,
            summary.attempted,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        tracker.report(UploadPhase::RunFinished { summary });

        if summary.all_succeeded() {
            self.set_run_error(None);
            tokio::time::sleep(self.settings.completion_delay).await;
            self.store.reset(self.settings.initial_rows);
            tracker.report(UploadPhase::StoreReset {
                rows: self.settings.initial_rows,
            });
        } else {
            self.set_run_error(summary.banner());
        }

        Ok(summary)
    }

    async fn process_candidates(
        &self,
        candidates: &[Candidate],
        tracker: &RunTracker,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut pacer = Pacer::new(&self.settings);

        for (position, candidate) in candidates.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let row_id = candidate.record.id();
            self.set_current_index(Some(candidate.index));
            tracker.report(UploadPhase::Processing {
                index: candidate.index,
                row_id: row_id.to_string(),
            });

            let Some(outcome) = self.process_row(row_id).await else {
                debug!("Row {} was deleted before its turn, skipping", row_id);
                continue;
            };
            summary.attempted += 1;
            if outcome == PaceOutcome::Created {
                summary.succeeded += 1;
            }
            pacer.record(outcome);

            if let Some(row) = self.store.get(row_id) {
                tracker.report(UploadPhase::RowFinished {
                    index: candidate.index,
                    row_id: row_id.to_string(),
                    status: row.status().clone(),
                });
            }

            let is_last = position + 1 == candidates.len();
            if !is_last && !pacer.wait(&self.cancel).await {
                summary.cancelled = true;
                break;
            }
        }

        if self.cancel.is_cancelled() && summary.attempted < candidates.len() {
            summary.cancelled = true;
        }
        summary
    }

    /// Validates and dispatches one row. `None` if the row no longer exists.
    async fn process_row(&self, row_id: &str) -> Option<PaceOutcome> {
        let record = match self.store.begin_dispatch(row_id)? {
            Ok(record) => record,
            Err(e) => {
                debug!("Row {} failed validation: {}", row_id, e);
                return Some(PaceOutcome::Skipped);
            }
        };

        let in_flight = InFlight {
            store: &self.store,
            row_id,
            settled: false,
        };
        let request = CreateProductRequest::from_record(&record);

        match self.creator.create_product(&request).await {
            Ok(created) => {
                info!(
                    "Created product sku={} row={} id={:?}",
                    request.sku, row_id, created.id
                );
                in_flight.settle(RowStatus::Success);
                Some(PaceOutcome::Created)
            }
            Err(e) => {
                warn!("Product sku={} row={} failed: {}", request.sku, row_id, e);
                in_flight.settle(RowStatus::error(e.row_message()));
                Some(PaceOutcome::DispatchFailed)
            }
        }
    }
}
