//! Upload progress broadcaster for real-time grid updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::draft::RowStatus;
use crate::upload::runner::RunSummary;

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UploadPhase {
    RunStarted {
        candidates: usize,
    },
    /// A candidate is about to be validated and dispatched.
    Processing {
        index: usize,
        row_id: String,
    },
    RowFinished {
        index: usize,
        row_id: String,
        status: RowStatus,
    },
    RunFinished {
        summary: RunSummary,
    },
    /// The grid was cleared after an all-succeeded run.
    StoreReset {
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgressEvent {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub phase: UploadPhase,
}

impl UploadProgressEvent {
    pub fn new(run_id: &str, phase: UploadPhase) -> Self {
        Self {
            run_id: run_id.to_string(),
            timestamp: Utc::now(),
            phase,
        }
    }
}

/// Broadcasts upload progress events to any number of listeners.
#[derive(Clone)]
pub struct UploadProgressBroadcaster {
    sender: Arc<broadcast::Sender<UploadProgressEvent>>,
}

impl UploadProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: UploadProgressEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UploadProgressEvent> {
        self.sender.subscribe()
    }

    /// Returns a tracker that stamps every event with `run_id`.
    pub fn start_run(&self, run_id: &str) -> RunTracker {
        RunTracker {
            run_id: run_id.to_string(),
            sender: Arc::clone(&self.sender),
        }
    }
}

impl Default for UploadProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

pub struct RunTracker {
    run_id: String,
    sender: Arc<broadcast::Sender<UploadProgressEvent>>,
}

impl RunTracker {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn report(&self, phase: UploadPhase) {
        let _ = self
            .sender
            .send(UploadProgressEvent::new(&self.run_id, phase));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_stamps_run_id() {
        let broadcaster = UploadProgressBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();

        let tracker = broadcaster.start_run("run-1");
        tracker.report(UploadPhase::RunStarted { candidates: 3 });
        tracker.report(UploadPhase::Processing {
            index: 0,
            row_id: "row-a".to_string(),
        });

        let first = rx.try_recv().unwrap();
        assert_eq!(first.run_id, "run-1");
        assert_eq!(first.phase, UploadPhase::RunStarted { candidates: 3 });
        let second = rx.try_recv().unwrap();
        assert!(matches!(second.phase, UploadPhase::Processing { index: 0, .. }));
    }

    #[test]
    fn test_send_without_receivers() {
        let broadcaster = UploadProgressBroadcaster::default();
        broadcaster.send(UploadProgressEvent::new(
            "run-2",
            UploadPhase::StoreReset { rows: 5 },
        ));
    }

    #[test]
    fn test_event_json_shape() {
        let event = UploadProgressEvent::new(
            "run-3",
            UploadPhase::RowFinished {
                index: 1,
                row_id: "row-b".to_string(),
                status: RowStatus::error("sku is required"),
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["runId"], "run-3");
        assert_eq!(value["kind"], "row_finished");
        assert_eq!(value["status"]["error"]["message"], "sku is required");
    }
}
