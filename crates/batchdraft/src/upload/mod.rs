//! Bulk upload orchestration.

pub mod cancel;
pub mod pacing;
pub mod progress;
pub mod runner;

pub use cancel::CancelHandle;
pub use pacing::{PaceOutcome, Pacer};
pub use progress::{RunTracker, UploadPhase, UploadProgressBroadcaster, UploadProgressEvent};
pub use runner::{RunSummary, UploadOrchestrator, INTERRUPTED_MESSAGE};
