//! Draft rows and their ordered store.

pub mod record;
pub mod store;

pub use record::{DraftField, DraftRecord, ImageRef, ProductType, RowStatus};
pub use store::{Candidate, EditOutcome, RowStore, SharedRowStore, DEFAULT_ROW_COUNT};
