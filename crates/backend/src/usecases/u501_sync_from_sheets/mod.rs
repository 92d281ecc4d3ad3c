pub mod column_mapper;
pub mod error;
pub mod executor;
pub mod progress_tracker;
pub mod row_normalizer;
pub mod sheets_api_client;

pub use error::SyncError;
pub use executor::{SyncExecutor, SyncOutcome, SyncTrigger};
pub use progress_tracker::SyncRunTracker;
