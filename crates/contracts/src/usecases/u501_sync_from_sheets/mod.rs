pub mod progress;
pub mod response;

pub use progress::{SyncRunProgress, SyncRunStatus};
pub use response::{SyncFailureResponse, SyncResponse, UnauthorizedResponse};
