//! Reservation scheduling: the pending set, one timer per reservation, and
//! the firing path against the remote collaborator.

pub mod engine;
pub mod history;
pub mod reservation;

// Re-export common types
pub use self::engine::ReservationScheduler;
pub use self::history::{HistoryEntry, RunStatus};
pub use self::reservation::{DisplayOrder, ReservationJobModel};

use thiserror::Error;

/// Why a firing failed.
#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("no server connection configured")]
    NoExecutor,

    #[error("build request for '{job}' failed: {reason}")]
    BuildRejected { job: String, reason: String },
}

/// Presentation-side refresh hook.
///
/// Invoked after every pending-set mutation (schedule, fire-retirement,
/// cancel) so dependent views can re-render. Must not block; hosts wrap
/// their own fallible refresh machinery.
pub trait RefreshListener: Send + Sync {
    fn refresh(&self);
}
