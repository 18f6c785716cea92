//! jenkins-reserve -- reservation scheduling core for a Jenkins IDE integration.
//!
//! This crate holds "build this job with these parameters at this time"
//! requests in memory, fires each one against the connected server when its
//! timer elapses, and supports cancellation, ordered snapshots, and a bounded
//! retirement history for the host's views. Everything is in-process and
//! volatile: reservations do not survive a restart.

pub mod executor;
pub mod model;
pub mod scheduler;

pub use executor::Executor;
pub use model::{FormParams, JobModel};
pub use scheduler::{
    DisplayOrder, HistoryEntry, RefreshListener, ReservationJobModel, ReservationScheduler,
    ReserveError, RunStatus,
};
