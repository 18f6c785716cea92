//! The reservation entity and its display ordering.

use crate::model::{FormParams, JobModel};

/// One pending scheduled build.
///
/// `run_time` and `form_params` are fixed when the reservation is created;
/// later changes to the job's parameter definitions do not affect it. The
/// armed timer is scheduler-internal state and is not part of this model.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReservationJobModel {
    pub id: uuid::Uuid,
    pub job: JobModel,
    /// Absolute fire time, computed once at schedule time.
    pub run_time: chrono::DateTime<chrono::Utc>,
    pub form_params: FormParams,
}

impl ReservationJobModel {
    pub(crate) fn new(
        job: JobModel,
        run_time: chrono::DateTime<chrono::Utc>,
        form_params: FormParams,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            job,
            run_time,
            form_params,
        }
    }
}

/// How the pending set is ordered for display.
///
/// A presentation toggle, not a scheduler invariant: the pending set itself
/// is kept in insertion order until an entry retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DisplayOrder {
    /// Insertion (schedule) order.
    Scheduled,
    /// Latest `run_time` first.
    RunTimeDesc,
}
