//! Retirement log for fired, failed, and cancelled reservations.

/// Final status of a retired reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RunStatus {
    Fired,
    Failed,
    Cancelled,
}

/// A record of one retired reservation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HistoryEntry {
    pub job_name: String,
    /// The run time the reservation was armed for.
    pub run_time: chrono::DateTime<chrono::Utc>,
    pub status: RunStatus,
    /// Failure detail for [`RunStatus::Failed`] entries.
    pub detail: Option<String>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}
