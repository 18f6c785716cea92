//! The reservation scheduler: owns the pending set and fires each entry
//! exactly once when its timer elapses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::executor::Executor;
use crate::model::{FormParams, JobModel};
use crate::scheduler::history::{HistoryEntry, RunStatus};
use crate::scheduler::reservation::{DisplayOrder, ReservationJobModel};
use crate::scheduler::{RefreshListener, ReserveError};

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Schedules job builds for future execution.
///
/// Each `schedule_action` arms an independent one-shot timer; when it elapses
/// the scheduler removes the reservation from the pending set and issues one
/// build call against the collaborator current at fire time. Removal is
/// unconditional: a firing is a one-shot event whether or not the remote call
/// succeeds, and it is never retried.
///
/// Handles are cheap to clone and share state. Dropping the last handle
/// disarms all outstanding timers. Scheduling must happen inside a tokio
/// runtime, since timers are spawned tasks.
#[derive(Clone)]
pub struct ReservationScheduler {
    inner: Arc<Inner>,
}

/// A reservation plus its armed timer. The handle never leaves the scheduler,
/// and every pending entry has exactly one.
struct PendingEntry {
    model: ReservationJobModel,
    timer: tokio::task::JoinHandle<()>,
}

struct Inner {
    pending: Mutex<Vec<PendingEntry>>,
    executor: RwLock<Option<Arc<dyn Executor>>>,
    listeners: Mutex<Vec<Arc<dyn RefreshListener>>>,
    history: Mutex<VecDeque<HistoryEntry>>,
    history_limit: usize,
}

impl Default for ReservationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationScheduler {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Build a scheduler keeping at most `limit` retired entries in history.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: Mutex::new(Vec::new()),
                executor: RwLock::new(None),
                listeners: Mutex::new(Vec::new()),
                history: Mutex::new(VecDeque::new()),
                history_limit: limit,
            }),
        }
    }

    /// Install, replace, or clear the remote-execution collaborator.
    ///
    /// In-flight timers are unaffected; a reservation firing after a swap
    /// uses whatever collaborator is current at fire time.
    pub fn set_executor(&self, executor: Option<Arc<dyn Executor>>) {
        let mut slot = self
            .inner
            .executor
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = executor;
    }

    /// Register a presentation listener, notified after every pending-set
    /// mutation.
    pub fn add_listener(&self, listener: Arc<dyn RefreshListener>) {
        self.inner.listeners_guard().push(listener);
    }

    /// Create a reservation firing `delay` from now and arm its timer.
    ///
    /// Returns a snapshot of the created reservation synchronously; the
    /// remote call happens later, off the caller's path. Range validation of
    /// `delay` is the caller's concern.
    pub fn schedule_action(
        &self,
        job: JobModel,
        delay: Duration,
        form_params: FormParams,
    ) -> ReservationJobModel {
        let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        let run_time = Utc::now() + chrono::Duration::milliseconds(delay_ms);
        // Anchor the timer to schedule time, alongside run_time; a sleep
        // created inside the task would instead start counting at first poll.
        let deadline = tokio::time::Instant::now() + delay;
        let model = ReservationJobModel::new(job, run_time, form_params);
        let id = model.id;

        // The timer task holds only a weak reference, so a dropped scheduler
        // never has live timers resurrecting it.
        let state = Arc::downgrade(&self.inner);

        // The pending lock is taken before the spawn and held across the
        // push: a zero-delay timer elapsing on another worker blocks in the
        // fire routine until its entry is visible, so it can never observe
        // absence and strand the entry.
        {
            let mut pending = self.inner.pending_guard();
            let timer = tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if let Some(inner) = state.upgrade() {
                    Inner::fire(inner, id).await;
                }
            });
            pending.push(PendingEntry {
                model: model.clone(),
                timer,
            });
        }

        info!(job = %model.job.name, run_time = %model.run_time, id = %id, "reservation scheduled");
        self.inner.notify_listeners();
        model
    }

    /// Cancel a pending reservation: disarm its timer and remove it.
    ///
    /// Idempotent. Cancelling an id that already fired, was already
    /// cancelled, or was never scheduled is a no-op returning `false`. After
    /// this returns `true`, the reservation is absent from the pending set
    /// and its fire routine can no longer take effect.
    pub fn cancel_action(&self, id: Uuid) -> bool {
        let entry = {
            let mut pending = self.inner.pending_guard();
            pending
                .iter()
                .position(|entry| entry.model.id == id)
                .map(|pos| pending.remove(pos))
        };

        let Some(entry) = entry else {
            debug!(%id, "cancel requested for unknown or retired reservation");
            return false;
        };

        entry.timer.abort();
        info!(job = %entry.model.job.name, %id, "reservation cancelled");
        self.inner
            .record(&entry.model, RunStatus::Cancelled, None);
        self.inner.notify_listeners();
        true
    }

    /// Snapshot of the pending set in insertion order.
    pub fn reservation_model(&self) -> Vec<ReservationJobModel> {
        self.inner
            .pending_guard()
            .iter()
            .map(|entry| entry.model.clone())
            .collect()
    }

    /// Snapshot of the pending set in the requested display order.
    pub fn display_model(&self, order: DisplayOrder) -> Vec<ReservationJobModel> {
        let mut models = self.reservation_model();
        if order == DisplayOrder::RunTimeDesc {
            models.sort_by(|a, b| b.run_time.cmp(&a.run_time));
        }
        models
    }

    /// Snapshot of the retirement log, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.history_guard().iter().cloned().collect()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.pending_guard().is_empty()
    }
}

impl Inner {
    /// Fire routine, run by a reservation's timer task when it elapses.
    async fn fire(inner: Arc<Inner>, id: Uuid) {
        // Removal is the commit point between fire and cancel: whichever
        // removes the entry first wins, the other observes absence.
        let entry = {
            let mut pending = inner.pending_guard();
            let Some(pos) = pending.iter().position(|entry| entry.model.id == id) else {
                return;
            };
            pending.remove(pos)
        };
        let model = entry.model;

        let executor = inner
            .executor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let outcome = match executor {
            None => Err(ReserveError::NoExecutor),
            Some(executor) => executor
                .build_job_with_parameter(&model.job, &model.form_params)
                .await
                .map_err(|e| ReserveError::BuildRejected {
                    job: model.job.name.clone(),
                    reason: e.to_string(),
                }),
        };

        let (status, detail) = match outcome {
            Ok(()) => {
                info!(job = %model.job.name, id = %id, "reservation fired");
                (RunStatus::Fired, None)
            }
            Err(e) => {
                warn!(job = %model.job.name, id = %id, error = %e, "reservation firing failed");
                (RunStatus::Failed, Some(e.to_string()))
            }
        };

        inner.record(&model, status, detail);
        inner.notify_listeners();
    }

    fn record(&self, model: &ReservationJobModel, status: RunStatus, detail: Option<String>) {
        let mut history = self.history_guard();
        history.push_back(HistoryEntry {
            job_name: model.job.name.clone(),
            run_time: model.run_time,
            status,
            detail,
            finished_at: Utc::now(),
        });
        while history.len() > self.history_limit {
            history.pop_front();
        }
    }

    fn notify_listeners(&self) {
        // Snapshot the listener list so refresh callbacks run unlocked.
        let listeners: Vec<Arc<dyn RefreshListener>> = self.listeners_guard().clone();
        for listener in listeners {
            listener.refresh();
        }
    }

    fn pending_guard(&self) -> MutexGuard<'_, Vec<PendingEntry>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners_guard(&self) -> MutexGuard<'_, Vec<Arc<dyn RefreshListener>>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn history_guard(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Last handle gone: disarm everything so no timer task outlives the
        // scheduler, poisoned or not.
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for entry in pending.drain(..) {
            entry.timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str) -> JobModel {
        JobModel::new(name, format!("http://jenkins/job/{name}/"))
    }

    #[tokio::test(start_paused = true)]
    async fn pending_set_keeps_insertion_order() {
        let scheduler = ReservationScheduler::new();
        scheduler.schedule_action(job("a"), Duration::from_secs(30), FormParams::new());
        scheduler.schedule_action(job("b"), Duration::from_secs(10), FormParams::new());
        scheduler.schedule_action(job("c"), Duration::from_secs(20), FormParams::new());

        let names: Vec<String> = scheduler
            .reservation_model()
            .into_iter()
            .map(|m| m.job.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn display_model_sorts_latest_first() {
        let scheduler = ReservationScheduler::new();
        scheduler.schedule_action(job("early"), Duration::from_secs(10), FormParams::new());
        scheduler.schedule_action(job("late"), Duration::from_secs(300), FormParams::new());

        let sorted = scheduler.display_model(DisplayOrder::RunTimeDesc);
        assert_eq!(sorted[0].job.name, "late");
        assert_eq!(sorted[1].job.name, "early");

        let scheduled = scheduler.display_model(DisplayOrder::Scheduled);
        assert_eq!(scheduled[0].job.name, "early");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_unknown_id_is_a_noop() {
        let scheduler = ReservationScheduler::new();
        let kept = scheduler.schedule_action(job("keep"), Duration::from_secs(60), FormParams::new());

        assert!(!scheduler.cancel_action(Uuid::new_v4()));
        assert_eq!(scheduler.pending_len(), 1);

        assert!(scheduler.cancel_action(kept.id));
        assert!(!scheduler.cancel_action(kept.id));
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn history_is_bounded() {
        let scheduler = ReservationScheduler::with_history_limit(2);
        for i in 0..4 {
            let m = scheduler.schedule_action(
                job(&format!("job-{i}")),
                Duration::from_secs(60),
                FormParams::new(),
            );
            scheduler.cancel_action(m.id);
        }

        let history = scheduler.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].job_name, "job-2");
        assert_eq!(history[1].job_name, "job-3");
    }
}
