use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::domain::{
    clock::WorkClock,
    models::{EmployeeId, SessionState, TimeSession},
    ports::outbound::SessionStore,
    TimeTrackingError,
};

/// Divergence between server-accumulated and client-reported elapsed time
/// above which a warning is logged.
const CLIENT_ELAPSED_TOLERANCE_MS: i64 = 60_000;

/// The session state machine: enforces the single legal path
/// `idle -> active -> [paused -> active]* -> stopped`, per employee.
///
/// Every transition is a check-then-write against the store, executed
/// under a per-employee lock so concurrent transitions for the same
/// employee never interleave. Different employees never contend.
pub struct SessionTracker {
    store: Arc<dyn SessionStore>,
    clock: WorkClock,
    locks: Mutex<HashMap<EmployeeId, Arc<Mutex<()>>>>,
}

impl SessionTracker {
    pub fn new(store: Arc<dyn SessionStore>, clock: WorkClock) -> Self {
        Self {
            store,
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn employee_lock(&self, employee_id: &EmployeeId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(*employee_id).or_default().clone()
    }

    /// Start a new session. Fails when an open session (active or paused)
    /// already exists for the employee.
    pub async fn start(
        &self,
        employee_id: EmployeeId,
        task_description: Option<String>,
    ) -> Result<TimeSession, TimeTrackingError> {
        let lock = self.employee_lock(&employee_id).await;
        let _guard = lock.lock().await;

        if self.store.find_open(&employee_id).await?.is_some() {
            return Err(TimeTrackingError::SessionConflict);
        }

        let now = self.clock.now();
        let outside_work_hours = !self.clock.is_within_work_hours(now);
        let session = TimeSession::begin(
            employee_id,
            task_description,
            now,
            self.clock.work_day_of(now),
            outside_work_hours,
        );
        self.store.insert(&session).await?;

        if outside_work_hours {
            tracing::warn!(
                employee_id = %employee_id,
                session_id = %session.id,
                "session started outside configured work hours"
            );
        }
        tracing::info!(
            employee_id = %employee_id,
            session_id = %session.id,
            work_day = %session.work_day,
            "session started"
        );
        Ok(session)
    }

    /// Pause the active session: checkpoint elapsed time and open a break.
    pub async fn pause(&self, employee_id: EmployeeId) -> Result<TimeSession, TimeTrackingError> {
        let lock = self.employee_lock(&employee_id).await;
        let _guard = lock.lock().await;

        let mut session = self
            .store
            .find_open(&employee_id)
            .await?
            .filter(|s| s.state() == SessionState::Active)
            .ok_or(TimeTrackingError::NoActiveSession)?;

        session.record_pause(self.clock.now());
        self.store.update(&session).await?;

        tracing::debug!(
            employee_id = %employee_id,
            session_id = %session.id,
            total_elapsed_ms = session.total_elapsed_ms,
            "session paused"
        );
        Ok(session)
    }

    /// Resume the paused session: close the open break.
    pub async fn resume(&self, employee_id: EmployeeId) -> Result<TimeSession, TimeTrackingError> {
        let lock = self.employee_lock(&employee_id).await;
        let _guard = lock.lock().await;

        let mut session = self
            .store
            .find_open(&employee_id)
            .await?
            .filter(|s| s.state() == SessionState::Paused)
            .ok_or(TimeTrackingError::NoPausedSession)?;

        session.record_resume(self.clock.now());
        self.store.update(&session).await?;

        tracing::debug!(
            employee_id = %employee_id,
            session_id = %session.id,
            "session resumed"
        );
        Ok(session)
    }

    /// Stop the open session (active or paused) and close it permanently.
    ///
    /// The server-side accumulation is authoritative. A non-negative
    /// client-reported elapsed value is kept for audit only; a large
    /// divergence is logged.
    pub async fn stop(
        &self,
        employee_id: EmployeeId,
        client_elapsed_ms: Option<i64>,
    ) -> Result<TimeSession, TimeTrackingError> {
        let lock = self.employee_lock(&employee_id).await;
        let _guard = lock.lock().await;

        let mut session = self
            .store
            .find_open(&employee_id)
            .await?
            .ok_or(TimeTrackingError::NoOpenSession)?;

        session.record_stop(self.clock.now());

        if let Some(reported) = client_elapsed_ms.filter(|ms| *ms >= 0) {
            session.client_reported_ms = Some(reported);
            if (reported - session.total_elapsed_ms).abs() > CLIENT_ELAPSED_TOLERANCE_MS {
                tracing::warn!(
                    employee_id = %employee_id,
                    session_id = %session.id,
                    server_ms = session.total_elapsed_ms,
                    client_ms = reported,
                    "client-reported elapsed diverges from server accumulation"
                );
            }
        }

        self.store.update(&session).await?;

        tracing::info!(
            employee_id = %employee_id,
            session_id = %session.id,
            total_elapsed_ms = session.total_elapsed_ms,
            "session stopped"
        );
        Ok(session)
    }

    /// Append a timestamped note to the active session.
    pub async fn log_activity(
        &self,
        employee_id: EmployeeId,
        note: &str,
    ) -> Result<TimeSession, TimeTrackingError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(TimeTrackingError::validation("activity note required"));
        }

        let lock = self.employee_lock(&employee_id).await;
        let _guard = lock.lock().await;

        let mut session = self
            .store
            .find_open(&employee_id)
            .await?
            .filter(|s| s.state() == SessionState::Active)
            .ok_or(TimeTrackingError::NoActiveSession)?;

        session.record_activity(self.clock.now(), note.to_string());
        self.store.update(&session).await?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::outbound::MockSessionStore;

    fn tracker() -> (SessionTracker, MockSessionStore) {
        let store = MockSessionStore::new();
        let tracker = SessionTracker::new(Arc::new(store.clone()), WorkClock::default());
        (tracker, store)
    }

    fn employee(id: i32) -> EmployeeId {
        EmployeeId::new(id)
    }

    #[tokio::test]
    async fn start_creates_an_active_session_bucketed_to_today() {
        let (tracker, store) = tracker();
        let session = tracker.start(employee(1), None).await.unwrap();

        assert!(session.is_active);
        assert_eq!(session.work_day, WorkClock::default().today());
        assert_eq!(session.total_elapsed_ms, 0);
        assert!(session.breaks.is_empty());
        assert_eq!(store.open_count(&employee(1)), 1);
    }

    #[tokio::test]
    async fn second_start_conflicts_and_keeps_one_open_session() {
        let (tracker, store) = tracker();
        tracker.start(employee(1), None).await.unwrap();

        let err = tracker.start(employee(1), None).await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::SessionConflict));
        assert_eq!(store.open_count(&employee(1)), 1);
    }

    #[tokio::test]
    async fn start_while_paused_still_conflicts() {
        let (tracker, _) = tracker();
        tracker.start(employee(1), None).await.unwrap();
        tracker.pause(employee(1)).await.unwrap();

        let err = tracker.start(employee(1), None).await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::SessionConflict));
    }

    #[tokio::test]
    async fn employees_track_independently() {
        let (tracker, store) = tracker();
        tracker.start(employee(1), None).await.unwrap();
        tracker.start(employee(2), None).await.unwrap();

        assert_eq!(store.open_count(&employee(1)), 1);
        assert_eq!(store.open_count(&employee(2)), 1);
    }

    #[tokio::test]
    async fn pause_without_a_session_is_not_found() {
        let (tracker, _) = tracker();
        let err = tracker.pause(employee(1)).await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::NoActiveSession));
    }

    #[tokio::test]
    async fn pause_resume_stop_walk_the_legal_path() {
        let (tracker, _) = tracker();
        tracker.start(employee(1), Some("Payroll run".into())).await.unwrap();

        let paused = tracker.pause(employee(1)).await.unwrap();
        assert_eq!(paused.state(), SessionState::Paused);
        assert_eq!(paused.breaks.len(), 1);
        assert!(paused.breaks[0].resume_time.is_none());

        // Pausing twice is illegal.
        let err = tracker.pause(employee(1)).await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::NoActiveSession));

        let resumed = tracker.resume(employee(1)).await.unwrap();
        assert_eq!(resumed.state(), SessionState::Active);
        let resume_time = resumed.breaks[0].resume_time.unwrap();
        assert!(resume_time >= resumed.breaks[0].pause_time);

        let stopped = tracker.stop(employee(1), None).await.unwrap();
        assert_eq!(stopped.state(), SessionState::Closed);
        assert!(stopped.end_time.is_some());
        // Stop does not push a break record.
        assert_eq!(stopped.breaks.len(), 1);
    }

    #[tokio::test]
    async fn resume_requires_a_paused_session() {
        let (tracker, _) = tracker();
        tracker.start(employee(1), None).await.unwrap();

        let err = tracker.resume(employee(1)).await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::NoPausedSession));
    }

    #[tokio::test]
    async fn stop_while_paused_closes_the_session() {
        let (tracker, store) = tracker();
        tracker.start(employee(1), None).await.unwrap();
        let paused = tracker.pause(employee(1)).await.unwrap();

        let stopped = tracker.stop(employee(1), None).await.unwrap();
        assert_eq!(stopped.state(), SessionState::Closed);
        assert!(stopped.total_elapsed_ms >= paused.total_elapsed_ms);
        assert_eq!(store.open_count(&employee(1)), 0);
    }

    #[tokio::test]
    async fn stop_without_a_session_is_not_found() {
        let (tracker, _) = tracker();
        let err = tracker.stop(employee(1), None).await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::NoOpenSession));
    }

    #[tokio::test]
    async fn client_reported_elapsed_never_overrides_the_server_total() {
        let (tracker, _) = tracker();
        tracker.start(employee(1), None).await.unwrap();

        let stopped = tracker.stop(employee(1), Some(999_000_000)).await.unwrap();
        assert_eq!(stopped.client_reported_ms, Some(999_000_000));
        // The session lived only microseconds; the reported value must not
        // have replaced the accumulation.
        assert!(stopped.total_elapsed_ms < 60_000);
    }

    #[tokio::test]
    async fn negative_client_elapsed_is_ignored() {
        let (tracker, _) = tracker();
        tracker.start(employee(1), None).await.unwrap();

        let stopped = tracker.stop(employee(1), Some(-5)).await.unwrap();
        assert_eq!(stopped.client_reported_ms, None);
    }

    #[tokio::test]
    async fn activity_requires_a_note_and_an_active_session() {
        let (tracker, _) = tracker();

        let err = tracker.log_activity(employee(1), "  ").await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::Validation(_)));

        let err = tracker.log_activity(employee(1), "standup").await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::NoActiveSession));

        tracker.start(employee(1), None).await.unwrap();
        tracker.pause(employee(1)).await.unwrap();
        let err = tracker.log_activity(employee(1), "standup").await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::NoActiveSession));

        tracker.resume(employee(1)).await.unwrap();
        let session = tracker.log_activity(employee(1), "standup").await.unwrap();
        assert_eq!(session.activities.len(), 1);
        assert_eq!(session.activities[0].note, "standup");
    }

    #[tokio::test]
    async fn concurrent_starts_admit_exactly_one_session() {
        let (tracker, store) = tracker();
        let tracker = Arc::new(tracker);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                tracker.start(employee(1), None).await
            }));
        }

        let mut started = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                started += 1;
            }
        }
        assert_eq!(started, 1);
        assert_eq!(store.open_count(&employee(1)), 1);
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_errors() {
        let (tracker, store) = tracker();
        store.fail_all();

        let err = tracker.start(employee(1), None).await.unwrap_err();
        assert!(matches!(err, TimeTrackingError::Store(_)));
    }
}
