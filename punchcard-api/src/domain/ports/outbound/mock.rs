//! Mock session store for testing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::{
    models::{EmployeeId, SessionId, TimeSession},
    TimeTrackingError,
};

use super::SessionStore;

/// In-memory session store backed by a HashMap.
#[derive(Clone, Default)]
pub struct MockSessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, TimeSession>>>,
    /// When set, every call fails with a store error.
    fail: Arc<RwLock<bool>>,
}

#[allow(dead_code)]
impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing sessions.
    pub fn with_sessions(self, sessions: Vec<TimeSession>) -> Self {
        {
            let mut map = self.sessions.write().unwrap();
            for session in sessions {
                map.insert(session.id, session);
            }
        }
        self
    }

    /// Make every subsequent call fail, to exercise error propagation.
    pub fn fail_all(&self) {
        *self.fail.write().unwrap() = true;
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }

    /// Fetch a session by id (for test assertions).
    pub fn get(&self, id: &SessionId) -> Option<TimeSession> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    /// Count of open sessions for one employee (for invariant assertions).
    pub fn open_count(&self, employee_id: &EmployeeId) -> usize {
        self.sessions
            .read()
            .unwrap()
            .values()
            .filter(|s| s.employee_id == *employee_id && s.is_open())
            .count()
    }

    fn check_failure(&self) -> Result<(), TimeTrackingError> {
        if *self.fail.read().unwrap() {
            Err(TimeTrackingError::store("mock store failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn insert(&self, session: &TimeSession) -> Result<(), TimeTrackingError> {
        self.check_failure()?;
        self.sessions
            .write()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn update(&self, session: &TimeSession) -> Result<(), TimeTrackingError> {
        self.check_failure()?;
        self.sessions
            .write()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn find_open(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<TimeSession>, TimeTrackingError> {
        self.check_failure()?;
        Ok(self
            .sessions
            .read()
            .unwrap()
            .values()
            .find(|s| s.employee_id == *employee_id && s.is_open())
            .cloned())
    }

    async fn list_range(
        &self,
        employee_id: &EmployeeId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeSession>, TimeTrackingError> {
        self.check_failure()?;
        let mut sessions: Vec<TimeSession> = self
            .sessions
            .read()
            .unwrap()
            .values()
            .filter(|s| s.employee_id == *employee_id)
            .filter(|s| from.map_or(true, |f| s.start_time >= f))
            .filter(|s| to.map_or(true, |t| s.start_time < t))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }

    async fn list_by_work_day(
        &self,
        employee_id: &EmployeeId,
        work_day: NaiveDate,
    ) -> Result<Vec<TimeSession>, TimeTrackingError> {
        self.check_failure()?;
        Ok(self
            .sessions
            .read()
            .unwrap()
            .values()
            .filter(|s| s.employee_id == *employee_id && s.work_day == work_day)
            .cloned()
            .collect())
    }

    async fn list_by_work_day_all(
        &self,
        work_day: NaiveDate,
    ) -> Result<Vec<TimeSession>, TimeTrackingError> {
        self.check_failure()?;
        Ok(self
            .sessions
            .read()
            .unwrap()
            .values()
            .filter(|s| s.work_day == work_day)
            .cloned()
            .collect())
    }
}
