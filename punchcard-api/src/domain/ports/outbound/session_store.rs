use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    models::{EmployeeId, TimeSession},
    TimeTrackingError,
};

/// Outbound port for session persistence.
///
/// The store is the single source of truth for session state; the tracker
/// service serializes transitions per employee on top of it. Range listings
/// are bounded and ordered newest first.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn insert(&self, session: &TimeSession) -> Result<(), TimeTrackingError>;

    async fn update(&self, session: &TimeSession) -> Result<(), TimeTrackingError>;

    /// The employee's open session (active or paused), if any.
    async fn find_open(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<TimeSession>, TimeTrackingError>;

    /// Sessions whose start time falls inside the half-open range
    /// `[from, to)`; either bound may be absent.
    async fn list_range(
        &self,
        employee_id: &EmployeeId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeSession>, TimeTrackingError>;

    async fn list_by_work_day(
        &self,
        employee_id: &EmployeeId,
        work_day: NaiveDate,
    ) -> Result<Vec<TimeSession>, TimeTrackingError>;

    /// All employees' sessions for a work day (admin overview).
    async fn list_by_work_day_all(
        &self,
        work_day: NaiveDate,
    ) -> Result<Vec<TimeSession>, TimeTrackingError>;
}
