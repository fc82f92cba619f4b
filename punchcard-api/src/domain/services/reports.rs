use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::domain::{
    clock::WorkClock,
    models::{DayOverview, DaySummary, EmployeeId, Period, PeriodSummary, TimeSession},
    ports::outbound::SessionStore,
    TimeTrackingError,
};

/// Read-side aggregation over persisted sessions.
///
/// Takes no locks: an in-flight open session contributes its last
/// checkpointed elapsed time, which is an accepted staleness bound.
/// Empty result sets yield all-zero summaries, never errors.
pub struct Reports {
    store: Arc<dyn SessionStore>,
    clock: WorkClock,
}

impl Reports {
    pub fn new(store: Arc<dyn SessionStore>, clock: WorkClock) -> Self {
        Self { store, clock }
    }

    /// Regular/overtime split for one employee's work day; defaults to
    /// today in the reference zone.
    pub async fn day_summary(
        &self,
        employee_id: EmployeeId,
        work_day: Option<NaiveDate>,
    ) -> Result<DaySummary, TimeTrackingError> {
        let work_day = work_day.unwrap_or_else(|| self.clock.today());
        let sessions = self.store.list_by_work_day(&employee_id, work_day).await?;
        Ok(DaySummary::compute(work_day, sessions))
    }

    /// Period analytics for one employee; sessions are selected by their
    /// start time falling inside the resolved range.
    pub async fn period_summary(
        &self,
        employee_id: EmployeeId,
        period: Period,
    ) -> Result<PeriodSummary, TimeTrackingError> {
        let range = self.clock.period_range(period, self.clock.now());
        let sessions = match range {
            Some((from, to)) => {
                self.store
                    .list_range(&employee_id, Some(from), Some(to))
                    .await?
            }
            None => self.store.list_range(&employee_id, None, None).await?,
        };
        Ok(PeriodSummary::compute(period, range, &sessions))
    }

    /// One employee's sessions whose start time falls in the given
    /// calendar-date range (both bounds inclusive, reference zone).
    pub async fn list_sessions(
        &self,
        employee_id: EmployeeId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<TimeSession>, TimeTrackingError> {
        let from = from.map(|d| self.clock.day_start(d));
        let to = to.map(|d| self.clock.day_start(d + Duration::days(1)));
        self.store.list_range(&employee_id, from, to).await
    }

    /// Admin aggregate across all employees for a work day; defaults to
    /// today in the reference zone.
    pub async fn day_overview(
        &self,
        work_day: Option<NaiveDate>,
    ) -> Result<DayOverview, TimeTrackingError> {
        let work_day = work_day.unwrap_or_else(|| self.clock.today());
        let sessions = self.store.list_by_work_day_all(work_day).await?;
        Ok(DayOverview::compute(work_day, &sessions, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::outbound::MockSessionStore;
    use chrono::{DateTime, Utc};

    fn closed_session(
        employee: i32,
        started_at: DateTime<Utc>,
        elapsed_ms: i64,
        clock: &WorkClock,
    ) -> TimeSession {
        let mut s = TimeSession::begin(
            EmployeeId::new(employee),
            None,
            started_at,
            clock.work_day_of(started_at),
            false,
        );
        s.total_elapsed_ms = elapsed_ms;
        s.end_time = Some(started_at);
        s.is_active = false;
        s
    }

    fn reports_with(sessions: Vec<TimeSession>) -> Reports {
        let store = MockSessionStore::new().with_sessions(sessions);
        Reports::new(Arc::new(store), WorkClock::default())
    }

    #[tokio::test]
    async fn day_summary_defaults_to_today_and_splits_overtime() {
        let clock = WorkClock::default();
        let now = clock.now();
        let reports = reports_with(vec![
            closed_session(1, now, 6 * 3_600_000, &clock),
            closed_session(1, now, 3 * 3_600_000, &clock),
        ]);

        let summary = reports.day_summary(EmployeeId::new(1), None).await.unwrap();
        assert_eq!(summary.work_day, clock.today());
        assert_eq!(summary.session_count, 2);
        assert_eq!(summary.total_ms, 9 * 3_600_000);
        assert_eq!(summary.overtime_ms, 3_600_000);
    }

    #[tokio::test]
    async fn day_summary_is_idempotent_without_writes() {
        let clock = WorkClock::default();
        let now = clock.now();
        let reports = reports_with(vec![closed_session(1, now, 3_600_000, &clock)]);

        let first = reports.day_summary(EmployeeId::new(1), None).await.unwrap();
        let second = reports.day_summary(EmployeeId::new(1), None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn period_summary_filters_by_start_time() {
        let clock = WorkClock::default();
        let now = clock.now();
        let reports = reports_with(vec![
            closed_session(1, now, 3_600_000, &clock),
            closed_session(1, now - Duration::days(60), 7_200_000, &clock),
        ]);

        let week = reports
            .period_summary(EmployeeId::new(1), Period::CurrentWeek)
            .await
            .unwrap();
        assert_eq!(week.session_count, 1);
        assert_eq!(week.total_ms, 3_600_000);
        assert!(week.period_start.is_some());

        let lifetime = reports
            .period_summary(EmployeeId::new(1), Period::Lifetime)
            .await
            .unwrap();
        assert_eq!(lifetime.session_count, 2);
        assert_eq!(lifetime.total_ms, 10_800_000);
        assert!(lifetime.period_start.is_none());
    }

    #[tokio::test]
    async fn period_summary_of_empty_store_is_zeroed() {
        let reports = reports_with(vec![]);
        let summary = reports
            .period_summary(EmployeeId::new(1), Period::ThisMonth)
            .await
            .unwrap();
        assert_eq!(summary.total_ms, 0);
        assert_eq!(summary.work_day_count, 0);
    }

    #[tokio::test]
    async fn list_sessions_is_newest_first_within_bounds() {
        let clock = WorkClock::default();
        let now = clock.now();
        let reports = reports_with(vec![
            closed_session(1, now - Duration::days(2), 1_000, &clock),
            closed_session(1, now - Duration::days(1), 2_000, &clock),
            closed_session(1, now - Duration::days(30), 3_000, &clock),
        ]);

        let from = clock.work_day_of(now - Duration::days(3));
        let sessions = reports
            .list_sessions(EmployeeId::new(1), Some(from), None)
            .await
            .unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].start_time >= sessions[1].start_time);
    }

    #[tokio::test]
    async fn day_overview_spans_all_employees() {
        let clock = WorkClock::default();
        let now = clock.now();
        let mut open = closed_session(2, now, 1_000, &clock);
        open.end_time = None;
        open.is_active = true;

        let reports = reports_with(vec![
            closed_session(1, now, 9 * 3_600_000, &clock),
            open,
        ]);

        let overview = reports.day_overview(None).await.unwrap();
        assert_eq!(overview.work_day, clock.today());
        assert_eq!(overview.active_count, 1);
        assert_eq!(overview.overtime_employees, 1);
    }
}
