use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{EmployeeId, TimeSession};

/// Daily threshold above which tracked time counts as overtime.
pub const OVERTIME_THRESHOLD_MS: i64 = 8 * 60 * 60 * 1000;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Split a day total into its regular and overtime parts.
pub fn split_overtime(total_ms: i64) -> (i64, i64) {
    let regular = total_ms.min(OVERTIME_THRESHOLD_MS);
    let overtime = (total_ms - OVERTIME_THRESHOLD_MS).max(0);
    (regular, overtime)
}

/// Reporting period for the analytics endpoint. Weeks start on Monday.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    CurrentWeek,
    ThisMonth,
    PastMonth,
    ThisYear,
    PastYear,
    Lifetime,
}

/// Aggregate over all sessions sharing a work day, for one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub work_day: NaiveDate,
    pub total_ms: i64,
    pub hours: f64,
    pub regular_ms: i64,
    pub overtime_ms: i64,
    pub overtime_hours: f64,
    pub session_count: usize,
    pub sessions: Vec<TimeSession>,
}

impl DaySummary {
    pub fn compute(work_day: NaiveDate, sessions: Vec<TimeSession>) -> Self {
        let total_ms: i64 = sessions.iter().map(|s| s.total_elapsed_ms).sum();
        let (regular_ms, overtime_ms) = split_overtime(total_ms);

        Self {
            work_day,
            total_ms,
            hours: total_ms as f64 / MS_PER_HOUR,
            regular_ms,
            overtime_ms,
            overtime_hours: overtime_ms as f64 / MS_PER_HOUR,
            session_count: sessions.len(),
            sessions,
        }
    }
}

/// One work-day bucket of a period's daily breakdown, chart-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    pub total_ms: i64,
    pub session_count: usize,
    pub overtime_ms: i64,
}

/// Aggregate over an arbitrary reporting period, for one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<DateTime<Utc>>,
    pub total_ms: i64,
    pub total_hours: f64,
    pub session_count: usize,
    pub work_day_count: usize,
    pub longest_session_ms: i64,
    pub shortest_session_ms: i64,
    pub average_per_session_ms: i64,
    pub average_per_day_ms: i64,
    /// Overtime summed per work day at the daily threshold.
    pub overtime_ms: i64,
    pub overtime_hours: f64,
    pub daily_breakdown: Vec<DayBucket>,
}

impl PeriodSummary {
    pub fn compute(
        period: Period,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        sessions: &[TimeSession],
    ) -> Self {
        let total_ms: i64 = sessions.iter().map(|s| s.total_elapsed_ms).sum();
        let longest_session_ms = sessions
            .iter()
            .map(|s| s.total_elapsed_ms)
            .max()
            .unwrap_or(0);
        let shortest_session_ms = sessions
            .iter()
            .map(|s| s.total_elapsed_ms)
            .filter(|ms| *ms > 0)
            .min()
            .unwrap_or(0);

        // Bucket by work day; BTreeMap keeps the breakdown date-sorted.
        let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
        for session in sessions {
            let bucket = buckets.entry(session.work_day).or_insert(DayBucket {
                date: session.work_day,
                total_ms: 0,
                session_count: 0,
                overtime_ms: 0,
            });
            bucket.total_ms += session.total_elapsed_ms;
            bucket.session_count += 1;
        }
        for bucket in buckets.values_mut() {
            let (_, overtime) = split_overtime(bucket.total_ms);
            bucket.overtime_ms = overtime;
        }

        let work_day_count = buckets.len();
        let overtime_ms: i64 = buckets.values().map(|b| b.overtime_ms).sum();
        let average_per_session_ms = if sessions.is_empty() {
            0
        } else {
            total_ms / sessions.len() as i64
        };
        let average_per_day_ms = if work_day_count == 0 {
            0
        } else {
            total_ms / work_day_count as i64
        };

        Self {
            period,
            period_start: range.map(|(start, _)| start),
            period_end: range.map(|(_, end)| end),
            total_ms,
            total_hours: total_ms as f64 / MS_PER_HOUR,
            session_count: sessions.len(),
            work_day_count,
            longest_session_ms,
            shortest_session_ms,
            average_per_session_ms,
            average_per_day_ms,
            overtime_ms,
            overtime_hours: overtime_ms as f64 / MS_PER_HOUR,
            daily_breakdown: buckets.into_values().collect(),
        }
    }
}

/// Snapshot of an open session for the admin day overview. Elapsed time
/// reflects the last checkpoint, not live time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionSnapshot {
    pub employee_id: EmployeeId,
    pub task_description: String,
    pub start_time: DateTime<Utc>,
    pub total_elapsed_ms: i64,
}

impl From<&TimeSession> for ActiveSessionSnapshot {
    fn from(session: &TimeSession) -> Self {
        Self {
            employee_id: session.employee_id,
            task_description: session.task_description.clone(),
            start_time: session.start_time,
            total_elapsed_ms: session.total_elapsed_ms,
        }
    }
}

/// Admin aggregate across all employees for one work day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverview {
    pub work_day: NaiveDate,
    pub active_count: usize,
    pub active_sessions: Vec<ActiveSessionSnapshot>,
    pub total_hours: f64,
    /// Employees whose day total exceeds the overtime threshold.
    pub overtime_employees: usize,
    pub average_session_minutes: f64,
    pub generated_at: DateTime<Utc>,
}

impl DayOverview {
    pub fn compute(
        work_day: NaiveDate,
        sessions: &[TimeSession],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let active_sessions: Vec<ActiveSessionSnapshot> = sessions
            .iter()
            .filter(|s| s.is_open() && s.is_active)
            .map(ActiveSessionSnapshot::from)
            .collect();

        let total_ms: i64 = sessions.iter().map(|s| s.total_elapsed_ms).sum();

        let mut per_employee: BTreeMap<EmployeeId, i64> = BTreeMap::new();
        for session in sessions {
            *per_employee.entry(session.employee_id).or_default() += session.total_elapsed_ms;
        }
        let overtime_employees = per_employee
            .values()
            .filter(|total| **total > OVERTIME_THRESHOLD_MS)
            .count();

        let average_session_minutes = if sessions.is_empty() {
            0.0
        } else {
            total_ms as f64 / 60_000.0 / sessions.len() as f64
        };

        Self {
            work_day,
            active_count: active_sessions.len(),
            active_sessions,
            total_hours: total_ms as f64 / MS_PER_HOUR,
            overtime_employees,
            average_session_minutes,
            generated_at,
        }
    }
}
