use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{EmployeeId, SessionId};

/// Task label used when a session is started without a description.
pub const DEFAULT_TASK_DESCRIPTION: &str = "Work Session";

/// A paused interval within a session. An entry without a `resume_time`
/// means the session is currently paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEntry {
    pub pause_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_time: Option<DateTime<Utc>>,
}

/// A free-text note logged against an open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

/// Lifecycle state derived from `end_time` and `is_active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Paused,
    Closed,
}

/// One continuous tracking attempt for one employee.
///
/// At most one open session (`end_time` absent) may exist per employee;
/// the tracker service serializes transitions to uphold that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSession {
    pub id: SessionId,
    pub employee_id: EmployeeId,
    pub task_description: String,
    /// Calendar date bucket in the reference timezone, fixed at start.
    pub work_day: NaiveDate,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub breaks: Vec<BreakEntry>,
    /// Accumulated active (non-paused) time, checkpointed on pause and stop.
    pub total_elapsed_ms: i64,
    pub is_active: bool,
    pub activities: Vec<ActivityEntry>,
    /// Advisory flag set at start when outside the configured work hours.
    pub outside_work_hours: bool,
    /// Elapsed time the client reported on stop, kept for audit only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_reported_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TimeSession {
    pub fn begin(
        employee_id: EmployeeId,
        task_description: Option<String>,
        started_at: DateTime<Utc>,
        work_day: NaiveDate,
        outside_work_hours: bool,
    ) -> Self {
        let task_description = task_description
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TASK_DESCRIPTION.to_string());

        Self {
            id: SessionId::generate(),
            employee_id,
            task_description,
            work_day,
            start_time: started_at,
            end_time: None,
            breaks: Vec::new(),
            total_elapsed_ms: 0,
            is_active: true,
            activities: Vec::new(),
            outside_work_hours,
            client_reported_ms: None,
            created_at: started_at,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.end_time.is_some() {
            SessionState::Closed
        } else if self.is_active {
            SessionState::Active
        } else {
            SessionState::Paused
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Instant the current active stretch began: the last resume, or the
    /// session start if it has never been paused.
    fn last_resume_time(&self) -> DateTime<Utc> {
        self.breaks
            .last()
            .and_then(|b| b.resume_time)
            .unwrap_or(self.start_time)
    }

    /// Add the active stretch since the last resume/start to the
    /// accumulated total. Negative intervals from clock skew clamp to zero.
    fn checkpoint(&mut self, now: DateTime<Utc>) {
        let since = self.last_resume_time();
        self.total_elapsed_ms += (now - since).num_milliseconds().max(0);
    }

    /// Record a pause. Caller must have verified the session is active.
    pub fn record_pause(&mut self, now: DateTime<Utc>) {
        self.checkpoint(now);
        self.breaks.push(BreakEntry {
            pause_time: now,
            resume_time: None,
        });
        self.is_active = false;
    }

    /// Close the open break. Caller must have verified the session is paused.
    pub fn record_resume(&mut self, now: DateTime<Utc>) {
        if let Some(open_break) = self.breaks.last_mut().filter(|b| b.resume_time.is_none()) {
            open_break.resume_time = Some(now);
        }
        self.is_active = true;
    }

    /// Close the session. Checkpoints the in-flight stretch when active;
    /// no synthetic break record is pushed.
    pub fn record_stop(&mut self, now: DateTime<Utc>) {
        if self.is_active {
            self.checkpoint(now);
        }
        self.end_time = Some(now);
        self.is_active = false;
    }

    pub fn record_activity(&mut self, now: DateTime<Utc>, note: String) {
        self.activities.push(ActivityEntry {
            timestamp: now,
            note,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn session_at(start: DateTime<Utc>) -> TimeSession {
        TimeSession::begin(
            EmployeeId::new(7),
            Some("Ticket triage".into()),
            start,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            false,
        )
    }

    #[test]
    fn begin_defaults_blank_task_description() {
        let s = TimeSession::begin(
            EmployeeId::new(1),
            Some("   ".into()),
            at(9, 0),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            false,
        );
        assert_eq!(s.task_description, DEFAULT_TASK_DESCRIPTION);
        assert_eq!(s.state(), SessionState::Active);
        assert_eq!(s.total_elapsed_ms, 0);
    }

    #[test]
    fn pause_checkpoints_elapsed_and_opens_break() {
        let mut s = session_at(at(9, 0));
        s.record_pause(at(9, 30));

        assert_eq!(s.total_elapsed_ms, 30 * 60 * 1000);
        assert_eq!(s.state(), SessionState::Paused);
        assert_eq!(s.breaks.len(), 1);
        assert!(s.breaks[0].resume_time.is_none());
    }

    #[test]
    fn paused_interval_is_excluded_from_total() {
        let mut s = session_at(at(9, 0));
        s.record_pause(at(9, 30));
        s.record_resume(at(9, 45));
        s.record_stop(at(17, 45));

        // 30 min before the break plus 8h after it, the 15 min break excluded.
        assert_eq!(s.total_elapsed_ms, 30_600_000);
        assert_eq!(s.state(), SessionState::Closed);
        assert_eq!(s.breaks[0].resume_time, Some(at(9, 45)));
    }

    #[test]
    fn stop_while_paused_keeps_checkpointed_total() {
        let mut s = session_at(at(9, 0));
        s.record_pause(at(10, 0));
        let checkpointed = s.total_elapsed_ms;
        s.record_stop(at(12, 0));

        assert_eq!(s.total_elapsed_ms, checkpointed);
        // Stop does not push a synthetic break.
        assert_eq!(s.breaks.len(), 1);
    }

    #[test]
    fn skewed_clock_clamps_to_zero_elapsed() {
        let mut s = session_at(at(9, 0));
        s.record_pause(at(8, 0));
        assert_eq!(s.total_elapsed_ms, 0);
    }

    #[test]
    fn wire_shape_is_camel_case_and_omits_absent_fields() {
        let mut s = session_at(at(9, 0));
        s.record_pause(at(9, 30));

        let value = serde_json::to_value(&s).unwrap();
        assert!(value.get("employeeId").is_some());
        assert!(value.get("totalElapsedMs").is_some());
        assert!(value.get("workDay").is_some());
        // Open session: no endTime key at all.
        assert!(value.get("endTime").is_none());
        assert!(value["breaks"][0].get("resumeTime").is_none());
    }

    #[test]
    fn total_never_decreases_across_transitions() {
        let mut s = session_at(at(9, 0));
        s.record_pause(at(9, 20));
        let after_pause = s.total_elapsed_ms;
        s.record_resume(at(9, 25));
        s.record_stop(at(9, 40));
        assert!(s.total_elapsed_ms >= after_pause);
    }
}
