use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc,
    Weekday,
};
use chrono_tz::Tz;

use super::models::Period;

/// Reference-timezone clock for work-day bucketing.
///
/// All day boundaries and period ranges are resolved in the configured
/// zone (DST included via the chrono-tz tables), then expressed as UTC
/// instants for querying. The work-hours window is advisory only.
#[derive(Debug, Clone)]
pub struct WorkClock {
    tz: Tz,
    work_start_hour: u32,
    work_end_hour: u32,
}

impl Default for WorkClock {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
            work_start_hour: 6,
            work_end_hour: 23,
        }
    }
}

impl WorkClock {
    pub fn new(tz: Tz, work_start_hour: u32, work_end_hour: u32) -> Self {
        Self {
            tz,
            work_start_hour,
            work_end_hour,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Calendar date an instant falls on in the reference zone. This is
    /// the day-bucket key, assigned once at session start.
    pub fn work_day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.work_day_of(self.now())
    }

    /// Advisory check against the configured work-hours window. Sessions
    /// started outside it are flagged, never blocked.
    pub fn is_within_work_hours(&self, instant: DateTime<Utc>) -> bool {
        let hour = instant.with_timezone(&self.tz).hour();
        hour >= self.work_start_hour && hour < self.work_end_hour
    }

    /// UTC instant of the reference-zone midnight starting `date`. A DST
    /// gap at midnight resolves to the first representable local time.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let mut local = date.and_time(NaiveTime::MIN);
        loop {
            match self.tz.from_local_datetime(&local) {
                LocalResult::Single(dt) => return dt.with_timezone(&Utc),
                LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
                LocalResult::None => local += Duration::hours(1),
            }
        }
    }

    /// Resolve a reporting period to a half-open UTC range `[start, end)`
    /// relative to `now`. `Lifetime` has no range.
    pub fn period_range(
        &self,
        period: Period,
        now: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = self.work_day_of(now);

        let (first, last) = match period {
            Period::Today => (today, today),
            Period::CurrentWeek => {
                let week = today.week(Weekday::Mon);
                (week.first_day(), week.last_day())
            }
            Period::ThisMonth => month_bounds(today.year(), today.month())?,
            Period::PastMonth => {
                let (year, month) = if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                month_bounds(year, month)?
            }
            Period::ThisYear => year_bounds(today.year())?,
            Period::PastYear => year_bounds(today.year() - 1)?,
            Period::Lifetime => return None,
        };

        Some((
            self.day_start(first),
            self.day_start(last + Duration::days(1)),
        ))
    }
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next - Duration::days(1)))
}

fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}
