//! PostgreSQL implementation of the SessionStore port.
//!
//! Break and activity sequences ride along as JSONB since they are only
//! ever read with their session. A partial unique index on
//! `(employee_id) WHERE end_time IS NULL` backs the single-open-session
//! invariant at the store level.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::domain::{
    models::{ActivityEntry, BreakEntry, EmployeeId, TimeSession},
    ports::outbound::SessionStore,
    TimeTrackingError,
};

use super::repo_error::RepositoryError;

/// Cap on range listings, matching the original service's page bound.
const LIST_LIMIT: i64 = 500;

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    employee_id: i32,
    task_description: String,
    work_day: NaiveDate,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    breaks: Json<Vec<BreakEntry>>,
    total_elapsed_ms: i64,
    is_active: bool,
    activities: Json<Vec<ActivityEntry>>,
    outside_work_hours: bool,
    client_reported_ms: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for TimeSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id.into(),
            employee_id: row.employee_id.into(),
            task_description: row.task_description,
            work_day: row.work_day,
            start_time: row.start_time,
            end_time: row.end_time,
            breaks: row.breaks.0,
            total_elapsed_ms: row.total_elapsed_ms,
            is_active: row.is_active,
            activities: row.activities.0,
            outside_work_hours: row.outside_work_hours,
            client_reported_ms: row.client_reported_ms,
            created_at: row.created_at,
        }
    }
}

const SESSION_COLUMNS: &str = "id, employee_id, task_description, work_day, start_time, end_time, \
     breaks, total_elapsed_ms, is_active, activities, outside_work_hours, \
     client_reported_ms, created_at";

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn insert(&self, session: &TimeSession) -> Result<(), TimeTrackingError> {
        sqlx::query(
            r#"
            INSERT INTO time_sessions (
                id, employee_id, task_description, work_day, start_time, end_time,
                breaks, total_elapsed_ms, is_active, activities, outside_work_hours,
                client_reported_ms, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.employee_id.as_i32())
        .bind(&session.task_description)
        .bind(session.work_day)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(Json(&session.breaks))
        .bind(session.total_elapsed_ms)
        .bind(session.is_active)
        .bind(Json(&session.activities))
        .bind(session.outside_work_hours)
        .bind(session.client_reported_ms)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn update(&self, session: &TimeSession) -> Result<(), TimeTrackingError> {
        // work_day and start_time are fixed at creation and never rewritten.
        let result = sqlx::query(
            r#"
            UPDATE time_sessions
            SET task_description = $2, end_time = $3, breaks = $4,
                total_elapsed_ms = $5, is_active = $6, activities = $7,
                client_reported_ms = $8
            WHERE id = $1
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(&session.task_description)
        .bind(session.end_time)
        .bind(Json(&session.breaks))
        .bind(session.total_elapsed_ms)
        .bind(session.is_active)
        .bind(Json(&session.activities))
        .bind(session.client_reported_ms)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(session.id.to_string()).into());
        }

        Ok(())
    }

    async fn find_open(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<TimeSession>, TimeTrackingError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM time_sessions
            WHERE employee_id = $1 AND end_time IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(employee_id.as_i32())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.map(TimeSession::from))
    }

    async fn list_range(
        &self,
        employee_id: &EmployeeId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeSession>, TimeTrackingError> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM time_sessions
            WHERE employee_id = $1
              AND ($2::timestamptz IS NULL OR start_time >= $2)
              AND ($3::timestamptz IS NULL OR start_time < $3)
            ORDER BY start_time DESC
            LIMIT $4
            "#
        ))
        .bind(employee_id.as_i32())
        .bind(from)
        .bind(to)
        .bind(LIST_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(TimeSession::from).collect())
    }

    async fn list_by_work_day(
        &self,
        employee_id: &EmployeeId,
        work_day: NaiveDate,
    ) -> Result<Vec<TimeSession>, TimeTrackingError> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM time_sessions
            WHERE employee_id = $1 AND work_day = $2
            ORDER BY start_time
            "#
        ))
        .bind(employee_id.as_i32())
        .bind(work_day)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(TimeSession::from).collect())
    }

    async fn list_by_work_day_all(
        &self,
        work_day: NaiveDate,
    ) -> Result<Vec<TimeSession>, TimeTrackingError> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM time_sessions
            WHERE work_day = $1
            ORDER BY start_time
            "#
        ))
        .bind(work_day)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(TimeSession::from).collect())
    }
}
