use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::models::{
        DayOverview, DaySummary, EmployeeId, Period, PeriodSummary, TimeSession,
    },
};

use super::{ApiError, EmployeeIdentity};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_session))
        .route("/pause", post(pause_session))
        .route("/resume", post(resume_session))
        .route("/stop", post(stop_session))
        .route("/activity", post(log_activity))
        .route("/sessions", get(list_sessions))
        .route("/summary", get(day_summary_today))
        .route("/summary/:work_day", get(day_summary_for))
        .route("/analytics/:period", get(period_analytics))
        .route("/overview", get(day_overview_today))
        .route("/overview/:work_day", get(day_overview_for))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionPayload {
    task_description: Option<String>,
}

#[instrument(name = "start_session", skip(app_state, body), fields(employee_id = %identity.id))]
async fn start_session(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
    body: Option<Json<StartSessionPayload>>,
) -> Result<(StatusCode, Json<TimeSession>), ApiError> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    let session = app_state
        .tracker
        .start(identity.id, payload.task_description)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(name = "pause_session", skip(app_state), fields(employee_id = %identity.id))]
async fn pause_session(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
) -> Result<Json<TimeSession>, ApiError> {
    let session = app_state.tracker.pause(identity.id).await?;
    Ok(Json(session))
}

#[instrument(name = "resume_session", skip(app_state), fields(employee_id = %identity.id))]
async fn resume_session(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
) -> Result<Json<TimeSession>, ApiError> {
    let session = app_state.tracker.resume(identity.id).await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StopSessionPayload {
    /// Client-side elapsed reading, kept for audit only.
    total_elapsed: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSessionResponse {
    session: TimeSession,
    day_summary: DaySummary,
}

#[instrument(name = "stop_session", skip(app_state, body), fields(employee_id = %identity.id))]
async fn stop_session(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
    body: Option<Json<StopSessionPayload>>,
) -> Result<Json<StopSessionResponse>, ApiError> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    let session = app_state
        .tracker
        .stop(identity.id, payload.total_elapsed)
        .await?;
    let day_summary = app_state
        .reports
        .day_summary(identity.id, Some(session.work_day))
        .await?;
    Ok(Json(StopSessionResponse {
        session,
        day_summary,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    note: String,
}

#[instrument(name = "log_activity", skip(app_state, body), fields(employee_id = %identity.id))]
async fn log_activity(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
    Json(body): Json<ActivityPayload>,
) -> Result<Json<TimeSession>, ApiError> {
    let session = app_state
        .tracker
        .log_activity(identity.id, &body.note)
        .await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsQuery {
    /// YYYY-MM-DD, inclusive.
    start: Option<NaiveDate>,
    /// YYYY-MM-DD, inclusive.
    end: Option<NaiveDate>,
    /// Admins may list another employee's sessions.
    employee_id: Option<i32>,
}

#[instrument(name = "list_sessions", skip(app_state), fields(employee_id = %identity.id))]
async fn list_sessions(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<TimeSession>>, ApiError> {
    let employee_id = match query.employee_id {
        Some(other) if identity.is_admin => EmployeeId::new(other),
        _ => identity.id,
    };

    let sessions = app_state
        .reports
        .list_sessions(employee_id, query.start, query.end)
        .await?;
    Ok(Json(sessions))
}

async fn day_summary_today(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
) -> Result<Json<DaySummary>, ApiError> {
    summarize_day(identity, app_state, None).await
}

async fn day_summary_for(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
    Path(work_day): Path<NaiveDate>,
) -> Result<Json<DaySummary>, ApiError> {
    summarize_day(identity, app_state, Some(work_day)).await
}

#[instrument(name = "day_summary", skip(app_state), fields(employee_id = %identity.id))]
async fn summarize_day(
    identity: EmployeeIdentity,
    app_state: AppState,
    work_day: Option<NaiveDate>,
) -> Result<Json<DaySummary>, ApiError> {
    let summary = app_state.reports.day_summary(identity.id, work_day).await?;
    Ok(Json(summary))
}

#[instrument(name = "period_analytics", skip(app_state), fields(employee_id = %identity.id))]
async fn period_analytics(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<PeriodSummary>, ApiError> {
    let period: Period = period
        .parse()
        .map_err(|_| ApiError::bad_request(format!("unknown period: {period}")))?;
    let summary = app_state.reports.period_summary(identity.id, period).await?;
    Ok(Json(summary))
}

async fn day_overview_today(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
) -> Result<Json<DayOverview>, ApiError> {
    overview_day(identity, app_state, None).await
}

async fn day_overview_for(
    identity: EmployeeIdentity,
    State(app_state): State<AppState>,
    Path(work_day): Path<NaiveDate>,
) -> Result<Json<DayOverview>, ApiError> {
    overview_day(identity, app_state, Some(work_day)).await
}

#[instrument(name = "day_overview", skip(app_state), fields(employee_id = %identity.id))]
async fn overview_day(
    identity: EmployeeIdentity,
    app_state: AppState,
    work_day: Option<NaiveDate>,
) -> Result<Json<DayOverview>, ApiError> {
    if !identity.is_admin {
        return Err(ApiError::forbidden("admin role required"));
    }
    let overview = app_state.reports.day_overview(work_day).await?;
    Ok(Json(overview))
}
