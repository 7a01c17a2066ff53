use axum::extract::{Path, State};
use axum::http::StatusCode;

use syllabus_common::{AuditAction, AuditRecord, AuditStatistics, SyllabusId};

use crate::domain::AppState;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::extract::ActingUser;
use crate::infrastructure::http::handlers::PageParams;
use crate::infrastructure::http::handlers::audit::dto::{
    AuditLogResponse, DateRangeParams, RecentParams,
};
use crate::infrastructure::http::querystring::QueryString;

pub mod dto;

const DEFAULT_RECENT_DAYS: i64 = 7;

fn respond(records: Vec<AuditRecord>) -> ApiSuccess<Vec<AuditLogResponse>> {
    ApiSuccess::new(
        StatusCode::OK,
        records.into_iter().map(AuditLogResponse::from).collect(),
    )
}

pub async fn list_audit_logs<S: AppState>(
    State(state): State<S>,
    QueryString(params): QueryString<PageParams>,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    Ok(respond(state.audit().list(params.to_page()).await?))
}

pub async fn my_audit_logs<S: AppState>(
    State(state): State<S>,
    ActingUser(acting): ActingUser,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    Ok(respond(state.audit().logs_by_actor(acting.as_ref()).await?))
}

pub async fn audit_logs_by_syllabus<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    Ok(respond(
        state.audit().logs_by_syllabus(SyllabusId(id)).await?,
    ))
}

pub async fn audit_logs_by_user<S: AppState>(
    Path(username): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    Ok(respond(state.audit().logs_by_actor(&username).await?))
}

pub async fn audit_logs_by_action<S: AppState>(
    Path(action): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    let action = AuditAction::parse(&action);
    Ok(respond(state.audit().logs_by_action(&action).await?))
}

pub async fn audit_logs_by_date_range<S: AppState>(
    State(state): State<S>,
    QueryString(params): QueryString<DateRangeParams>,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    if params.end < params.start {
        return Err(ApiError::UnprocessableEntity(
            "end must not precede start".to_string(),
        ));
    }
    Ok(respond(
        state.audit().logs_in_range(params.start, params.end).await?,
    ))
}

pub async fn recent_audit_logs<S: AppState>(
    State(state): State<S>,
    QueryString(params): QueryString<RecentParams>,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_RECENT_DAYS).max(1);
    Ok(respond(state.audit().recent_logs(days).await?))
}

pub async fn audit_logs_by_academic_year<S: AppState>(
    Path(year): Path<String>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<AuditLogResponse>>, ApiError> {
    Ok(respond(state.audit().logs_by_academic_year(&year).await?))
}

pub async fn audit_statistics<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<AuditStatistics>, ApiError> {
    Ok(ApiSuccess::new(
        StatusCode::OK,
        state.audit().statistics().await?,
    ))
}
