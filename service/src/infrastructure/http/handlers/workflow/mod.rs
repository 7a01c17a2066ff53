use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use syllabus_common::{RequestContext, SyllabusId, SyllabusStatus};

use crate::domain::AppState;
use crate::domain::workflow::TransitionKind;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::extract::{ActingUser, RequestMeta};
use crate::infrastructure::http::handlers::workflow::dto::{
    SyllabusResponse, TransitionRequest, TransitionResponse, WorkflowHistoryResponse,
};

pub mod dto;

pub async fn submit_for_review<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    acting: ActingUser,
    meta: RequestMeta,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    run_transition(state, TransitionKind::Submit, id, acting, meta.0, body).await
}

pub async fn hod_approve<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    acting: ActingUser,
    meta: RequestMeta,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    run_transition(state, TransitionKind::HodApprove, id, acting, meta.0, body).await
}

pub async fn hod_reject<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    acting: ActingUser,
    meta: RequestMeta,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    run_transition(state, TransitionKind::HodReject, id, acting, meta.0, body).await
}

pub async fn aa_approve<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    acting: ActingUser,
    meta: RequestMeta,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    run_transition(state, TransitionKind::AaApprove, id, acting, meta.0, body).await
}

pub async fn aa_reject<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    acting: ActingUser,
    meta: RequestMeta,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    run_transition(state, TransitionKind::AaReject, id, acting, meta.0, body).await
}

pub async fn principal_approve<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    acting: ActingUser,
    meta: RequestMeta,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    run_transition(state, TransitionKind::PrincipalApprove, id, acting, meta.0, body).await
}

pub async fn principal_reject<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    acting: ActingUser,
    meta: RequestMeta,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    run_transition(state, TransitionKind::PrincipalReject, id, acting, meta.0, body).await
}

async fn run_transition<S: AppState>(
    state: S,
    kind: TransitionKind,
    syllabus_id: i64,
    ActingUser(acting): ActingUser,
    context: RequestContext,
    body: Option<Json<TransitionRequest>>,
) -> Result<ApiSuccess<TransitionResponse>, ApiError> {
    let comment = body
        .and_then(|Json(request)| request.comment)
        .filter(|comment| !comment.trim().is_empty());

    let summary = state
        .workflow()
        .execute(kind, SyllabusId(syllabus_id), &acting, comment, context)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        TransitionResponse::from(summary),
    ))
}

pub async fn workflow_history<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<Vec<WorkflowHistoryResponse>>, ApiError> {
    let entries = state.workflow().history(SyllabusId(id)).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        entries.into_iter().map(WorkflowHistoryResponse::from).collect(),
    ))
}

pub async fn syllabi_by_status<S: AppState>(
    Path(status): Path<String>,
    State(state): State<S>,
    ActingUser(acting): ActingUser,
) -> Result<ApiSuccess<Vec<SyllabusResponse>>, ApiError> {
    let status = SyllabusStatus::parse(&status).ok_or_else(|| {
        ApiError::UnprocessableEntity(format!("Unknown syllabus status: {}", status))
    })?;

    let syllabi = state.workflow().syllabi_by_status(status, &acting).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        syllabi.into_iter().map(SyllabusResponse::from).collect(),
    ))
}
