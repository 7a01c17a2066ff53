//! Narrow inbound contracts for sibling subsystems (comments, PDF
//! storage). They raise events here; fan-out and audit stay in-core.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use syllabus_common::{AuditAction, SyllabusId, Username};

use crate::domain::AppState;
use crate::domain::audit::AuditEntry;
use crate::domain::notification::NotificationEvent;
use crate::infrastructure::http::api::ApiError;
use crate::infrastructure::http::extract::RequestMeta;

#[derive(Debug, Deserialize)]
pub struct CommentAddedEvent {
    pub syllabus_id: i64,
    pub commenter: String,
}

pub async fn comment_added<S: AppState>(
    State(state): State<S>,
    Json(event): Json<CommentAddedEvent>,
) -> Result<StatusCode, ApiError> {
    let commenter = parse_username(&event.commenter)?;
    let syllabus = state
        .workflow()
        .syllabus(SyllabusId(event.syllabus_id))
        .await?;

    state.notifications().comment_added(syllabus, &commenter).await;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct PdfEvent {
    pub syllabus_id: i64,
    pub actor: String,
}

pub async fn pdf_uploaded<S: AppState>(
    State(state): State<S>,
    meta: RequestMeta,
    Json(event): Json<PdfEvent>,
) -> Result<StatusCode, ApiError> {
    record_pdf_event(state, event, meta, AuditAction::UploadPdf).await
}

pub async fn pdf_deleted<S: AppState>(
    State(state): State<S>,
    meta: RequestMeta,
    Json(event): Json<PdfEvent>,
) -> Result<StatusCode, ApiError> {
    record_pdf_event(state, event, meta, AuditAction::DeletePdf).await
}

async fn record_pdf_event<S: AppState>(
    state: S,
    event: PdfEvent,
    RequestMeta(context): RequestMeta,
    action: AuditAction,
) -> Result<StatusCode, ApiError> {
    let actor = parse_username(&event.actor)?;
    let syllabus = state
        .workflow()
        .syllabus(SyllabusId(event.syllabus_id))
        .await?;

    state
        .audit()
        .record(
            AuditEntry {
                syllabus_id: Some(syllabus.id),
                action: action.clone(),
                performed_by: actor.clone(),
                old_status: None,
                new_status: None,
                comments: None,
                changed_fields: None,
                additional_data: None,
            },
            &context,
        )
        .await;

    let notification = match action {
        AuditAction::DeletePdf => NotificationEvent::PdfDeleted {
            syllabus,
            deleted_by: actor.to_string(),
        },
        _ => NotificationEvent::PdfUploaded {
            syllabus,
            uploaded_by: actor.to_string(),
        },
    };
    state.notifications().notify(notification).await;

    Ok(StatusCode::ACCEPTED)
}

fn parse_username(value: &str) -> Result<Username, ApiError> {
    Username::try_new(value).map_err(|err| ApiError::UnprocessableEntity(err.to_string()))
}
