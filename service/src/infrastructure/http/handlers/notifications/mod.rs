use axum::extract::{Path, State};
use axum::http::StatusCode;

use syllabus_common::{NotificationId, NotificationStats};

use crate::domain::AppState;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::extract::ActingUser;
use crate::infrastructure::http::handlers::PageParams;
use crate::infrastructure::http::handlers::notifications::dto::{
    MarkAllReadResponse, NotificationResponse,
};
use crate::infrastructure::http::querystring::QueryString;

pub mod dto;

pub async fn list_notifications<S: AppState>(
    State(state): State<S>,
    ActingUser(acting): ActingUser,
    QueryString(params): QueryString<PageParams>,
) -> Result<ApiSuccess<Vec<NotificationResponse>>, ApiError> {
    let notifications = state
        .notifications()
        .notifications_for(&acting, params.to_page())
        .await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        notifications.into_iter().map(NotificationResponse::from).collect(),
    ))
}

pub async fn unread_notifications<S: AppState>(
    State(state): State<S>,
    ActingUser(acting): ActingUser,
) -> Result<ApiSuccess<Vec<NotificationResponse>>, ApiError> {
    let notifications = state.notifications().unread_for(&acting).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        notifications.into_iter().map(NotificationResponse::from).collect(),
    ))
}

pub async fn notification_stats<S: AppState>(
    State(state): State<S>,
    ActingUser(acting): ActingUser,
) -> Result<ApiSuccess<NotificationStats>, ApiError> {
    let stats = state.notifications().stats_for(&acting).await?;
    Ok(ApiSuccess::new(StatusCode::OK, stats))
}

pub async fn mark_notification_read<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    ActingUser(acting): ActingUser,
) -> Result<StatusCode, ApiError> {
    state
        .notifications()
        .mark_read(NotificationId(id), &acting)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_notifications_read<S: AppState>(
    State(state): State<S>,
    ActingUser(acting): ActingUser,
) -> Result<ApiSuccess<MarkAllReadResponse>, ApiError> {
    let marked_read = state.notifications().mark_all_read(&acting).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        MarkAllReadResponse { marked_read },
    ))
}
