use anyhow::Context;
use axum::Router;
use axum::routing::{get, post, put};
use axum_prometheus::PrometheusMetricLayer;
use tokio::net;

use crate::domain::AppState;
use crate::infrastructure::http::handlers::{audit, events, health_check, notifications, workflow};

pub mod api;
pub mod extract;
pub mod handlers;
pub mod querystring;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        // see: https://github.com/Ptrskay3/axum-prometheus
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = Router::new()
            .route("/health", get(health_check))
            .nest("/api", api_routes())
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(trace_layer)
            .layer(prometheus_layer)
            .with_state(state);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("listening on {}", self.listener.local_addr().unwrap());
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

fn api_routes<S: AppState>() -> Router<S> {
    Router::new()
        // lifecycle transitions
        .route("/syllabi/{id}/submit", post(workflow::submit_for_review::<S>))
        .route("/syllabi/{id}/hod-approve", post(workflow::hod_approve::<S>))
        .route("/syllabi/{id}/hod-reject", post(workflow::hod_reject::<S>))
        .route("/syllabi/{id}/aa-approve", post(workflow::aa_approve::<S>))
        .route("/syllabi/{id}/aa-reject", post(workflow::aa_reject::<S>))
        .route(
            "/syllabi/{id}/principal-approve",
            post(workflow::principal_approve::<S>),
        )
        .route(
            "/syllabi/{id}/principal-reject",
            post(workflow::principal_reject::<S>),
        )
        .route("/syllabi/{id}/history", get(workflow::workflow_history::<S>))
        .route(
            "/syllabi/by-status/{status}",
            get(workflow::syllabi_by_status::<S>),
        )
        // notification bell
        .route("/notifications", get(notifications::list_notifications::<S>))
        .route(
            "/notifications/unread",
            get(notifications::unread_notifications::<S>),
        )
        .route(
            "/notifications/stats",
            get(notifications::notification_stats::<S>),
        )
        .route(
            "/notifications/{id}/read",
            put(notifications::mark_notification_read::<S>),
        )
        .route(
            "/notifications/read-all",
            put(notifications::mark_all_notifications_read::<S>),
        )
        // audit ledger
        .route("/audit", get(audit::list_audit_logs::<S>))
        .route("/audit/my-actions", get(audit::my_audit_logs::<S>))
        .route("/audit/syllabus/{id}", get(audit::audit_logs_by_syllabus::<S>))
        .route("/audit/user/{username}", get(audit::audit_logs_by_user::<S>))
        .route(
            "/audit/action-type/{action}",
            get(audit::audit_logs_by_action::<S>),
        )
        .route("/audit/date-range", get(audit::audit_logs_by_date_range::<S>))
        .route("/audit/recent", get(audit::recent_audit_logs::<S>))
        .route(
            "/audit/academic-year/{year}",
            get(audit::audit_logs_by_academic_year::<S>),
        )
        .route("/audit/statistics", get(audit::audit_statistics::<S>))
        // inbound events from sibling subsystems
        .route("/events/comment-added", post(events::comment_added::<S>))
        .route("/events/pdf-uploaded", post(events::pdf_uploaded::<S>))
        .route("/events/pdf-deleted", post(events::pdf_deleted::<S>))
}
