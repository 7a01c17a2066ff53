use std::time::Duration;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use syllabus_common::database;

use crate::domain::AppState;
use crate::infrastructure::AppStateImpl;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::settings::{RetentionSettings, Settings};

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database = database::connect(&settings.database).await?;
    tracing::info!("connected to database");

    let state = AppStateImpl::new(database);

    spawn_notification_sweep(state.clone(), settings.retention.clone());

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}

/// Periodic retention sweep over the notifications table. Failures are
/// logged and the next tick tries again.
fn spawn_notification_sweep(state: AppStateImpl, retention: RetentionSettings) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(retention.sweep_interval_seconds));
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - chrono::Duration::days(retention.notification_days);
            if let Err(err) = state.notifications().delete_older_than(cutoff).await {
                tracing::error!("notification retention sweep failed: {}", err);
            }
        }
    });
}
