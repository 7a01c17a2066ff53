use syllabus_common::database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::schema::{SCHEMA_STATEMENTS, SEED_STATEMENTS};
use crate::settings::Settings;

mod schema;
mod settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database = database::connect(&settings.database).await?;
    tracing::info!("connected to database");

    database
        .execute_in_transaction(SCHEMA_STATEMENTS, "schema migration")
        .await?;
    database
        .execute_in_transaction(SEED_STATEMENTS, "role seed")
        .await?;

    tracing::info!("schema migrated");
    Ok(())
}
