use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use punchcard_api::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,punchcard_api=debug,tower_http=debug".into()),
        )
        .init();

    let settings = config::read_config().context("failed to read configuration")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(16)
        .connect_with(settings.database.with_db())
        .await
        .context("failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("failed to run database migrations")?;

    let app_state = AppState::new(db_pool, &settings.tracker)?;
    let app = router::create(app_state, &settings);

    let address = format!(
        "{}:{}",
        settings.application.host, settings.application.port
    );
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!("listening on {address}");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
