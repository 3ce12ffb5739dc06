//! Example server: entity listing over PostgreSQL and the fixture store.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

use entity_crud::{
    app_router, apply_migrations, builtin_entities, ensure_database_exists, load_from_file, resolve, AppState,
    FixtureStore, PgExecutor, ServerSettings,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("entity_crud=info")),
        )
        .init();

    let settings = ServerSettings::from_env();
    let database_url = settings
        .database_url
        .clone()
        .unwrap_or_else(|| "postgres://localhost/entity_crud".into());

    let entities = match &settings.entities_path {
        Some(path) => load_from_file(path).await?,
        None => builtin_entities()?,
    };
    let registry = resolve(&entities)?;

    ensure_database_exists(&database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.pool_max)
        .connect(&database_url)
        .await?;
    apply_migrations(&pool, &registry).await?;

    let documents = match FixtureStore::load(&settings.fixtures_path).await {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(error = %e, "fixtures unavailable, document sources will be empty");
            FixtureStore::empty()
        }
    };

    let state = AppState::new(registry, Arc::new(PgExecutor::new(pool)), documents).with_settings(&settings);
    let app = app_router(state, settings.body_limit);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
