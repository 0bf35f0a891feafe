use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront_api::{
    config::Config,
    db::{create_pool, run_migrations, PgCatalogStore},
    routes::{create_router, AppState},
    services::{
        recommender::{gemini::GeminiRecommender, ExternalRecommender},
        EngineConfig, RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_api=debug,tower_http=debug")),
        )
        .with(fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&db_pool).await?;

    let recommender: Option<Arc<dyn ExternalRecommender>> = match config.gemini_api_key() {
        Some(api_key) => {
            tracing::info!(model = %config.gemini_model, "Gemini recommendations enabled");
            Some(Arc::new(GeminiRecommender::new(
                api_key.to_string(),
                config.gemini_api_url.clone(),
                config.gemini_model.clone(),
            )))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, searches use the fallback ranking only");
            None
        }
    };

    let engine = RecommendationEngine::new(
        EngineConfig {
            recommender_timeout: config.recommender_timeout(),
            ..Default::default()
        },
        recommender,
    );

    let state = AppState::new(Arc::new(PgCatalogStore::new(db_pool)), engine);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
