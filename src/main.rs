use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use clinicdesk::config::AppConfig;
use clinicdesk::directory::ProviderDirectory;
use clinicdesk::handlers;
use clinicdesk::services::extraction::ollama::OllamaClient;
use clinicdesk::services::extraction::openai::OpenAiClient;
use clinicdesk::services::extraction::LlmClient;
use clinicdesk::services::temporal::SystemDateTimeParser;
use clinicdesk::state::AppState;
use clinicdesk::store::ScheduleStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = ScheduleStore::open(&config.database_url)?;
    store.bootstrap(&config.doctors)?;
    let directory = ProviderDirectory::new(store.clone());

    let llm: Box<dyn LlmClient> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama extraction provider (url: {})", config.ollama_url);
            Box::new(OllamaClient::new(
                config.ollama_url.clone(),
                "llama3.2".to_string(),
                config.extraction_timeout_secs,
            ))
        }
        _ => {
            anyhow::ensure!(
                !config.openai_api_key.is_empty(),
                "OPENAI_API_KEY must be set when LLM_PROVIDER=openai"
            );
            tracing::info!("using OpenAI extraction provider (model: {})", config.openai_model);
            Box::new(OpenAiClient::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                config.extraction_timeout_secs,
            ))
        }
    };

    tracing::info!(
        brand = %config.brand_name,
        timezone = %config.timezone,
        doctors = config.doctors.len(),
        "clinic roster loaded"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        directory,
        llm,
        parser: Box::new(SystemDateTimeParser),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/doctors", get(handlers::doctors::list_doctors))
        .route("/nlu", post(handlers::dialogue::advance_turn))
        .route("/check", post(handlers::booking::check))
        .route("/book", post(handlers::booking::book))
        .route("/api/bookings", get(handlers::booking::list_bookings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
