//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileBackend, OpenAiSuggestionAdapter},
    config::Config,
    error::ApiError,
    web::{
        rest::{
            create_backup_handler, delete_day_template, delete_document,
            delete_library_activity, delete_newsletter, delete_plan, delete_weekly_template,
            list_day_templates, list_documents, list_library, list_newsletters, list_plans,
            list_weekly_templates, mark_onboarding_seen, onboarding_status,
            restore_backup_handler, save_day_template, save_document, save_library_activity,
            save_newsletter, save_plan, save_weekly_template, suggest_handler,
        },
        state::AppState,
        ApiDoc,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    routing::{get, post},
    Router,
};
use kinderplan_core::ports::{ActivityGenerator, StorageBackend};
use kinderplan_core::store::PlannerStore;
use kinderplan_core::suggest::SuggestionService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Local Store ---
    info!("Opening data directory at {:?}...", config.data_dir);
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::new(&config.data_dir)?);
    let store = Arc::new(PlannerStore::new(Arc::clone(&backend)));

    // --- 3. Initialize the Suggestion Service ---
    // No API key means the remote tier is skipped and suggestions run on
    // cache + offline templates; planning never depends on the AI backend.
    let generator: Option<Arc<dyn ActivityGenerator>> = match &config.openai_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            let client = Client::with_config(openai_config);
            Some(Arc::new(OpenAiSuggestionAdapter::new(
                client,
                config.suggest_model.clone(),
            )))
        }
        None => {
            info!("No OPENAI_API_KEY configured; suggestions will use offline templates.");
            None
        }
    };
    let suggestions = Arc::new(SuggestionService::new(
        Arc::clone(&backend),
        generator,
        !config.offline_mode,
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        suggestions,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/plans", get(list_plans).post(save_plan))
        .route("/plans/{id}", axum::routing::delete(delete_plan))
        .route("/library", get(list_library).post(save_library_activity))
        .route(
            "/library/{id}",
            axum::routing::delete(delete_library_activity),
        )
        .route(
            "/day-templates",
            get(list_day_templates).post(save_day_template),
        )
        .route(
            "/day-templates/{id}",
            axum::routing::delete(delete_day_template),
        )
        .route(
            "/weekly-templates",
            get(list_weekly_templates).post(save_weekly_template),
        )
        .route(
            "/weekly-templates/{id}",
            axum::routing::delete(delete_weekly_template),
        )
        .route("/documents", get(list_documents).post(save_document))
        .route("/documents/{id}", axum::routing::delete(delete_document))
        .route("/newsletters", get(list_newsletters).post(save_newsletter))
        .route(
            "/newsletters/{id}",
            axum::routing::delete(delete_newsletter),
        )
        .route(
            "/onboarding",
            get(onboarding_status).post(mark_onboarding_seen),
        )
        .route("/backup", get(create_backup_handler))
        .route("/restore", post(restore_backup_handler))
        .route("/suggestions", post(suggest_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(())
}
