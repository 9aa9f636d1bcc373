// Receipt Categorizer - Web Server
// REST API with Axum around the categorization pipeline

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use receipt_categorizer::{
    records_from_value, CategoryDefinition, Categorizer, CategorizerConfig, ReceiptRecord,
    SubcategoryDefinition,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    categorizer: Arc<Categorizer>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Category with its subcategories, in declaration order
#[derive(Serialize)]
struct TaxonomyEntry {
    #[serde(flatten)]
    category: CategoryDefinition,
    subcategories: Vec<SubcategoryDefinition>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategorizeResponse {
    batch_id: String,
    source: &'static str,
    records: Vec<ReceiptRecord>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/taxonomy - Categories with subcategories
async fn get_taxonomy(State(state): State<AppState>) -> impl IntoResponse {
    let taxonomy = state.categorizer.taxonomy();
    let entries: Vec<TaxonomyEntry> = taxonomy
        .categories()
        .iter()
        .map(|category| TaxonomyEntry {
            category: category.clone(),
            subcategories: taxonomy.subcategories_of(&category.id).cloned().collect(),
        })
        .collect();

    Json(ApiResponse::ok(entries))
}

/// POST /api/categorize - Categorize a batch of records
async fn categorize(State(state): State<AppState>, Json(body): Json<Value>) -> impl IntoResponse {
    let records = match records_from_value(body) {
        Ok(records) => records,
        Err(e) => {
            warn!("Rejected categorize request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<CategorizeResponse>::err(e.to_string())),
            )
                .into_response();
        }
    };

    let outcome = state.categorizer.categorize_batch(records).await;
    let response = CategorizeResponse {
        batch_id: outcome.batch_id.to_string(),
        source: outcome.source.label(),
        records: outcome.records,
    };

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    receipt_categorizer::init_logging();

    let config = CategorizerConfig::from_env().context("Invalid categorizer configuration")?;
    let categorizer = Categorizer::from_config(&config)?;
    info!(
        classifier = categorizer.has_classifier(),
        model = %config.model,
        matching = config.matching.as_str(),
        "categorizer ready"
    );

    // Create shared state
    let state = AppState {
        categorizer: Arc::new(categorizer),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/taxonomy", get(get_taxonomy))
        .route("/categorize", post(categorize))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw.parse().with_context(|| format!("Invalid PORT: '{}'", raw))?,
        Err(_) => 4000,
    };
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Categorizer listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
