use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use drum_core::{
    validate_manual_wastage, DrumSettings, ValidationOutcome, WastageCalculationResult,
    WastageError, WastageRequest,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod store;

use config::ApiConfig;
use store::{DrumStore, SettingsUpdate};

type SharedStore = Arc<DrumStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env()?;
    info!("Starting Drum Wastage API");

    let store = match &config.seed {
        Some(path) => DrumStore::load(path)?,
        None => DrumStore::default(),
    };

    let app = router(Arc::new(store));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.addr))?;

    info!("API server listening on http://{}", config.addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/wastage/calculate", post(calculate))
        .route("/api/wastage/validate", post(validate))
        .route("/api/drums/:id", put(upsert_drum))
        .route("/api/drums/:id/wastage", get(drum_wastage))
        .route("/api/drums/:id/settings", put(update_settings))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "drum-wastage-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Reconciles a drum supplied in the request body
async fn calculate(
    Json(request): Json<WastageRequest>,
) -> Result<Json<WastageCalculationResult>, AppError> {
    info!(
        "Received wastage request for drum {} with {} usage records",
        request.drum.id,
        request.usage_records.len()
    );

    let result = request.calculate()?;
    log_result(&request.drum.id, &result);

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    wastage: f64,
    total_used: f64,
    initial_quantity: f64,
}

/// Inline feedback while an operator types an override
async fn validate(Json(request): Json<ValidateRequest>) -> Json<ValidationOutcome> {
    Json(validate_manual_wastage(
        request.wastage,
        request.total_used,
        request.initial_quantity,
    ))
}

async fn upsert_drum(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(mut entry): Json<WastageRequest>,
) -> StatusCode {
    entry.drum.id = id;
    info!(
        "Storing drum {} with {} usage records",
        entry.drum.id,
        entry.usage_records.len()
    );
    store.upsert(entry);
    StatusCode::NO_CONTENT
}

/// Reconciles a stored drum with its stored preference
async fn drum_wastage(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<WastageCalculationResult>, AppError> {
    let entry = store.get(&id).ok_or(AppError::NotFound(id))?;
    let result = entry.calculate()?;
    log_result(&entry.drum.id, &result);

    Ok(Json(result))
}

/// Switches method and override, then returns the fresh result
async fn update_settings(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(settings): Json<DrumSettings>,
) -> Result<Json<WastageCalculationResult>, AppError> {
    info!(
        "Settings change for drum {}: {} (override {:?})",
        id, settings.calculation_method, settings.manual_wastage_override
    );

    match store.update_settings(&id, settings)? {
        SettingsUpdate::Applied(entry) => {
            let result = entry.calculate()?;
            log_result(&entry.drum.id, &result);
            Ok(Json(result))
        }
        SettingsUpdate::Rejected(message) => Err(AppError::Rejected(message)),
        SettingsUpdate::NotFound => Err(AppError::NotFound(id)),
    }
}

fn log_result(drum_id: &str, result: &WastageCalculationResult) {
    info!(
        "Drum {} ({}): {:.2} m used, {:.2} m wasted, {:.2} m remaining",
        drum_id,
        result.calculation_method,
        result.total_used,
        result.total_wastage,
        result.calculated_current_quantity
    );
    if !result.skipped_records.is_empty() {
        warn!(
            "Drum {}: {} usage records had unusable footage marks",
            drum_id,
            result.skipped_records.len()
        );
    }
}

/// Application error type
enum AppError {
    Wastage(WastageError),
    NotFound(String),
    Rejected(String),
}

impl From<WastageError> for AppError {
    fn from(err: WastageError) -> Self {
        AppError::Wastage(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Wastage(err) => {
                let message = err.to_string();
                match err {
                    WastageError::NegativeRemainder { result, .. } => {
                        warn!("Integrity check failed: {}", message);
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            json!({ "error": message, "result": result }),
                        )
                    }
                    _ => {
                        warn!("Request rejected: {}", message);
                        (StatusCode::BAD_REQUEST, json!({ "error": message }))
                    }
                }
            }
            AppError::Rejected(message) => {
                warn!("Settings rejected: {}", message);
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            AppError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("Drum '{id}' not found") }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
