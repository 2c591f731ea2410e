use crate::http::{ApiError, AppState, CheckResponse, HealthResponse, PlateQuery};
use crate::utils::PlateValue;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::time::SystemTime;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/providers", get(list_providers_handler))
        .route("/api/v1/check", get(check_all_handler))
        .route("/api/v1/check/:provider", get(check_single_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = SystemTime::now()
        .duration_since(state.start_time)
        .unwrap_or_default()
        .as_secs();

    let response = HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        timestamp: Utc::now(),
    };

    (StatusCode::OK, Json(response))
}

async fn list_providers_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.registry.info()))
}

/// One provider, one plate. The engine owns everything past this point;
/// the handler only validates the plate and picks the adapter.
async fn check_single_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<PlateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let plate = PlateValue::new(query.plate.as_deref().unwrap_or(""));
    if plate.is_empty() {
        return Err(ApiError::MissingPlate);
    }

    let adapter = state
        .registry
        .get(&provider)
        .ok_or(ApiError::UnknownProvider(provider))?;

    let result = state.engine.check(&adapter, &plate).await;
    let response = CheckResponse::from_result(adapter.id, &plate, result);
    Ok((response.status(), Json(response)))
}

/// Every configured provider, concurrently. Each entry carries its own
/// ok flag, so the envelope itself is always 200.
async fn check_all_handler(
    State(state): State<AppState>,
    Query(query): Query<PlateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let plate = PlateValue::new(query.plate.as_deref().unwrap_or(""));
    if plate.is_empty() {
        return Err(ApiError::MissingPlate);
    }

    let responses = state.aggregator.check_all(&plate).await;
    Ok((StatusCode::OK, Json(responses)))
}
