use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::config::TripListing;
use crate::database::DatabaseError;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
}

/// Estado del servicio; no abre conexiones
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let profile = state.config.profile;
    Json(json!({
        "status": "ok",
        "service": "driver-analytics",
        "variant": state.config.variant.as_str(),
        "aggregation": profile.aggregation.to_string(),
        "paginated": profile.listing == TripListing::Keyset,
        "gateway": state.gateway.status(),
        "uptime_seconds": (Utc::now() - state.started_at).num_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Métricas del gateway en formato Prometheus
async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state
        .gateway
        .metrics()
        .encode()
        .map_err(DatabaseError::from)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
