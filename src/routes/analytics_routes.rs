use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::config::TripListing;
use crate::dto::{AnalyticsQuery, DriverAnalyticsResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_analytics_router() -> Router<AppState> {
    Router::new().route("/:driver_id/analytics", get(get_driver_analytics))
}

// El id llega como texto para devolver nuestro propio error de validación
async fn get_driver_analytics(
    State(state): State<AppState>,
    Path(driver_id): Path<String>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<DriverAnalyticsResponse>, AppError> {
    let span = info_span!(
        "driver_analytics",
        request_id = %Uuid::new_v4(),
        driver_id = %driver_id,
        variant = %state.config.variant,
    );

    async move {
        // Sólo el listado paginado lee la query string
        let query = match state.analytics.listing() {
            TripListing::FullHistory => AnalyticsQuery::default(),
            TripListing::Keyset => query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?.0,
        };
        let response = state.analytics.get_driver_analytics(&driver_id, &query).await?;
        Ok::<_, AppError>(Json(response))
    }
    .instrument(span)
    .await
}
