//! Rutas HTTP
//!
//! La API versionada cuelga de `/api/v1`; `/health` y `/metrics` quedan en la raíz.

pub mod analytics_routes;
pub mod health_routes;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_middleware;
use crate::state::AppState;

/// Router completo con middleware, listo para servir
pub fn create_router(state: AppState) -> Router {
    let api = Router::new().nest("/drivers", analytics_routes::create_analytics_router());

    let mut app: Router<AppState> = Router::new()
        .nest("/api/v1", api)
        .merge(health_routes::create_health_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware(&state.config.cors_origins));

    if state.config.compression {
        app = app.layer(CompressionLayer::new());
    }

    app.with_state(state)
}
