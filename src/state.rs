//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. El gateway se construye una sola vez al
//! arrancar y se comparte entre todas las peticiones.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::EnvironmentConfig;
use crate::controllers::DriverAnalyticsController;
use crate::database::DataGateway;
use crate::services::PageLimits;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub gateway: Arc<DataGateway>,
    pub analytics: Arc<DriverAnalyticsController>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, gateway: Arc<DataGateway>) -> Self {
        let limits = PageLimits {
            default_limit: config.default_page_limit,
            max_limit: config.max_page_limit,
        };
        let analytics = DriverAnalyticsController::new(gateway.clone(), config.profile, limits);

        Self {
            config,
            gateway,
            analytics: Arc::new(analytics),
            started_at: Utc::now(),
        }
    }
}
