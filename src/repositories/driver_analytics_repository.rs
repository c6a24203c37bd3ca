//! Repositorio de analítica de conductores
//!
//! Todas las consultas de lectura del camino de analítica. Pasan por el
//! `DataGateway`, que decide si van a la conexión única o al pool.

use std::sync::Arc;

use crate::database::{DataGateway, DatabaseError};
use crate::models::{DriverSummaryRow, DriverTripRow, TripCursor, TripRow};

/// Agregados calculados en base de datos; 0 filas = conductor inexistente
const DRIVER_SUMMARY_SQL: &str = r#"
    SELECT
        d.driver_id,
        d.driver_name,
        d.phone_number,
        d.onboarding_date,
        COUNT(DISTINCT t.trip_id) AS total_trips,
        COALESCE(SUM(p.amount), 0)::NUMERIC AS total_earnings,
        COALESCE(AVG(r.rating_value), 0)::NUMERIC AS average_rating
    FROM drivers d
    LEFT JOIN trips t ON d.driver_id = t.driver_id
    LEFT JOIN payments p ON t.trip_id = p.trip_id
    LEFT JOIN ratings r ON t.trip_id = r.trip_id
    WHERE d.driver_id = $1
    GROUP BY d.driver_id, d.driver_name, d.phone_number, d.onboarding_date
"#;

/// Join completo desnormalizado, una fila por viaje
const DRIVER_TRIP_HISTORY_SQL: &str = r#"
    SELECT
        d.driver_id,
        d.driver_name,
        d.phone_number,
        d.onboarding_date,
        t.trip_id,
        t.start_location,
        t.end_location,
        t.trip_date,
        p.amount,
        p.payment_date,
        r.rating_value,
        r.comment
    FROM drivers d
    LEFT JOIN trips t ON d.driver_id = t.driver_id
    LEFT JOIN payments p ON t.trip_id = p.trip_id
    LEFT JOIN ratings r ON t.trip_id = r.trip_id
    WHERE d.driver_id = $1
    ORDER BY t.trip_date DESC, t.trip_id DESC
"#;

/// Viajes desde el principio; `LIMIT NULL` equivale a sin límite
const TRIP_PAGE_SQL: &str = r#"
    SELECT
        t.trip_id,
        t.start_location,
        t.end_location,
        t.trip_date,
        p.amount,
        p.payment_date,
        r.rating_value,
        r.comment
    FROM trips t
    LEFT JOIN payments p ON t.trip_id = p.trip_id
    LEFT JOIN ratings r ON t.trip_id = r.trip_id
    WHERE t.driver_id = $1
    ORDER BY t.trip_date DESC, t.trip_id DESC
    LIMIT $2
"#;

/// Viajes estrictamente anteriores al cursor en orden (fecha DESC, id DESC)
const TRIP_PAGE_AFTER_CURSOR_SQL: &str = r#"
    SELECT
        t.trip_id,
        t.start_location,
        t.end_location,
        t.trip_date,
        p.amount,
        p.payment_date,
        r.rating_value,
        r.comment
    FROM trips t
    LEFT JOIN payments p ON t.trip_id = p.trip_id
    LEFT JOIN ratings r ON t.trip_id = r.trip_id
    WHERE t.driver_id = $1
      AND (t.trip_date < $2 OR (t.trip_date = $2 AND t.trip_id < $3))
    ORDER BY t.trip_date DESC, t.trip_id DESC
    LIMIT $4
"#;

pub struct DriverAnalyticsRepository {
    gateway: Arc<DataGateway>,
}

impl DriverAnalyticsRepository {
    pub fn new(gateway: Arc<DataGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &DataGateway {
        &self.gateway
    }

    /// Identidad y agregados del conductor en una sola consulta
    pub async fn driver_summary(&self, driver_id: i64) -> Result<Option<DriverSummaryRow>, DatabaseError> {
        self.gateway
            .fetch_optional(sqlx::query_as::<_, DriverSummaryRow>(DRIVER_SUMMARY_SQL).bind(driver_id))
            .await
    }

    /// Historial completo del conductor, sin agregar
    pub async fn driver_trip_history(&self, driver_id: i64) -> Result<Vec<DriverTripRow>, DatabaseError> {
        self.gateway
            .fetch_all(sqlx::query_as::<_, DriverTripRow>(DRIVER_TRIP_HISTORY_SQL).bind(driver_id))
            .await
    }

    /// Viajes ordenados, opcionalmente a partir de un cursor y con límite
    pub async fn trip_rows(
        &self,
        driver_id: i64,
        cursor: Option<&TripCursor>,
        limit: Option<i64>,
    ) -> Result<Vec<TripRow>, DatabaseError> {
        let query = match cursor {
            Some(cursor) => sqlx::query_as::<_, TripRow>(TRIP_PAGE_AFTER_CURSOR_SQL)
                .bind(driver_id)
                .bind(cursor.cursor_date)
                .bind(cursor.cursor_id)
                .bind(limit),
            None => sqlx::query_as::<_, TripRow>(TRIP_PAGE_SQL)
                .bind(driver_id)
                .bind(limit),
        };
        self.gateway.fetch_all(query).await
    }
}
