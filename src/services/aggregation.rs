//! Motor de agregación
//!
//! Dos estrategias intercambiables que calculan los mismos tres agregados
//! (viajes, ganancias, valoración media) a partir de las mismas filas:
//! una delega en PostgreSQL, la otra acumula en el proceso.

use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::debug;

use crate::config::AggregationKind;
use crate::database::DatabaseError;
use crate::models::{Driver, DriverTotals, TripRow};
use crate::repositories::DriverAnalyticsRepository;

/// Resultado de una agregación para un conductor existente
#[derive(Debug, Clone)]
pub struct DriverAggregate {
    pub driver: Driver,
    pub totals: DriverTotals,
    /// Viajes ya leídos por la estrategia, sin duplicados y en orden; evita
    /// una segunda consulta cuando se sirve el historial completo
    pub materialized_trips: Option<Vec<TripRow>>,
}

/// Operaciones comunes a las estrategias de agregación
#[async_trait::async_trait]
pub trait AggregationStrategy: Send + Sync {
    fn kind(&self) -> AggregationKind;

    /// `Ok(None)` cuando el conductor no existe
    async fn aggregate(
        &self,
        repository: &DriverAnalyticsRepository,
        driver_id: i64,
    ) -> Result<Option<DriverAggregate>, DatabaseError>;
}

/// COUNT/SUM/AVG en una sola consulta agrupada
pub struct StoreSideAggregation;

#[async_trait::async_trait]
impl AggregationStrategy for StoreSideAggregation {
    fn kind(&self) -> AggregationKind {
        AggregationKind::StoreSide
    }

    async fn aggregate(
        &self,
        repository: &DriverAnalyticsRepository,
        driver_id: i64,
    ) -> Result<Option<DriverAggregate>, DatabaseError> {
        let Some(row) = repository.driver_summary(driver_id).await? else {
            return Ok(None);
        };

        let (driver, totals) = row.into_parts();
        Ok(Some(DriverAggregate {
            driver,
            totals,
            materialized_trips: None,
        }))
    }
}

/// Join completo y acumulación fila a fila
pub struct ClientSideAggregation;

#[async_trait::async_trait]
impl AggregationStrategy for ClientSideAggregation {
    fn kind(&self) -> AggregationKind {
        AggregationKind::ClientSide
    }

    async fn aggregate(
        &self,
        repository: &DriverAnalyticsRepository,
        driver_id: i64,
    ) -> Result<Option<DriverAggregate>, DatabaseError> {
        let rows = repository.driver_trip_history(driver_id).await?;
        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let driver = first.driver.clone();

        let mut accumulator = TotalsAccumulator::default();
        let mut trips = Vec::with_capacity(rows.len());
        for trip in rows.iter().filter_map(|row| row.trip()) {
            if accumulator.push(&trip) {
                trips.push(trip);
            }
        }
        debug!(
            "🧮 Agregación en cliente: {} filas, {} viajes distintos",
            rows.len(),
            trips.len()
        );

        Ok(Some(DriverAggregate {
            driver,
            totals: accumulator.finish(),
            materialized_trips: Some(trips),
        }))
    }
}

/// Acumulador de totales sobre filas de viaje
///
/// Cada viaje cuenta una sola vez aunque el join lo repita.
#[derive(Debug, Default)]
pub struct TotalsAccumulator {
    seen: HashSet<i64>,
    earnings: Decimal,
    rating_sum: i64,
    rating_count: i64,
}

impl TotalsAccumulator {
    /// Devuelve `false` si el viaje ya se había contado
    pub fn push(&mut self, trip: &TripRow) -> bool {
        if !self.seen.insert(trip.trip_id) {
            return false;
        }
        if let Some(amount) = trip.amount {
            self.earnings += amount;
        }
        if let Some(rating) = trip.rating_value {
            self.rating_sum += i64::from(rating);
            self.rating_count += 1;
        }
        true
    }

    pub fn finish(self) -> DriverTotals {
        let average = if self.rating_count > 0 {
            Decimal::from(self.rating_sum) / Decimal::from(self.rating_count)
        } else {
            Decimal::ZERO
        };
        DriverTotals::new(self.seen.len() as i64, self.earnings, average)
    }
}

/// Estrategia configurada
pub fn strategy_for(kind: AggregationKind) -> Box<dyn AggregationStrategy> {
    match kind {
        AggregationKind::StoreSide => Box::new(StoreSideAggregation),
        AggregationKind::ClientSide => Box::new(ClientSideAggregation),
    }
}
