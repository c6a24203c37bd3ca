//! Modelo de Driver
//!
//! Identidad del conductor y los tres agregados de rendimiento.
//! Mapea a la tabla `drivers`.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use sqlx::FromRow;

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Driver {
    pub driver_id: i64,
    pub driver_name: String,
    pub phone_number: String,
    pub onboarding_date: NaiveDate,
}

/// Fila devuelta por la consulta de agregados en base de datos
#[derive(Debug, Clone, FromRow)]
pub struct DriverSummaryRow {
    #[sqlx(flatten)]
    pub driver: Driver,
    pub total_trips: i64,
    pub total_earnings: Decimal,
    pub average_rating: Decimal,
}

/// Totales del conductor, ya redondeados a 2 decimales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverTotals {
    pub total_trips: i64,
    pub total_earnings: Decimal,
    pub average_rating: Decimal,
}

/// Redondeo monetario: 2 decimales, mitad lejos de cero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl DriverTotals {
    pub fn new(total_trips: i64, total_earnings: Decimal, average_rating: Decimal) -> Self {
        Self {
            total_trips,
            total_earnings: round_money(total_earnings),
            average_rating: round_money(average_rating),
        }
    }
}

impl DriverSummaryRow {
    pub fn into_parts(self) -> (Driver, DriverTotals) {
        let totals = DriverTotals::new(self.total_trips, self.total_earnings, self.average_rating);
        (self.driver, totals)
    }
}
