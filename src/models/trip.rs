//! Modelo de Trip
//!
//! Filas de viaje con pago y valoración opcionales, y el cursor de
//! paginación por clave `(trip_date, trip_id)`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use std::cmp::Ordering;

use super::driver::Driver;

/// Viaje con las columnas de `payments` y `ratings` unidas por LEFT JOIN
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TripRow {
    pub trip_id: i64,
    pub start_location: String,
    pub end_location: String,
    pub trip_date: NaiveDate,
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub rating_value: Option<i16>,
    pub comment: Option<String>,
}

impl TripRow {
    /// Clave de orden total: fecha y luego id
    pub fn order_key(&self) -> (NaiveDate, i64) {
        (self.trip_date, self.trip_id)
    }

    /// Cursor que apunta a este viaje
    pub fn cursor(&self) -> TripCursor {
        TripCursor {
            cursor_date: self.trip_date,
            cursor_id: self.trip_id,
        }
    }
}

/// Fila del join completo conductor → viajes → pagos → valoraciones
///
/// Un conductor sin viajes produce una sola fila con las columnas de viaje a NULL.
#[derive(Debug, Clone, FromRow)]
pub struct DriverTripRow {
    #[sqlx(flatten)]
    pub driver: Driver,
    pub trip_id: Option<i64>,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub trip_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub rating_value: Option<i16>,
    pub comment: Option<String>,
}

impl DriverTripRow {
    /// Parte de viaje de la fila, si existe
    pub fn trip(&self) -> Option<TripRow> {
        let trip_id = self.trip_id?;
        let trip_date = self.trip_date?;
        Some(TripRow {
            trip_id,
            start_location: self.start_location.clone().unwrap_or_default(),
            end_location: self.end_location.clone().unwrap_or_default(),
            trip_date,
            amount: self.amount,
            payment_date: self.payment_date,
            rating_value: self.rating_value,
            comment: self.comment.clone(),
        })
    }
}

/// Posición del último viaje de la página anterior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripCursor {
    pub cursor_date: NaiveDate,
    pub cursor_id: i64,
}

impl TripCursor {
    /// ¿Va `trip` estrictamente después del cursor en orden (fecha DESC, id DESC)?
    pub fn precedes(&self, trip: &TripRow) -> bool {
        trip.order_key().cmp(&(self.cursor_date, self.cursor_id)) == Ordering::Less
    }

    /// Token opaco `base64url("YYYY-MM-DD:id")`
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.cursor_date.format("%Y-%m-%d"), self.cursor_id))
    }

    /// Decodificar un token; `None` si está malformado
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (date, id) = text.split_once(':')?;
        let cursor_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let cursor_id = id.parse::<i64>().ok().filter(|id| *id > 0)?;
        Some(Self {
            cursor_date,
            cursor_id,
        })
    }
}
