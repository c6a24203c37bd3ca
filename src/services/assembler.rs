//! Ensamblado de la respuesta de analítica
//!
//! Transformación pura de identidad + totales + viajes al contrato JSON.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::dto::{DriverAnalyticsResponse, PaginationInfo, PaymentDetail, RatingDetail, TripDetail};
use crate::models::{Driver, DriverTotals, TripRow};
use crate::services::pagination::TripPage;

// Vía texto para obtener el f64 más cercano al valor decimal
fn to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

/// Quitar viajes repetidos por fan-out del join, conservando el primero
pub fn dedupe_trips(trips: Vec<TripRow>) -> Vec<TripRow> {
    let mut seen = HashSet::with_capacity(trips.len());
    trips.into_iter().filter(|trip| seen.insert(trip.trip_id)).collect()
}

/// Pago y valoración sólo si existen; nunca `{amount: 0}` por ausencia
pub fn trip_detail(trip: TripRow) -> TripDetail {
    TripDetail {
        trip_id: trip.trip_id,
        start_location: trip.start_location,
        end_location: trip.end_location,
        trip_date: trip.trip_date,
        payment: trip.amount.map(|amount| PaymentDetail {
            amount: to_f64(amount),
            payment_date: trip.payment_date,
        }),
        rating: trip.rating_value.map(|rating_value| RatingDetail {
            rating_value,
            comment: trip.comment,
        }),
    }
}

fn response(driver: Driver, totals: &DriverTotals, trips: Vec<TripDetail>) -> DriverAnalyticsResponse {
    DriverAnalyticsResponse {
        success: true,
        driver,
        total_trips: totals.total_trips,
        total_earnings: to_f64(totals.total_earnings),
        average_rating: to_f64(totals.average_rating),
        trips,
        pagination: None,
    }
}

/// Respuesta con el historial completo, sin objeto de paginación
pub fn assemble_full_history(driver: Driver, totals: &DriverTotals, trips: Vec<TripRow>) -> DriverAnalyticsResponse {
    let trips = dedupe_trips(trips).into_iter().map(trip_detail).collect();
    response(driver, totals, trips)
}

/// Respuesta paginada
pub fn assemble_page(driver: Driver, totals: &DriverTotals, page: TripPage, limit: u32) -> DriverAnalyticsResponse {
    let trips: Vec<TripDetail> = dedupe_trips(page.trips).into_iter().map(trip_detail).collect();
    let pagination = PaginationInfo {
        limit,
        has_next_page: page.has_next_page,
        total_trips: totals.total_trips,
        showing_trips: trips.len(),
        next_cursor: page.next_cursor,
        next_cursor_token: page.next_cursor.map(|cursor| cursor.encode()),
    };

    DriverAnalyticsResponse {
        pagination: Some(pagination),
        ..response(driver, totals, trips)
    }
}
