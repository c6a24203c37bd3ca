use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Driver, TripCursor};

// Parámetros de consulta; se reciben como texto y se interpretan a mano
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub limit: Option<String>,
    pub cursor_date: Option<String>,
    pub cursor_id: Option<String>,
    pub cursor: Option<String>,
}

// Response de analítica del conductor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverAnalyticsResponse {
    pub success: bool,
    pub driver: Driver,
    pub total_trips: i64,
    pub total_earnings: f64,
    pub average_rating: f64,
    pub trips: Vec<TripDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDetail {
    pub trip_id: i64,
    pub start_location: String,
    pub end_location: String,
    pub trip_date: NaiveDate,
    pub payment: Option<PaymentDetail>,
    pub rating: Option<RatingDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDetail {
    pub amount: f64,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingDetail {
    pub rating_value: i16,
    pub comment: Option<String>,
}

// `nextCursor` se serializa como null cuando no hay más páginas
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub limit: u32,
    pub has_next_page: bool,
    pub total_trips: i64,
    pub showing_trips: usize,
    pub next_cursor: Option<TripCursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor_token: Option<String>,
}
