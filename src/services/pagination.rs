//! Motor de paginación de viajes
//!
//! Paginación por clave `(trip_date DESC, trip_id DESC)`. Se piden `limit + 1`
//! filas: la fila extra sólo indica que existe una página siguiente y nunca se
//! devuelve. El cursor es posicional, así que sigue funcionando aunque el viaje
//! al que apunta se haya borrado, y los viajes insertados con fecha posterior
//! no desplazan las páginas siguientes.

use validator::{ValidationError, ValidationErrors};

use crate::database::DatabaseError;
use crate::dto::AnalyticsQuery;
use crate::models::{TripCursor, TripRow};
use crate::repositories::DriverAnalyticsRepository;
use crate::utils::validation::{parse_page_limit, validate_date, validate_positive_id};
use crate::utils::{AppError, AppResult};

/// Tamaño de página por defecto y máximo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

/// Petición de página ya validada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: Option<TripCursor>,
}

/// Página de viajes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPage {
    pub trips: Vec<TripRow>,
    pub has_next_page: bool,
    pub next_cursor: Option<TripCursor>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

impl PageRequest {
    /// Interpretar `limit`, `cursor_date`/`cursor_id` y `cursor`
    ///
    /// Los errores de todos los campos se devuelven juntos.
    pub fn from_query(query: &AnalyticsQuery, limits: &PageLimits) -> AppResult<Self> {
        let mut errors = ValidationErrors::new();

        let limit = match parse_page_limit(query.limit.as_deref(), limits.default_limit, limits.max_limit) {
            Ok(limit) => limit,
            Err(error) => {
                errors.add("limit", error);
                limits.default_limit
            }
        };

        let token = present(&query.cursor);
        let cursor = match (token, present(&query.cursor_date), present(&query.cursor_id)) {
            (None, None, None) => None,
            (Some(_), date, id) if date.is_some() || id.is_some() => {
                errors.add(
                    "cursor",
                    with_message("exclusive", "cursor cannot be combined with cursor_date/cursor_id"),
                );
                None
            }
            (Some(token), _, _) => match TripCursor::decode(token) {
                Some(cursor) => Some(cursor),
                None => {
                    errors.add("cursor", with_message("malformed", "cursor token is malformed"));
                    None
                }
            },
            (None, Some(_), None) => {
                errors.add(
                    "cursor_id",
                    with_message("required_together", "cursor_date and cursor_id must be supplied together"),
                );
                None
            }
            (None, None, Some(_)) => {
                errors.add(
                    "cursor_date",
                    with_message("required_together", "cursor_date and cursor_id must be supplied together"),
                );
                None
            }
            (None, Some(date), Some(id)) => {
                let cursor_date = validate_date(date).map_err(|e| errors.add("cursor_date", e)).ok();
                let cursor_id = validate_positive_id(id).map_err(|e| errors.add("cursor_id", e)).ok();
                cursor_date.zip(cursor_id).map(|(cursor_date, cursor_id)| TripCursor {
                    cursor_date,
                    cursor_id,
                })
            }
        };

        if !errors.errors().is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(Self { limit, cursor })
    }
}

/// Cortar las `limit + 1` filas leídas en una página
pub fn assemble_page(mut rows: Vec<TripRow>, limit: u32) -> TripPage {
    let limit = limit as usize;
    let has_next_page = rows.len() > limit;
    rows.truncate(limit);

    let next_cursor = if has_next_page {
        rows.last().map(TripRow::cursor)
    } else {
        None
    };

    TripPage {
        trips: rows,
        has_next_page,
        next_cursor,
    }
}

/// Leer una página de viajes del conductor
pub async fn fetch_page(
    repository: &DriverAnalyticsRepository,
    driver_id: i64,
    request: &PageRequest,
) -> Result<TripPage, DatabaseError> {
    let rows = repository
        .trip_rows(driver_id, request.cursor.as_ref(), Some(i64::from(request.limit) + 1))
        .await?;
    debug_assert!(request
        .cursor
        .map_or(true, |cursor| rows.iter().all(|trip| cursor.precedes(trip))));
    Ok(assemble_page(rows, request.limit))
}
