//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de los parámetros
//! de la petición y conversión de tipos.

use chrono::{DateTime, NaiveDate, Utc};
use validator::ValidationError;

/// Validar y convertir string a fecha
///
/// Acepta `YYYY-MM-DD` o un timestamp RFC 3339 (se usa la fecha en UTC).
/// Un timestamp con desplazamiento puede mover el día ancla: `23:30-05:00`
/// cae en el día siguiente.
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| {
            DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .map_err(|_| {
            let mut error = ValidationError::new("date");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"YYYY-MM-DD or RFC3339".to_string());
            error
        })
}

/// Validar y convertir string a identificador positivo
pub fn validate_positive_id(value: &str) -> Result<i64, ValidationError> {
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            let mut error = ValidationError::new("positive_id");
            error.add_param("value".into(), &value.to_string());
            Err(error)
        }
    }
}

/// Interpretar el parámetro `limit`
///
/// Ausente o no numérico cae al valor por defecto; negativo o no finito es un
/// error; fraccionario se trunca; por encima de `max` se recorta a `max`.
pub fn parse_page_limit(raw: Option<&str>, default: u32, max: u32) -> Result<u32, ValidationError> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(default.min(max)),
    };

    let value = match raw.parse::<i64>() {
        Ok(value) => value as f64,
        Err(_) => match raw.parse::<f64>() {
            Ok(value) => value,
            Err(_) => return Ok(default.min(max)),
        },
    };

    if !value.is_finite() {
        let mut error = ValidationError::new("finite");
        error.add_param("value".into(), &raw.to_string());
        return Err(error);
    }
    if value < 0.0 {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &raw.to_string());
        return Err(error);
    }

    Ok(value.trunc().min(max as f64) as u32)
}
