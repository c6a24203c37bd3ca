//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::database::DatabaseError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Errores de carga de configuración al arrancar
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set in environment variables")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: &'static str,
}

impl ErrorResponse {
    fn new(message: impl Into<String>, code: &'static str) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
            details: None,
            code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(DatabaseError::Connection(e)) => {
                tracing::error!(error = %e, "❌ Database connection error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: Some("Database connection error".to_string()),
                        ..ErrorResponse::new("Internal server error", "DB_CONNECTION_ERROR")
                    },
                )
            }

            AppError::Database(DatabaseError::Query(e)) => {
                tracing::error!(error = %e, "❌ Database query error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: Some("Database error".to_string()),
                        ..ErrorResponse::new("Internal server error", "DB_QUERY_ERROR")
                    },
                )
            }

            AppError::Database(DatabaseError::Metrics(e)) => {
                tracing::error!(error = %e, "❌ Metrics registry error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: Some("An unexpected error occurred".to_string()),
                        ..ErrorResponse::new("Internal server error", "INTERNAL_ERROR")
                    },
                )
            }

            AppError::Validation(e) => {
                tracing::warn!(error = %e, "Validation error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        details: Some(json!(e)),
                        ..ErrorResponse::new("The provided parameters are invalid", "VALIDATION_ERROR")
                    },
                )
            }

            AppError::NotFound(msg) => {
                tracing::info!("Resource not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorResponse::new(msg, "NOT_FOUND"))
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg, "BAD_REQUEST"))
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación sobre un solo campo
pub fn validation_error(field: &'static str, error: validator::ValidationError) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);
    AppError::Validation(errors)
}

/// Función helper para el 404 de conductor
pub fn driver_not_found() -> AppError {
    AppError::NotFound("Driver not found".to_string())
}
