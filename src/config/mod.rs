//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y la selección de variante del servicio.

pub mod database;
pub mod environment;
pub mod variant;

pub use database::DatabaseConfig;
pub use environment::EnvironmentConfig;
pub use variant::*;

use std::env;
use std::str::FromStr;

use crate::utils::ConfigError;

/// Leer una variable opcional; vacía cuenta como ausente
pub(crate) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Leer y parsear una variable, con valor por defecto si falta
pub(crate) fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
