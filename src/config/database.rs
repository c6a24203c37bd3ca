//! Configuración de base de datos
//!
//! Este módulo maneja la configuración de conexión a PostgreSQL con SQLx.
//! El tamaño del pool es fijo por configuración; no se ajusta en caliente.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

use super::{env_optional, env_or};
use crate::utils::ConfigError;

/// Configuración de la base de datos
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_pool_bounds"))]
pub struct DatabaseConfig {
    #[validate(length(min = 1))]
    pub url: String,
    pub schema: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

fn validate_pool_bounds(config: &DatabaseConfig) -> Result<(), ValidationError> {
    if config.min_connections > config.max_connections {
        let mut error = ValidationError::new("pool_bounds");
        error.add_param("min_connections".into(), &config.min_connections);
        error.add_param("max_connections".into(), &config.max_connections);
        return Err(error);
    }
    Ok(())
}

impl DatabaseConfig {
    /// Configuración con valores por defecto para una URL dada
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            schema: None,
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }

    /// Cargar desde variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env_optional("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let defaults = Self::with_url(url);

        let config = Self {
            schema: env_optional("DATABASE_SCHEMA"),
            max_connections: env_or("DB_POOL_SIZE", defaults.max_connections)?,
            min_connections: env_or("DB_POOL_MIN", defaults.min_connections)?,
            acquire_timeout: Duration::from_secs(env_or("DB_ACQUIRE_TIMEOUT_SECS", 30)?),
            idle_timeout: Duration::from_secs(env_or("DB_IDLE_TIMEOUT_SECS", 300)?),
            max_lifetime: Duration::from_secs(env_or("DB_MAX_LIFETIME_SECS", 3600)?),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Opciones de conexión, con `search_path` si hay esquema configurado
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        let options = PgConnectOptions::from_str(&self.url)?;
        Ok(match &self.schema {
            Some(schema) => options.options([("search_path", schema.as_str())]),
            None => options,
        })
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self, options: PgConnectOptions) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect_with(options)
            .await
    }

    /// URL segura para logs
    pub fn masked_url(&self) -> String {
        mask_database_url(&self.url)
    }
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|pos| pos + 3).unwrap_or(0);
    if scheme_end > at_pos {
        return url.to_string();
    }
    format!("{}***:***@{}", &url[..scheme_end], &url[at_pos + 1..])
}
