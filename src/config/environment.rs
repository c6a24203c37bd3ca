//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use validator::{Validate, ValidationError};

use super::variant::{AggregationKind, AnalyticsVariant, GatewayMode, VariantProfile};
use super::{env_optional, env_or};
use crate::utils::ConfigError;

/// Configuración del entorno
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_page_limits"))]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub variant: AnalyticsVariant,
    pub profile: VariantProfile,
    pub default_page_limit: u32,
    #[validate(range(min = 1))]
    pub max_page_limit: u32,
    pub compression: bool,
    pub cors_origins: Vec<String>,
}

fn validate_page_limits(config: &EnvironmentConfig) -> Result<(), ValidationError> {
    if config.default_page_limit > config.max_page_limit {
        let mut error = ValidationError::new("page_limits");
        error.add_param("default_page_limit".into(), &config.default_page_limit);
        error.add_param("max_page_limit".into(), &config.max_page_limit);
        return Err(error);
    }
    Ok(())
}

impl EnvironmentConfig {
    /// Valores por defecto de una variante, sin leer el entorno
    pub fn for_variant(variant: AnalyticsVariant) -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: variant.default_port(),
            variant,
            profile: variant.profile(),
            default_page_limit: 100,
            max_page_limit: 1000,
            compression: variant.compression_by_default(),
            cors_origins: Vec::new(),
        }
    }

    /// Cargar desde variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        let variant: AnalyticsVariant = env_or("ANALYTICS_VARIANT", AnalyticsVariant::Optimized)?;
        let defaults = Self::for_variant(variant);

        let profile = VariantProfile {
            gateway: env_or::<GatewayMode>("DB_GATEWAY_MODE", defaults.profile.gateway)?,
            aggregation: env_or::<AggregationKind>("AGGREGATION_STRATEGY", defaults.profile.aggregation)?,
            listing: defaults.profile.listing,
        };

        let config = Self {
            environment: env_optional("ENVIRONMENT").unwrap_or(defaults.environment),
            host: env_optional("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port)?,
            variant,
            profile,
            default_page_limit: env_or("PAGE_LIMIT_DEFAULT", defaults.default_page_limit)?,
            max_page_limit: env_or("PAGE_LIMIT_MAX", defaults.max_page_limit)?,
            compression: env_or("ENABLE_COMPRESSION", defaults.compression)?,
            cors_origins: env_optional("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
