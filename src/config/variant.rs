//! Selección de variante
//!
//! La variante `naive` y la `optimized` comparten el mismo servicio; sólo
//! cambian el gateway, la estrategia de agregación y el listado de viajes.

use std::fmt;
use std::str::FromStr;

/// Preset de la implementación a servir
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsVariant {
    Naive,
    Optimized,
}

/// Recurso de conexión del gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Single,
    Pooled,
}

/// Dónde se calculan los agregados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationKind {
    ClientSide,
    StoreSide,
}

/// Cómo se listan los viajes del conductor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripListing {
    FullHistory,
    Keyset,
}

/// Combinación concreta de las tres piezas intercambiables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantProfile {
    pub gateway: GatewayMode,
    pub aggregation: AggregationKind,
    pub listing: TripListing,
}

impl AnalyticsVariant {
    pub fn profile(self) -> VariantProfile {
        match self {
            AnalyticsVariant::Naive => VariantProfile {
                gateway: GatewayMode::Single,
                aggregation: AggregationKind::ClientSide,
                listing: TripListing::FullHistory,
            },
            AnalyticsVariant::Optimized => VariantProfile {
                gateway: GatewayMode::Pooled,
                aggregation: AggregationKind::StoreSide,
                listing: TripListing::Keyset,
            },
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            AnalyticsVariant::Naive => 5000,
            AnalyticsVariant::Optimized => 5002,
        }
    }

    pub fn compression_by_default(self) -> bool {
        matches!(self, AnalyticsVariant::Optimized)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsVariant::Naive => "naive",
            AnalyticsVariant::Optimized => "optimized",
        }
    }
}

impl fmt::Display for AnalyticsVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyticsVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" | "unoptimized" => Ok(AnalyticsVariant::Naive),
            "optimized" => Ok(AnalyticsVariant::Optimized),
            other => Err(other.to_string()),
        }
    }
}

impl GatewayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GatewayMode::Single => "single",
            GatewayMode::Pooled => "pooled",
        }
    }
}

impl fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(GatewayMode::Single),
            "pooled" | "pool" => Ok(GatewayMode::Pooled),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationKind::ClientSide => f.write_str("client"),
            AggregationKind::StoreSide => f.write_str("store"),
        }
    }
}

impl FromStr for AggregationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" | "client-side" => Ok(AggregationKind::ClientSide),
            "store" | "store-side" => Ok(AggregationKind::StoreSide),
            other => Err(other.to_string()),
        }
    }
}
