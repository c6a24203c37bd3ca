//! Módulo de base de datos
//!
//! Gateway de acceso a PostgreSQL (conexión única o pool), métricas de
//! consultas y utilidades de población.

pub mod connection;
pub mod error;
pub mod metrics;
pub mod seed;

pub use connection::{DataGateway, GatewayHandle, GatewayStatus, SharedConnection};
pub use error::DatabaseError;
pub use metrics::{QueryMetrics, QueryStats};
