//! Services module
//!
//! Lógica del camino de lectura de analítica: estrategias de agregación,
//! paginación por cursor y ensamblado de la respuesta.

pub mod aggregation;
pub mod assembler;
pub mod pagination;

pub use aggregation::{strategy_for, AggregationStrategy, DriverAggregate};
pub use pagination::{PageLimits, PageRequest, TripPage};
