//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! de conductores, viajes, pagos y valoraciones.

pub mod driver;
pub mod trip;

pub use driver::{Driver, DriverSummaryRow, DriverTotals};
pub use trip::{DriverTripRow, TripCursor, TripRow};
