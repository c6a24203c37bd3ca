//! Repositorios de acceso a datos

pub mod driver_analytics_repository;

pub use driver_analytics_repository::DriverAnalyticsRepository;
