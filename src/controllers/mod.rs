//! Controladores HTTP

pub mod driver_analytics_controller;

pub use driver_analytics_controller::DriverAnalyticsController;
