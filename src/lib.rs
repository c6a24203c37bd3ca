//! Driver Analytics
//!
//! Camino de lectura de analítica de conductores: agregados de rendimiento y
//! listado paginado de viajes, servido en dos variantes (`naive` y
//! `optimized`) que comparten el mismo código y difieren sólo en el gateway
//! de datos, la estrategia de agregación y el listado de viajes.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
