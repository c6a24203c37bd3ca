//! Población de la base de datos de analítica
//!
//! Aplica `sql/schema.sql` e inserta conductores, viajes, pagos y valoraciones
//! aleatorios (reproducibles con `SEED_RNG_SEED`).
//!
//! Uso: `seed-database [--schema-only]`

use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use driver_analytics::config::DatabaseConfig;
use driver_analytics::database::seed::{apply_schema, seed_random, SeedPlan};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("driver_analytics=info,seed_database=info")),
        )
        .init();

    let schema_only = env::args().skip(1).any(|arg| arg == "--schema-only");
    let database = DatabaseConfig::from_env()?;
    let plan = SeedPlan::from_env()?;

    info!("🌱 Poblando {}", database.masked_url());
    let pool = database.create_pool(database.connect_options()?).await?;

    apply_schema(&pool).await?;
    info!("✅ Esquema aplicado");

    if schema_only {
        return Ok(());
    }

    info!(
        "🌱 {} conductores x {} viajes (pagos {:.0}%, valoraciones {:.0}%, semilla {})",
        plan.drivers,
        plan.trips_per_driver,
        plan.payment_ratio * 100.0,
        plan.rating_ratio * 100.0,
        plan.rng_seed
    );

    let started = Instant::now();
    let report = seed_random(&pool, &plan).await?;

    info!("✅ Población completada en {:.1}s", started.elapsed().as_secs_f64());
    info!("   Conductores: {}", report.drivers);
    info!("   Viajes: {}", report.trips);
    info!("   Pagos: {}", report.payments);
    info!("   Valoraciones: {}", report.ratings);

    pool.close().await;
    Ok(())
}
