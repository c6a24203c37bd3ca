//! Población de datos
//!
//! Aplicación del esquema e inserción de conductores, viajes, pagos y
//! valoraciones. Lo usan la herramienta `seed-database` y los tests de
//! integración; el servicio de analítica nunca escribe.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{Executor, QueryBuilder};
use tracing::info;

use super::DatabaseError;
use crate::config::env_or;
use crate::utils::ConfigError;

/// Esquema completo, idempotente
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

const LOCATIONS: &[&str] = &[
    "Downtown",
    "Airport",
    "Mall",
    "University",
    "Hospital",
    "Suburb",
    "Business District",
    "Residential Area",
    "Shopping Center",
    "Train Station",
    "Bus Terminal",
    "Park",
    "Restaurant",
    "Hotel",
];

const COMMENTS: &[&str] = &[
    "Great service",
    "Good ride",
    "Excellent driver",
    "Safe trip",
    "On time",
    "Clean car",
    "Professional",
    "Friendly",
    "Comfortable",
    "Smooth ride",
    "Very helpful",
    "Great communication",
    "Punctual",
    "Courteous driver",
    "Well maintained vehicle",
    "Good navigation",
];

/// Máximo de filas por INSERT multi-fila
const INSERT_CHUNK: usize = 1000;

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub driver_name: String,
    pub phone_number: String,
    pub onboarding_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub driver_id: i64,
    pub start_location: String,
    pub end_location: String,
    pub trip_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub trip_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub trip_id: i64,
    pub rating_value: i16,
    pub comment: Option<String>,
}

/// Aplicar el esquema (CREATE ... IF NOT EXISTS)
pub async fn apply_schema<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    executor.execute(SCHEMA_SQL).await?;
    Ok(())
}

pub async fn insert_driver<'e, E>(executor: E, driver: &NewDriver) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (driver_id,): (i64,) = sqlx::query_as(
        "INSERT INTO drivers (driver_name, phone_number, onboarding_date) VALUES ($1, $2, $3) RETURNING driver_id",
    )
    .bind(&driver.driver_name)
    .bind(&driver.phone_number)
    .bind(driver.onboarding_date)
    .fetch_one(executor)
    .await?;
    Ok(driver_id)
}

pub async fn insert_trip<'e, E>(executor: E, trip: &NewTrip) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (trip_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO trips (driver_id, start_location, end_location, trip_date)
        VALUES ($1, $2, $3, $4)
        RETURNING trip_id
        "#,
    )
    .bind(trip.driver_id)
    .bind(&trip.start_location)
    .bind(&trip.end_location)
    .bind(trip.trip_date)
    .fetch_one(executor)
    .await?;
    Ok(trip_id)
}

pub async fn insert_payment<'e, E>(executor: E, payment: &NewPayment) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("INSERT INTO payments (trip_id, amount, payment_date) VALUES ($1, $2, $3)")
        .bind(payment.trip_id)
        .bind(payment.amount)
        .bind(payment.payment_date)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn insert_rating<'e, E>(executor: E, rating: &NewRating) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("INSERT INTO ratings (trip_id, rating_value, comment) VALUES ($1, $2, $3)")
        .bind(rating.trip_id)
        .bind(rating.rating_value)
        .bind(&rating.comment)
        .execute(executor)
        .await?;
    Ok(())
}

/// INSERT multi-fila de viajes; devuelve `(trip_id, trip_date)` de cada uno
pub async fn insert_trips<'e, E>(executor: E, trips: &[NewTrip]) -> Result<Vec<(i64, NaiveDate)>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    if trips.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder =
        QueryBuilder::<Postgres>::new("INSERT INTO trips (driver_id, start_location, end_location, trip_date) ");
    builder.push_values(trips, |mut row, trip| {
        row.push_bind(trip.driver_id)
            .push_bind(trip.start_location.clone())
            .push_bind(trip.end_location.clone())
            .push_bind(trip.trip_date);
    });
    builder.push(" RETURNING trip_id, trip_date");

    builder.build_query_as().fetch_all(executor).await
}

pub async fn insert_payments<'e, E>(executor: E, payments: &[NewPayment]) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    if payments.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO payments (trip_id, amount, payment_date) ");
    builder.push_values(payments, |mut row, payment| {
        row.push_bind(payment.trip_id)
            .push_bind(payment.amount)
            .push_bind(payment.payment_date);
    });

    Ok(builder.build().execute(executor).await?.rows_affected())
}

pub async fn insert_ratings<'e, E>(executor: E, ratings: &[NewRating]) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    if ratings.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ratings (trip_id, rating_value, comment) ");
    builder.push_values(ratings, |mut row, rating| {
        row.push_bind(rating.trip_id)
            .push_bind(rating.rating_value)
            .push_bind(rating.comment.clone());
    });

    Ok(builder.build().execute(executor).await?.rows_affected())
}

/// Parámetros de una población aleatoria
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub drivers: u32,
    pub trips_per_driver: u32,
    pub payment_ratio: f64,
    pub rating_ratio: f64,
    pub rng_seed: u64,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            drivers: 1000,
            trips_per_driver: 1000,
            payment_ratio: 1.0,
            rating_ratio: 1.0,
            rng_seed: 42,
        }
    }
}

impl SeedPlan {
    /// SEED_DRIVERS, SEED_TRIPS_PER_DRIVER, SEED_PAYMENT_RATIO, SEED_RATING_RATIO, SEED_RNG_SEED
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let plan = Self {
            drivers: env_or("SEED_DRIVERS", defaults.drivers)?,
            trips_per_driver: env_or("SEED_TRIPS_PER_DRIVER", defaults.trips_per_driver)?,
            payment_ratio: env_or("SEED_PAYMENT_RATIO", defaults.payment_ratio)?,
            rating_ratio: env_or("SEED_RATING_RATIO", defaults.rating_ratio)?,
            rng_seed: env_or("SEED_RNG_SEED", defaults.rng_seed)?,
        };

        for (key, ratio) in [
            ("SEED_PAYMENT_RATIO", plan.payment_ratio),
            ("SEED_RATING_RATIO", plan.rating_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::Invalid {
                    key,
                    value: ratio.to_string(),
                });
            }
        }

        Ok(plan)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub drivers: u64,
    pub trips: u64,
    pub payments: u64,
    pub ratings: u64,
}

/// Día `offset` (0..365) del año dado
fn day_in_year(year: i32, offset: u32) -> NaiveDate {
    NaiveDate::from_yo_opt(year, offset % 365 + 1).unwrap_or_default()
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

pub fn random_driver(rng: &mut StdRng, index: u32) -> NewDriver {
    NewDriver {
        driver_name: format!("Driver {}", index),
        phone_number: format!("+1234567{:03}", index),
        onboarding_date: day_in_year(2023, rng.gen_range(0..365)),
    }
}

pub fn random_trip(rng: &mut StdRng, driver_id: i64) -> NewTrip {
    NewTrip {
        driver_id,
        start_location: pick(rng, LOCATIONS).to_string(),
        end_location: pick(rng, LOCATIONS).to_string(),
        trip_date: day_in_year(2024, rng.gen_range(0..365)),
    }
}

/// Poblar la base con datos aleatorios reproducibles
///
/// Una transacción por conductor; los viajes van en INSERTs de hasta mil filas.
pub async fn seed_random(pool: &PgPool, plan: &SeedPlan) -> Result<SeedReport, DatabaseError> {
    let mut rng = StdRng::seed_from_u64(plan.rng_seed);
    let mut report = SeedReport::default();

    for index in 1..=plan.drivers {
        let mut tx = pool.begin().await.map_err(DatabaseError::Connection)?;

        let driver = random_driver(&mut rng, index);
        let driver_id = insert_driver(&mut *tx, &driver)
            .await
            .map_err(DatabaseError::Query)?;
        report.drivers += 1;

        let trips: Vec<NewTrip> = (0..plan.trips_per_driver)
            .map(|_| random_trip(&mut rng, driver_id))
            .collect();

        for chunk in trips.chunks(INSERT_CHUNK) {
            let inserted = insert_trips(&mut *tx, chunk).await.map_err(DatabaseError::Query)?;
            report.trips += inserted.len() as u64;

            let mut payments = Vec::new();
            let mut ratings = Vec::new();
            for (trip_id, trip_date) in inserted {
                if rng.gen_bool(plan.payment_ratio.clamp(0.0, 1.0)) {
                    payments.push(NewPayment {
                        trip_id,
                        amount: Decimal::new(rng.gen_range(1500..=11500), 2),
                        payment_date: trip_date + chrono::Duration::days(rng.gen_range(0..3)),
                    });
                }
                if rng.gen_bool(plan.rating_ratio.clamp(0.0, 1.0)) {
                    ratings.push(NewRating {
                        trip_id,
                        rating_value: rng.gen_range(1..=5),
                        comment: Some(pick(&mut rng, COMMENTS).to_string()),
                    });
                }
            }

            report.payments += insert_payments(&mut *tx, &payments)
                .await
                .map_err(DatabaseError::Query)?;
            report.ratings += insert_ratings(&mut *tx, &ratings)
                .await
                .map_err(DatabaseError::Query)?;
        }

        tx.commit().await.map_err(DatabaseError::Query)?;

        if index % 100 == 0 || index == plan.drivers {
            info!("🌱 Conductores poblados: {}/{}", index, plan.drivers);
        }
    }

    Ok(report)
}
