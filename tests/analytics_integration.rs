//! Tests end-to-end contra PostgreSQL
//!
//! Sólo corren si `TEST_DATABASE_URL` está definida; cada test trabaja en un
//! esquema propio que se elimina al terminar.

mod common;

use axum::http::StatusCode;
use axum::Router;
use chrono::NaiveDate;
use futures::future::join_all;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use driver_analytics::config::{
    AggregationKind, AnalyticsVariant, DatabaseConfig, GatewayMode, TripListing, VariantProfile,
};
use driver_analytics::database::seed::{
    apply_schema, insert_driver, insert_payment, insert_rating, insert_trip, NewDriver, NewPayment, NewRating,
    NewTrip,
};
use driver_analytics::database::{DataGateway, DatabaseError};

use common::{build_app, get_json};

struct TestDb {
    admin: PgPool,
    pool: PgPool,
    config: DatabaseConfig,
    schema: String,
}

impl TestDb {
    async fn setup() -> Option<Self> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return None;
        };

        let admin = PgPoolOptions::new().max_connections(1).connect(&url).await.unwrap();
        let schema = format!("analytics_test_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await
            .unwrap();

        let mut config = DatabaseConfig::with_url(url);
        config.schema = Some(schema.clone());
        config.max_connections = 4;

        let pool = config.create_pool(config.connect_options().unwrap()).await.unwrap();
        apply_schema(&pool).await.unwrap();

        Some(Self {
            admin,
            pool,
            config,
            schema,
        })
    }

    async fn teardown(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
    }

    fn app(&self, variant: AnalyticsVariant) -> Router {
        build_app(variant, None, self.config.clone()).0
    }

    fn app_with(&self, profile: VariantProfile) -> Router {
        build_app(AnalyticsVariant::Optimized, Some(profile), self.config.clone()).0
    }

    fn gateway(&self, mode: GatewayMode) -> DataGateway {
        DataGateway::new(mode, self.config.clone()).unwrap()
    }

    async fn driver(&self, index: u32) -> i64 {
        insert_driver(
            &self.pool,
            &NewDriver {
                driver_name: format!("Driver {}", index),
                phone_number: format!("+1234567{:03}", index),
                onboarding_date: date("2023-03-01"),
            },
        )
        .await
        .unwrap()
    }

    async fn trip(&self, driver_id: i64, trip_date: &str) -> i64 {
        insert_trip(
            &self.pool,
            &NewTrip {
                driver_id,
                start_location: "Downtown".to_string(),
                end_location: "Airport".to_string(),
                trip_date: date(trip_date),
            },
        )
        .await
        .unwrap()
    }

    async fn pay(&self, trip_id: i64, amount: &str) {
        insert_payment(
            &self.pool,
            &NewPayment {
                trip_id,
                amount: Decimal::from_str(amount).unwrap(),
                payment_date: date("2024-12-31"),
            },
        )
        .await
        .unwrap()
    }

    async fn rate(&self, trip_id: i64, rating_value: i16) {
        insert_rating(
            &self.pool,
            &NewRating {
                trip_id,
                rating_value,
                comment: Some("Smooth ride".to_string()),
            },
        )
        .await
        .unwrap()
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn all_profiles() -> Vec<VariantProfile> {
    let mut profiles = Vec::new();
    for gateway in [GatewayMode::Single, GatewayMode::Pooled] {
        for aggregation in [AggregationKind::ClientSide, AggregationKind::StoreSide] {
            for listing in [TripListing::FullHistory, TripListing::Keyset] {
                profiles.push(VariantProfile {
                    gateway,
                    aggregation,
                    listing,
                });
            }
        }
    }
    profiles
}

fn trip_ids(body: &Value) -> Vec<i64> {
    body["trips"]
        .as_array()
        .unwrap()
        .iter()
        .map(|trip| trip["trip_id"].as_i64().unwrap())
        .collect()
}

async fn analytics(app: &Router, driver_id: i64, query: &str) -> (StatusCode, Value) {
    get_json(app, &format!("/api/v1/drivers/{}/analytics{}", driver_id, query)).await
}

/// Recorrer todas las páginas siguiendo `nextCursor`
async fn walk_pages(app: &Router, driver_id: i64, limit: u32, use_token: bool) -> Vec<Vec<i64>> {
    let mut pages = Vec::new();
    let mut query = format!("?limit={}", limit);
    loop {
        let (status, body) = analytics(app, driver_id, &query).await;
        assert_eq!(status, StatusCode::OK);
        let ids = trip_ids(&body);
        assert!(ids.len() <= limit as usize);
        pages.push(ids);

        let pagination = &body["pagination"];
        if pagination["hasNextPage"] != true {
            assert_eq!(pagination["nextCursor"], Value::Null);
            break;
        }
        query = if use_token {
            format!("?limit={}&cursor={}", limit, pagination["nextCursorToken"].as_str().unwrap())
        } else {
            format!(
                "?limit={}&cursor_date={}&cursor_id={}",
                limit,
                pagination["nextCursor"]["cursor_date"].as_str().unwrap(),
                pagination["nextCursor"]["cursor_id"]
            )
        };
    }
    pages
}

#[tokio::test]
async fn test_strategies_agree_on_totals() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    let t1 = db.trip(driver, "2024-01-10").await;
    let t2 = db.trip(driver, "2024-01-11").await;
    let t3 = db.trip(driver, "2024-01-11").await;
    let t4 = db.trip(driver, "2024-02-01").await;
    let _t5 = db.trip(driver, "2024-02-03").await;
    db.pay(t1, "20.50").await;
    db.pay(t2, "15.25").await;
    db.pay(t4, "100.00").await;
    db.rate(t1, 5).await;
    db.rate(t3, 4).await;
    db.rate(t4, 4).await;

    for profile in all_profiles() {
        let app = db.app_with(profile);
        let (status, body) = analytics(&app, driver, "").await;
        assert_eq!(status, StatusCode::OK, "{:?}", profile);
        assert_eq!(body["success"], true);
        assert_eq!(body["driver"]["driver_id"], driver);
        assert_eq!(body["totalTrips"], 5, "{:?}", profile);
        assert_eq!(body["totalEarnings"], 135.75, "{:?}", profile);
        assert_eq!(body["averageRating"], 4.33, "{:?}", profile);
        assert_eq!(body.get("pagination").is_some(), profile.listing == TripListing::Keyset);
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_trips_are_ordered_by_date_then_id() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    let a = db.trip(driver, "2024-03-01").await;
    let b = db.trip(driver, "2024-03-05").await;
    let c = db.trip(driver, "2024-03-01").await;
    let d = db.trip(driver, "2024-03-05").await;

    let expected = vec![d, b, c, a];
    for variant in [AnalyticsVariant::Naive, AnalyticsVariant::Optimized] {
        let (_, body) = analytics(&db.app(variant), driver, "").await;
        assert_eq!(trip_ids(&body), expected, "variant {}", variant);
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_cursor_walk_is_contiguous() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    let mut all = Vec::new();
    for day in [3, 1, 4, 1, 5, 9, 2] {
        all.push((date(&format!("2024-04-{:02}", day)), db.trip(driver, &format!("2024-04-{:02}", day)).await));
    }
    all.sort_by(|a, b| b.cmp(a));
    let expected: Vec<i64> = all.into_iter().map(|(_, id)| id).collect();

    let app = db.app(AnalyticsVariant::Optimized);
    for use_token in [false, true] {
        let pages = walk_pages(&app, driver, 3, use_token).await;
        assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 3, 1]);
        assert_eq!(pages.concat(), expected);
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_cursor_survives_newer_inserts_and_deleted_anchor() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    let mut ids = Vec::new();
    for day in 1..=6 {
        ids.push(db.trip(driver, &format!("2024-05-{:02}", day)).await);
    }
    let app = db.app(AnalyticsVariant::Optimized);

    let (_, first) = analytics(&app, driver, "?limit=2").await;
    assert_eq!(trip_ids(&first), vec![ids[5], ids[4]]);
    let cursor = &first["pagination"]["nextCursor"];
    assert_eq!(cursor["cursor_id"], ids[4]);

    // Un viaje más reciente no desplaza la página siguiente
    db.trip(driver, "2024-06-30").await;
    let next_query = format!(
        "?limit=2&cursor_date={}&cursor_id={}",
        cursor["cursor_date"].as_str().unwrap(),
        cursor["cursor_id"]
    );
    let (_, second) = analytics(&app, driver, &next_query).await;
    assert_eq!(trip_ids(&second), vec![ids[3], ids[2]]);

    // El cursor es posicional: borrar el viaje ancla no cambia nada
    sqlx::query("DELETE FROM trips WHERE trip_id = $1")
        .bind(ids[4])
        .execute(&db.pool)
        .await
        .unwrap();
    let (_, again) = analytics(&app, driver, &next_query).await;
    assert_eq!(trip_ids(&again), vec![ids[3], ids[2]]);

    // Timestamp RFC 3339 como en la API original
    let (status, rfc) = analytics(
        &app,
        driver,
        &format!("?limit=2&cursor_date=2024-05-05T00:00:00.000Z&cursor_id={}", ids[4]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trip_ids(&rfc), vec![ids[3], ids[2]]);

    db.teardown().await;
}

#[tokio::test]
async fn test_repeated_request_is_identical() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    for day in 1..=5 {
        let trip = db.trip(driver, &format!("2024-07-{:02}", day % 3 + 1)).await;
        db.pay(trip, "30.00").await;
    }

    for variant in [AnalyticsVariant::Naive, AnalyticsVariant::Optimized] {
        let app = db.app(variant);
        let (_, first) = analytics(&app, driver, "?limit=3").await;
        let (_, second) = analytics(&app, driver, "?limit=3").await;
        assert_eq!(first, second, "variant {}", variant);
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_driver_without_trips() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    for profile in all_profiles() {
        let (status, body) = analytics(&db.app_with(profile), driver, "").await;
        assert_eq!(status, StatusCode::OK, "{:?}", profile);
        assert_eq!(body["totalTrips"], 0);
        assert_eq!(body["totalEarnings"], 0.0);
        assert_eq!(body["averageRating"], 0.0);
        assert_eq!(body["trips"], json!([]));
        if profile.listing == TripListing::Keyset {
            assert_eq!(body["pagination"]["hasNextPage"], false);
            assert_eq!(body["pagination"]["nextCursor"], Value::Null);
        }
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_unknown_driver_is_404() {
    let Some(db) = TestDb::setup().await else { return };

    db.driver(1).await;
    for variant in [AnalyticsVariant::Naive, AnalyticsVariant::Optimized] {
        let (status, body) = analytics(&db.app(variant), 999_999_999, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Driver not found");
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_payment_and_rating_are_independent() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    let paid = db.trip(driver, "2024-08-02").await;
    let rated = db.trip(driver, "2024-08-01").await;
    db.pay(paid, "0.00").await;
    db.rate(rated, 3).await;

    for variant in [AnalyticsVariant::Naive, AnalyticsVariant::Optimized] {
        let (_, body) = analytics(&db.app(variant), driver, "").await;
        let trips = body["trips"].as_array().unwrap();

        assert_eq!(trips[0]["trip_id"], paid);
        assert_eq!(trips[0]["payment"]["amount"], 0.0);
        assert_eq!(trips[0]["payment"]["payment_date"], "2024-12-31");
        assert_eq!(trips[0]["rating"], Value::Null);

        assert_eq!(trips[1]["trip_id"], rated);
        assert_eq!(trips[1]["payment"], Value::Null);
        assert_eq!(trips[1]["rating"]["rating_value"], 3);
        assert_eq!(trips[1]["rating"]["comment"], "Smooth ride");
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_limit_edges() {
    let Some(db) = TestDb::setup().await else { return };

    let driver = db.driver(1).await;
    db.trip(driver, "2024-09-01").await;
    let app = db.app(AnalyticsVariant::Optimized);

    let (status, body) = analytics(&app, driver, "?limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trips"], json!([]));
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["pagination"]["showingTrips"], 0);

    let (_, body) = analytics(&app, driver, "?limit=5000").await;
    assert_eq!(body["pagination"]["limit"], 1000);

    let (_, body) = analytics(&app, driver, "?limit=abc").await;
    assert_eq!(body["pagination"]["limit"], 100);

    db.teardown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_store_boundary_concurrency() {
    let Some(db) = TestDb::setup().await else { return };

    for (mode, bound) in [(GatewayMode::Single, 1), (GatewayMode::Pooled, 4)] {
        let gateway = Arc::new(db.gateway(mode));
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let gateway = gateway.clone();
                tokio::spawn(async move {
                    gateway
                        .fetch_optional(sqlx::query_as::<_, (i32,)>("SELECT 1 AS one FROM pg_sleep(0.05)"))
                        .await
                })
            })
            .collect();
        for result in join_all(tasks).await {
            assert!(result.unwrap().is_ok());
        }

        let stats = gateway.metrics().snapshot();
        assert_eq!(stats.succeeded, 16);
        assert_eq!(stats.in_flight, 0);
        assert!(stats.peak_in_flight >= 1);
        assert!(stats.peak_in_flight <= bound, "mode {} peak {}", mode, stats.peak_in_flight);
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_query_error_keeps_gateway_usable() {
    let Some(db) = TestDb::setup().await else { return };

    for mode in [GatewayMode::Single, GatewayMode::Pooled] {
        let gateway = db.gateway(mode);
        let result = gateway
            .fetch_all(sqlx::query_as::<_, (i64,)>("SELECT trip_id FROM missing_table"))
            .await;
        assert!(matches!(result, Err(DatabaseError::Query(_))), "mode {}", mode);

        assert!(gateway.ping().await.is_ok());
        let stats = gateway.metrics().snapshot();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.succeeded, 1);
        assert!(gateway.status().connected);
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_terminated_backend_is_replaced() {
    let Some(db) = TestDb::setup().await else { return };

    for mode in [GatewayMode::Single, GatewayMode::Pooled] {
        let gateway = db.gateway(mode);
        let (pid,) = gateway
            .fetch_optional(sqlx::query_as::<_, (i32,)>("SELECT pg_backend_pid()"))
            .await
            .unwrap()
            .unwrap();

        let (terminated,): (bool,) = sqlx::query_as("SELECT pg_terminate_backend($1)")
            .bind(pid)
            .fetch_one(&db.admin)
            .await
            .unwrap();
        assert!(terminated, "mode {}", mode);
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        // La primera consulta puede toparse con la conexión muerta; la siguiente no
        let _ = gateway.ping().await;
        assert!(gateway.ping().await.is_ok(), "mode {}", mode);

        let (new_pid,) = gateway
            .fetch_optional(sqlx::query_as::<_, (i32,)>("SELECT pg_backend_pid()"))
            .await
            .unwrap()
            .unwrap();
        assert_ne!(new_pid, pid, "mode {}", mode);
    }

    db.teardown().await;
}
