//! Métricas de consultas
//!
//! Contadores Prometheus alrededor de cada consulta ejecutada por el gateway.
//! El pico de consultas simultáneas es lo que distingue a la variante de una
//! sola conexión de la variante con pool.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Registro de métricas del gateway
pub struct QueryMetrics {
    registry: Registry,
    in_flight: IntGauge,
    queries: IntCounterVec,
    duration: Histogram,
    peak_in_flight: AtomicI64,
}

/// Foto de los contadores para el endpoint de salud
#[derive(Debug, Clone, Serialize)]
pub struct QueryStats {
    pub in_flight: i64,
    pub peak_in_flight: i64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Resultado de una consulta, usado como etiqueta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Ok,
    Error,
}

impl QueryOutcome {
    fn label(self) -> &'static str {
        match self {
            QueryOutcome::Ok => "ok",
            QueryOutcome::Error => "error",
        }
    }
}

impl QueryMetrics {
    pub fn new(gateway_mode: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(
            Some("driver_analytics".to_string()),
            Some([("gateway".to_string(), gateway_mode.to_string())].into_iter().collect()),
        )?;

        let in_flight = IntGauge::new("queries_in_flight", "Queries currently executing at the store boundary")?;
        let queries = IntCounterVec::new(
            Opts::new("queries_total", "Queries executed by outcome"),
            &["outcome"],
        )?;
        let duration = Histogram::with_opts(HistogramOpts::new(
            "query_duration_seconds",
            "Query execution time once a connection handle is held",
        ))?;

        registry.register(Box::new(in_flight.clone()))?;
        registry.register(Box::new(queries.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            in_flight,
            queries,
            duration,
            peak_in_flight: AtomicI64::new(0),
        })
    }

    /// Marcar el inicio de una consulta; el guard la cierra al soltarse
    pub fn begin(&self) -> InFlightGuard<'_> {
        self.in_flight.inc();
        self.peak_in_flight
            .fetch_max(self.in_flight.get(), Ordering::SeqCst);
        InFlightGuard {
            metrics: self,
            started: Instant::now(),
            outcome: None,
        }
    }

    pub fn snapshot(&self) -> QueryStats {
        QueryStats {
            in_flight: self.in_flight.get(),
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
            succeeded: self.queries.with_label_values(&[QueryOutcome::Ok.label()]).get(),
            failed: self.queries.with_label_values(&[QueryOutcome::Error.label()]).get(),
        }
    }

    /// Exportar en formato texto de Prometheus
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Consulta en curso
pub struct InFlightGuard<'a> {
    metrics: &'a QueryMetrics,
    started: Instant,
    outcome: Option<QueryOutcome>,
}

impl InFlightGuard<'_> {
    pub fn record(mut self, outcome: QueryOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.metrics.in_flight.dec();
        self.metrics
            .duration
            .observe(self.started.elapsed().as_secs_f64());
        // Un future cancelado a mitad de consulta cuenta como error
        let outcome = self.outcome.unwrap_or(QueryOutcome::Error);
        self.metrics
            .queries
            .with_label_values(&[outcome.label()])
            .inc();
    }
}
