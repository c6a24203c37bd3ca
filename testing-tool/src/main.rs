//! Generador de carga para la API de analítica de conductores
//!
//! Lanza peticiones concurrentes contra `/api/v1/drivers/{id}/analytics`,
//! opcionalmente siguiendo el cursor de paginación, y resume estados,
//! latencias y el pico de consultas simultáneas que reporta `/health`.

use anyhow::Result;
use clap::Parser;
use colored::*;
use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Parser, Debug, Clone)]
#[command(name = "testing-tool", about = "Generador de carga para la API de analítica de conductores")]
struct Args {
    /// URL base del servidor
    #[arg(long, default_value = "http://localhost:5002")]
    base_url: String,

    /// Peticiones simultáneas
    #[arg(short, long, default_value_t = 50)]
    concurrency: usize,

    /// Total de peticiones (sin contar las páginas seguidas)
    #[arg(short = 'n', long, default_value_t = 1000)]
    requests: usize,

    #[arg(long, default_value_t = 1)]
    min_driver: i64,

    #[arg(long, default_value_t = 100)]
    max_driver: i64,

    /// Tamaño de página (sólo variante optimizada)
    #[arg(long)]
    limit: Option<u32>,

    /// Páginas adicionales a seguir con `nextCursorToken`
    #[arg(long, default_value_t = 0)]
    follow_pages: u32,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Semilla para elegir conductores de forma reproducible
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Resultado de una petición individual
#[derive(Debug, Clone)]
struct Sample {
    status: Option<u16>,
    latency: Duration,
}

impl Sample {
    fn label(&self) -> String {
        match self.status {
            Some(status) => status.to_string(),
            None => "error".to_string(),
        }
    }

    /// 404 es una respuesta válida del contrato, no un fallo
    fn is_failure(&self) -> bool {
        !matches!(self.status, Some(200) | Some(404))
    }
}

fn analytics_url(args: &Args, driver_id: i64, cursor: Option<&str>) -> String {
    let mut url = format!("{}/api/v1/drivers/{}/analytics", args.base_url.trim_end_matches('/'), driver_id);
    let mut params = Vec::new();
    if let Some(limit) = args.limit {
        params.push(format!("limit={}", limit));
    }
    if let Some(cursor) = cursor {
        params.push(format!("cursor={}", cursor));
    }
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    url
}

async fn fetch(client: &reqwest::Client, url: &str) -> (Sample, Option<Value>) {
    let started = Instant::now();
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let body = response.json::<Value>().await.ok();
            (
                Sample {
                    status: Some(status),
                    latency: started.elapsed(),
                },
                body,
            )
        }
        Err(_) => (
            Sample {
                status: None,
                latency: started.elapsed(),
            },
            None,
        ),
    }
}

/// Una petición más las páginas siguientes que se pidan
async fn run_driver(client: reqwest::Client, args: Args, driver_id: i64) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(1 + args.follow_pages as usize);
    let mut cursor: Option<String> = None;

    for _ in 0..=args.follow_pages {
        let url = analytics_url(&args, driver_id, cursor.as_deref());
        let (sample, body) = fetch(&client, &url).await;
        samples.push(sample);

        cursor = body
            .as_ref()
            .and_then(|body| body["pagination"]["nextCursorToken"].as_str())
            .map(str::to_string);
        if cursor.is_none() {
            break;
        }
    }
    samples
}

/// Percentil por rango más cercano sobre latencias ordenadas
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn print_summary(samples: &[Sample], elapsed: Duration) {
    let mut statuses: BTreeMap<String, usize> = BTreeMap::new();
    for sample in samples {
        *statuses.entry(sample.label()).or_default() += 1;
    }
    let failures = samples.iter().filter(|s| s.is_failure()).count();

    let mut latencies: Vec<Duration> = samples.iter().map(|s| s.latency).collect();
    latencies.sort();

    println!();
    println!("{}", "📊 RESUMEN".bright_green().bold());
    println!("{}", "==========".bright_green());
    println!("Peticiones: {}", samples.len());
    for (status, count) in &statuses {
        let line = format!("  {:>6}: {}", status, count);
        if status == "200" {
            println!("{}", line.green());
        } else if status == "404" {
            println!("{}", line.yellow());
        } else {
            println!("{}", line.red());
        }
    }

    let error_rate = if samples.is_empty() {
        0.0
    } else {
        failures as f64 / samples.len() as f64 * 100.0
    };
    let error_line = format!("Tasa de error: {:.2}%", error_rate);
    if failures == 0 {
        println!("{}", error_line.green());
    } else {
        println!("{}", error_line.red());
    }

    println!("Duración: {:.2}s", elapsed.as_secs_f64());
    println!("Throughput: {:.1} req/s", samples.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON));
    println!("Latencia p50: {:?}", percentile(&latencies, 50.0));
    println!("Latencia p95: {:?}", percentile(&latencies, 95.0));
    println!("Latencia p99: {:?}", percentile(&latencies, 99.0));
}

async fn print_gateway_peak(client: &reqwest::Client, base_url: &str) {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let health = match client.get(&url).send().await {
        Ok(response) => response.json::<Value>().await.ok(),
        Err(_) => None,
    };

    match health {
        Some(health) => {
            let gateway = &health["gateway"];
            println!(
                "{} modo {}, pico de consultas simultáneas {}",
                "🔗 Gateway:".bright_blue(),
                gateway["mode"].as_str().unwrap_or("?"),
                gateway["queries"]["peak_in_flight"]
            );
        }
        None => println!("{}", "⚠️ No se pudo leer /health".yellow()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.min_driver <= args.max_driver, "min-driver must not exceed max-driver");
    anyhow::ensure!(args.concurrency > 0, "concurrency must be positive");

    println!("{}", "🚗 Driver Analytics Load Tester".bright_blue().bold());
    println!("{}", "===============================".bright_blue());
    println!("Servidor: {}", args.base_url);
    println!(
        "Peticiones: {} (concurrencia {}, conductores {}..={})",
        args.requests, args.concurrency, args.min_driver, args.max_driver
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .pool_max_idle_per_host(args.concurrency)
        .build()?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let driver_ids: Vec<i64> = (0..args.requests)
        .map(|_| rng.gen_range(args.min_driver..=args.max_driver))
        .collect();

    let started = Instant::now();
    let samples: Vec<Sample> = stream::iter(driver_ids)
        .map(|driver_id| run_driver(client.clone(), args.clone(), driver_id))
        .buffer_unordered(args.concurrency)
        .collect::<Vec<Vec<Sample>>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    print_summary(&samples, started.elapsed());
    print_gateway_peak(&client, &args.base_url).await;
    Ok(())
}
