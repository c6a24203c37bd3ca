use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use driver_analytics::config::{DatabaseConfig, EnvironmentConfig, TripListing};
use driver_analytics::database::DataGateway;
use driver_analytics::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("driver_analytics=debug,tower_http=info")),
        )
        .init();

    let config = EnvironmentConfig::from_env()?;
    let database = DatabaseConfig::from_env()?;

    info!("🚗 Driver Analytics - variante {}", config.variant);
    info!("================================================");
    info!("   Gateway: {}", config.profile.gateway);
    info!("   Agregación: {}", config.profile.aggregation);
    info!(
        "   Listado: {}",
        match config.profile.listing {
            TripListing::Keyset => "paginado por cursor",
            TripListing::FullHistory => "historial completo",
        }
    );
    info!("   Base de datos: {}", database.masked_url());
    if config.compression {
        info!("   Compresión activada");
    }
    if config.cors_origins.is_empty() && !config.is_development() {
        warn!("⚠️ CORS permisivo fuera de desarrollo; define CORS_ORIGINS");
    }

    // El gateway no conecta hasta la primera consulta
    let gateway = Arc::new(DataGateway::new(config.profile.gateway, database)?);

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::new(config, gateway));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /api/v1/drivers/:driver_id/analytics - Analítica del conductor");
    info!("   GET  /health - Estado del servicio");
    info!("   GET  /metrics - Métricas Prometheus");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
