//! # Optima Licensing Server
//!
//! Loads configuration, wires the license service and the resilient
//! organisation lookup, and runs until a shutdown signal arrives.

use optima_config::{ConfigLoader, ObservabilityConfig};
use optima_core::OptimaResult;
use optima_server::di::{AppModule, AppModuleBuilder};
use optima_server::startup::print_startup_info;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_loader = match ConfigLoader::from_default_location() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let config = config_loader.get();

    init_logging(&config.observability);

    info!("Starting {} v{}", config.app.name, env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if config.observability.metrics_enabled {
        optima_resilience::metrics::register_metrics();
        optima_service::metrics::register_metrics();
    }

    if let Err(e) = run(config_loader).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config_loader: ConfigLoader) -> OptimaResult<()> {
    let config = config_loader.get();
    print_startup_info(&config);

    let module = AppModuleBuilder::new().with_config(config).build()?;
    info!("Optima Licensing ready");

    shutdown_signal().await;

    log_breaker_states(&module);
    info!("Server shutdown complete");
    Ok(())
}

fn log_breaker_states(module: &AppModule) {
    for pipeline in [module.license_pipeline(), module.organisation_pipeline()] {
        if let Some(breaker) = pipeline.circuit_breaker() {
            let snapshot = breaker.metrics_snapshot();
            info!(
                "Circuit breaker '{}' is {} ({} buffered, {} failed, {} rejected)",
                breaker.name(),
                snapshot.state,
                snapshot.buffered_calls,
                snapshot.failed_calls,
                snapshot.not_permitted_calls
            );
        }
    }
}

fn init_logging(observability: &ObservabilityConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},optima=debug", observability.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if observability.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
