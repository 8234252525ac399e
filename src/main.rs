use std::sync::Arc;

use local_tours::config::Configuration;
use local_tours::telemetry;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() {
    // `.env` is optional.
    dotenvy::dotenv().ok();
    telemetry::setup_logging();

    let config = Configuration::load();

    let state = match local_tours::initialize_state(Arc::clone(&config)).await {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(%error, "cannot initialize server");
            std::process::exit(1);
        },
    };

    let mut app = local_tours::app(state.clone());
    match telemetry::setup_metrics_recorder() {
        Ok(handle) => app = app.merge(telemetry::metrics_router(handle)),
        Err(error) => tracing::warn!(%error, "prometheus recorder not installed"),
    }

    let listener = match TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, port = config.port, "cannot bind port");
            std::process::exit(1);
        },
    };
    tracing::info!(port = config.port, "Local Tours and Guides server is running");

    if let Err(error) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "server stopped unexpectedly");
    }

    state.db.close().await;
    tracing::info!("server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(error) => {
                tracing::error!(%error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
