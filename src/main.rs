//! Federated Shell
//!
//! - wasm32: launches the web app (config load, identity gate, theme).
//! - native: development host serving the config document and the web bundle.

#[cfg(target_arch = "wasm32")]
fn main() {
    dioxus::launch(federated_shell::app::App);
}

#[cfg(all(not(target_arch = "wasm32"), feature = "server"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use federated_shell::{api, config};
    use std::net::SocketAddr;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "federated_shell=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Federated Shell host v{} ({})",
        env!("FSH_VERSION"),
        env!("FSH_GIT_SHA")
    );

    // Load configuration
    let settings = config::load_settings()?;
    tracing::info!(
        "Settings loaded, port: {}, document: {}, assets: {}",
        settings.port,
        settings.document_path.display(),
        settings.assets_dir.display()
    );
    if !settings.document_path.exists() {
        tracing::warn!(
            "Config document {} does not exist yet; clients will stay on the loading screen",
            settings.document_path.display()
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let app = api::router(api::AppState::new(settings));

    // Start server with graceful shutdown
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "server")))]
fn main() {
    eprintln!("federated-shell was built without the `server` feature; nothing to run natively");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
#[cfg(all(not(target_arch = "wasm32"), feature = "server"))]
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
