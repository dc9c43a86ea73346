use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use melkor_core::{CrawlScheduler, TracingSchedulerReporter};
use melkor_server::config::Config;
use melkor_server::state::AppState;
use melkor_server::{build_registry, logging, routes};

#[derive(Parser)]
#[command(name = "melkor", version, about = "AWS caching layer")]
struct Cli {
    /// Path to a YAML config file (defaults to melkor.yml next to the binary, then /etc/melkor/config.yml)
    #[arg(short, long, env = "MELKOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    logging::init(&config);

    let registry = Arc::new(build_registry(&config).await?);

    let cancel = CancellationToken::new();
    let scheduler = CrawlScheduler::new(Arc::clone(&registry), config.crawl_interval());
    let scheduler_cancel = cancel.clone();
    tokio::spawn(async move {
        scheduler
            .run(scheduler_cancel, &TracingSchedulerReporter)
            .await;
    });

    let state = Arc::new(AppState::new(registry, &config));
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_address();
    tracing::info!(
        version = routes::SERVICE_VERSION,
        address = %config.address,
        port = config.port,
        "Launching Melkor"
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        () = shutdown_signal() => {
            tracing::info!("Shutting down");
            cancel.cancel();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
}
