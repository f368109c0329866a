mod handlers;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::info;

use clusterscope_core::collector::SshConnector;

use state::AppConfig;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(name = "clusterscope-web", about = "cluster telemetry API server", version = clusterscope_core::VERSION)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080", env = "CLUSTERSCOPE_LISTEN")]
    listen: String,

    /// Path to the node inventory file.
    #[arg(
        long,
        default_value = "config/nodes.yaml",
        env = "CLUSTERSCOPE_NODES_FILE"
    )]
    nodes_file: PathBuf,

    /// SSH connect timeout in seconds.
    #[arg(long, default_value = "10", env = "CLUSTERSCOPE_CONNECT_TIMEOUT")]
    connect_timeout: u64,

    /// Remote command timeout in seconds.
    #[arg(long, default_value = "30", env = "CLUSTERSCOPE_COMMAND_TIMEOUT")]
    command_timeout: u64,
}

// ============================================================
// Main
// ============================================================

fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "clusterscope_web=info,clusterscope_core=info"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(async_main(args));
}

async fn async_main(args: Args) {
    info!(
        version = clusterscope_core::VERSION,
        nodes_file = %args.nodes_file.display(),
        "starting"
    );

    let config = AppConfig {
        nodes_file: args.nodes_file,
        connector: SshConnector::new(
            Duration::from_secs(args.connect_timeout),
            Duration::from_secs(args.command_timeout),
        ),
    };

    let app = Router::new()
        .route("/cluster-state", get(handlers::handle_cluster_state))
        .route("/health", get(handlers::handle_health))
        .with_state(Arc::new(config))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    let addr: SocketAddr = args.listen.parse().expect("invalid listen address");
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    axum::serve(listener, app).await.expect("server error");
}
