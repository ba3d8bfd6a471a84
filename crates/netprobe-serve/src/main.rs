//! netprobe-serve — chat relay and network speed-test backend.

use std::sync::Arc;

use netprobe_core::config::AppConfig;
use netprobe_serve::relay::RelayClient;
use netprobe_serve::server::{build_router, AppState};
use netprobe_serve::{metrics, stream};

struct Args {
    config: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config = None;
    let mut host = None;
    let mut port = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = args.get(i).cloned();
            }
            "--host" => {
                i += 1;
                host = args.get(i).cloned();
            }
            "--port" => {
                i += 1;
                port = args.get(i).and_then(|s| s.parse().ok());
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: netprobe-serve [--config <path.toml>] [--host 0.0.0.0] [--port 8080]"
                );
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!(
                    "Usage: netprobe-serve [--config <path.toml>] [--host 0.0.0.0] [--port 8080]"
                );
                std::process::exit(1);
            }
        }
        i += 1;
    }

    Args { config, host, port }
}

#[tokio::main]
async fn main() {
    let args = parse_args();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config from {path}: {e}");
            std::process::exit(1);
        }),
        None => AppConfig::default(),
    };
    if let Some(host) = args.host {
        config.serving.host = host;
    }
    if let Some(port) = args.port {
        config.serving.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    metrics::register_metrics();

    // Knowledge file feeds the chat system prompt; missing file is not fatal.
    let knowledge = match std::fs::read_to_string(&config.knowledge_path) {
        Ok(content) => {
            tracing::info!(
                "Loaded knowledge file {} ({} bytes)",
                config.knowledge_path,
                content.len()
            );
            content
        }
        Err(e) => {
            tracing::warn!(
                "Knowledge file {} unavailable ({e}); chat will answer without reference notes",
                config.knowledge_path
            );
            String::new()
        }
    };

    // Credential absence is non-fatal: the chat route fails at call time
    // with a distinct log line instead.
    let api_key = config.api_key();
    if api_key.is_none() {
        tracing::warn!(
            "{} is not set; /chat will return a degraded reply until it is configured",
            config.upstream.api_key_env
        );
    }

    let relay = RelayClient::new(&config.upstream, api_key, &knowledge).unwrap_or_else(|e| {
        eprintln!("Failed to build upstream client: {e}");
        std::process::exit(1);
    });

    let state = Arc::new(AppState { relay });
    let app = build_router(state);

    let addr = format!("{}:{}", config.serving.host, config.serving.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Failed to bind to {addr}: {e}");
            std::process::exit(1);
        });
    tracing::info!("Listening on http://{addr}");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                        (liveness)");
    tracing::info!("  POST /chat");
    tracing::info!(
        "  GET  /api/speedtest/download  (size {}..{} MB)",
        stream::DOWNLOAD_MIN_MB,
        stream::DOWNLOAD_MAX_MB
    );
    tracing::info!("  POST /api/speedtest/upload");
    tracing::info!("  GET  /api/speedtest/ping");
    tracing::info!("  GET  /metrics");

    axum::serve(listener, app).await.unwrap();
}
