use std::sync::Arc;

use axum_media_browser::{app, AppConfig, Args};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match AppConfig::from_args(&args).await {
        Ok(config) => config,
        Err(e) => {
            error!(
                "Failed to resolve root directory '{}': {}. Exiting.",
                args.root.display(),
                e
            );
            eprintln!(
                "Error: Failed to resolve root directory '{}': {}",
                args.root.display(),
                e
            );
            std::process::exit(1);
        }
    };

    info!("Serving files from: {}", config.root.display());
    info!("Listening on: {}:{}", args.bind, args.port);

    let app = app(Arc::new(config));

    let listener = match tokio::net::TcpListener::bind((args.bind.as_str(), args.port)).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}:{}: {}", args.bind, args.port, e);
            eprintln!("Error: Failed to bind to {}:{}: {}", args.bind, args.port, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
