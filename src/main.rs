use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use voiceover_gateway::{AppState, AudioStorage, FileStore, ServerConfig, routes};

/// Voice-over gateway - text-to-speech backend with per-user quotas
#[derive(Parser, Debug)]
#[command(name = "voiceover-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the demo user file and print the generated credentials
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;

    if let Some(Commands::Seed) = cli.command {
        let credentials =
            FileStore::seed(&config.users_file).map_err(|e| anyhow!(e.to_string()))?;
        println!("Seeded {} demo users:", credentials.len());
        for (email, password) in credentials {
            println!("  {email}  {password}");
        }
        println!("Credentials are shown once; only digests are stored.");
        return Ok(());
    }

    if !config.users_file.exists() {
        tracing::warn!(
            path = %config.users_file.display(),
            "user store file not found; starting empty. Run `voiceover-gateway seed` to create demo users."
        );
    }
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; generation requests will fail");
    }

    let store = Arc::new(FileStore::open(&config.users_file).map_err(|e| anyhow!(e.to_string()))?);
    let storage = AudioStorage::from_config(&config).map_err(|e| anyhow!(e.to_string()))?;

    let address = config.address();
    let rate_limit_rps = config.rate_limit_requests_per_second;
    let rate_limit_burst = config.rate_limit_burst_size;
    let cors_origins = config.cors_allowed_origins.clone();

    let app_state = AppState::new(config, store, storage);
    let app = routes::create_app(app_state);

    // Per-IP rate limiting
    let governor_config = GovernorConfigBuilder::default()
        .per_second(rate_limit_rps as u64)
        .burst_size(rate_limit_burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to build rate limiter config");
    let governor_layer = GovernorLayer::new(governor_config);

    // CORS: same-origin only unless origins are configured
    let cors_layer = match cors_origins.as_deref() {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_credentials(true)
        }
        None => {
            info!(
                "CORS not configured, defaulting to same-origin only. \
                 Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
            );
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        }
    };

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    let app = app
        .layer(cors_layer)
        .layer(governor_layer)
        .layer(security_headers);

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    info!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
