use peage_server::browser::session::CdpSessionProvisioner;
use peage_server::config::{Config, ScreenshotMode};
use peage_server::engine::capture::{DirSink, InlineSink, ScreenshotSink};
use peage_server::engine::pipeline::CheckEngine;
use peage_server::http::{create_router, AppState};
use peage_server::providers::ProviderRegistry;
use peage_server::services::CheckAggregator;
use std::sync::Arc;
use std::time::SystemTime;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("✅ .env loaded from: {:?}", path),
        Err(e) => eprintln!("⚠️  .env not found: {}", e),
    }

    // Logging setup
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,peage_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting péage server...");

    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Config loaded");
    tracing::info!("   HTTP Addr: {}", config.http_addr);
    tracing::info!("   Headless: {}", config.headless);
    tracing::info!("   Screenshots: {:?}", config.screenshot_mode);

    // Provider registry, built once for the process lifetime
    let registry = Arc::new(ProviderRegistry::new());
    let info = registry.info();
    tracing::info!("✅ Provider registry built ({} providers)", info.total);
    for provider in &info.providers {
        tracing::info!("   🛣️  {} -> {}", provider.id, provider.entry_url);
    }

    // The engine's two injected collaborators: session provisioner and
    // screenshot sink
    let provisioner = Arc::new(CdpSessionProvisioner::new(config.clone()));
    let sink: Arc<dyn ScreenshotSink> = match config.screenshot_mode {
        ScreenshotMode::Inline => Arc::new(InlineSink),
        ScreenshotMode::Directory => Arc::new(DirSink::new(&config.screenshot_dir)),
    };
    let engine = Arc::new(CheckEngine::new(
        provisioner,
        sink,
        config.engine_timeouts(),
    ));

    let aggregator = Arc::new(CheckAggregator::new(registry.clone(), engine.clone()));

    let state = AppState {
        config: config.clone(),
        registry,
        engine,
        aggregator,
        start_time: SystemTime::now(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("🌐 Server listening: http://{}", config.http_addr);
    tracing::info!("📋 Endpoints:");
    tracing::info!("   GET  /health");
    tracing::info!("   GET  /api/v1/providers");
    tracing::info!("   GET  /api/v1/check?plate=XX123XX");
    tracing::info!("   GET  /api/v1/check/:provider?plate=XX123XX");

    axum::serve(listener, app).await?;

    Ok(())
}
