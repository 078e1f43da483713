use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use traslado_motos_web::cache::start_cache_warmer;
use traslado_motos_web::config::Config;
use traslado_motos_web::routes;
use traslado_motos_web::sheets::PricingSource;
use traslado_motos_web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("traslado_motos_web=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let source = PricingSource::from_config(&config).context("failed to set up pricing source")?;
    info!("Pricing source: {}", source.describe());

    let bind_addr = config.bind_addr;
    let refresh_interval = config.refresh_interval;
    let state = AppState::new(config, source);

    // Warm immediately, then refresh in the background
    tokio::spawn(start_cache_warmer(
        state.cache.clone(),
        state.source.clone(),
        refresh_interval,
    ));

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Quote service listening on http://{}", bind_addr);
    info!("  GET  /health");
    info!("  GET  /api/sheets");
    info!("  GET  /api/pricing/origins | destinations?origin= | vehicles | meta");
    info!("  POST /api/pricing/quote | /api/pricing/quote/multi");

    axum::serve(listener, app).await?;
    Ok(())
}
