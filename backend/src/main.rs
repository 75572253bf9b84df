use std::{process::ExitCode, sync::Arc};

use evroute::{
    AppState, catalog::StationCatalog, config::AppConfig, create_router,
    directions::GoogleDirections,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evroute=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let catalog = StationCatalog::from_file(&config.stations_path)?;
    tracing::info!(
        "loaded {} station(s) from {}",
        catalog.len(),
        config.stations_path.display()
    );

    if config.google_maps_api_key.is_none() {
        tracing::warn!("GOOGLE_MAPS_API_KEY is not set, directions requests are unauthenticated");
    }
    let directions = GoogleDirections::new(
        &config.directions_base_url,
        config.google_maps_api_key.clone(),
    )?;

    let state = AppState {
        catalog: Arc::new(catalog),
        directions: Arc::new(directions),
        directions_timeout: config.directions_timeout,
    };
    let app = create_router(state);

    tracing::info!("starting evroute on http://{}", config.bind_addr);
    tracing::info!("API endpoints:");
    tracing::info!("  POST /api/trip - Plan a trip with charging stops");
    tracing::info!("  GET  /api/stations - List stations with charger availability");
    tracing::info!("  POST /api/stations/nearest - Rank stations for a driver");
    tracing::info!("  POST /api/charging/estimate - Estimate a charging session");
    tracing::info!("  POST /api/chargers/availability - Soonest charger to free up");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
