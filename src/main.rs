#![forbid(unsafe_code)]
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use backend::booker::BookingApp;
use backend::config::Config;
use backend::db::Db;
use backend::routes::app_router;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    timeout::TimeoutLayer,
};
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    info!("Starting server");

    let db = Db::connect(&config.database_url).await?;
    db.seed_demo_classes().await?;

    let app_state = Arc::new(BookingApp::new(db, config.default_tz));

    let middleware = tower::ServiceBuilder::new()
        .layer(CompressionLayer::new().quality(tower_http::CompressionLevel::Fastest))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive());

    // build our application with routes
    let app = app_router(app_state).layer(middleware);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
