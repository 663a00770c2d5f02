mod config;
mod handlers;
mod models;
mod services;
mod web;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::AppConfig;
use handlers::AnalysisHandler;
use services::{GeminiClient, VisionModel};
use web::create_app_router;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenv().ok();

    log::info!("🥗 Starting Calorie Advisor...");

    let config = AppConfig::from_env()?;

    let gemini = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    let model = gemini as Arc<dyn VisionModel>;
    log::info!("✅ Gemini client initialized with model: {}", config.gemini_model);

    let handler = Arc::new(AnalysisHandler::new(model));
    let app = create_app_router(handler);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("🌐 Web server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for ctrl-c: {}", e);
    }
}
