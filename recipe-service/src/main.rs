use recipe_service::config::RecipeConfig;
use recipe_service::services::init_metrics;
use recipe_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RecipeConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "recipe-service",
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    // Must be installed before any metric is recorded
    init_metrics()?;

    tracing::info!(backend = ?config.store.backend, "Starting recipe-service");

    let app = Application::build(config).await?;
    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    tracing::info!("recipe-service stopped");
    Ok(())
}
