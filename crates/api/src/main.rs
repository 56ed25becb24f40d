use std::sync::Arc;

use badgekit_api::app;
use badgekit_api::config::AppConfig;
use badgekit_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    badgekit_observability::init_with_format(LogFormat::from_config(&config.log_format));

    let services = Arc::new(app::services::build_services(&config).await?);
    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
