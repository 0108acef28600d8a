//! Pathgate binary entry point.

use pathgate::admin::AdminApi;
use pathgate::catalog::FileCatalog;
use pathgate::config::Settings;
use pathgate::http::{Dispatch, HttpServer};
use pathgate::logging::ErrorLogger;
use pathgate::router::Router;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pathgate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    info!(
        public_addr = %settings.public_addr,
        api_addr = %settings.api_addr,
        catalog_path = %settings.catalog_path.display(),
        connect_timeout = ?settings.backend_connect_timeout,
        header_timeout = ?settings.backend_header_timeout,
        "starting pathgate"
    );

    let logger = Arc::new(ErrorLogger::open(&settings.error_log_path)?);
    info!(path = %settings.error_log_path.display(), "logging errors as JSON");

    let catalog = Arc::new(FileCatalog::new(&settings.catalog_path));
    let router = Arc::new(Router::new(
        catalog,
        logger,
        settings.backend_connect_timeout,
        settings.backend_header_timeout,
    ));
    router.reload_routes().await;

    let public = HttpServer::bind(&settings.public_addr, Arc::clone(&router) as Arc<dyn Dispatch>).await?;
    let admin = HttpServer::bind(
        &settings.api_addr,
        Arc::new(AdminApi::new(router)) as Arc<dyn Dispatch>,
    )
    .await?;

    tokio::try_join!(public.run(), admin.run())?;
    Ok(())
}
