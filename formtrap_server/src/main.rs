//! Formtrap Server - form pages with honeypot spam filtering
//!
//! This server handles:
//! - Rendering form pages with the honeypot marker fields
//! - Classifying submissions and storing the accepted ones
//! - An admin API to toggle the honeypot per form

mod config;
mod forms;
mod html;
mod routes;

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,formtrap_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Starting Formtrap server on {}:{}", config.host, config.port);
    tracing::info!(
        "Honeypot fields: {} / {} (minimum {}s)",
        config.honeypot.name_field(),
        config.honeypot.time_field(),
        config.honeypot.time_interval()
    );
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, admin API is disabled");
    }

    // Load form pages
    let forms = match &config.forms_file {
        Some(path) => {
            tracing::info!("Loading forms from {}", path.display());
            forms::FormStore::load_json(path, &config.honeypot)?
        }
        None => {
            tracing::info!("FORMS_FILE not set, serving the demo form at /formpage/");
            forms::FormStore::demo()
        }
    };
    tracing::info!("{} form page(s) loaded", forms.len());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = routes::app(routes::AppState::new(config, forms));

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
