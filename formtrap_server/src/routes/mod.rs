//! Route handlers for the Formtrap server

pub mod admin;
pub mod form;

use crate::{config::Config, forms::FormStore};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use formtrap_common::HoneypotPolicy;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forms: Arc<FormStore>,
    /// Honeypot classifier shared by every form page
    pub policy: HoneypotPolicy,
}

impl AppState {
    pub fn new(config: Config, forms: FormStore) -> Self {
        let policy = HoneypotPolicy::new(config.honeypot.clone());
        Self::with_policy(config, forms, policy)
    }

    pub fn with_policy(config: Config, forms: FormStore, policy: HoneypotPolicy) -> Self {
        Lazy::force(&START_TIME);
        Self {
            config: Arc::new(config),
            forms: Arc::new(forms),
            policy,
        }
    }
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(admin::router())
        .merge(form::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "forms": state.forms.len(),
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}
