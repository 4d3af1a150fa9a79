//! Admin API for form pages (honeypot toggle, stored submissions)

use crate::forms::{FormPage, FormSubmission};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/api/forms", get(list_forms))
        .route("/admin/api/forms/{slug}/honeypot", put(set_honeypot))
        .route("/admin/api/forms/{slug}/submissions", get(list_submissions))
}

/// Validate the admin bearer token
fn validate_admin(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(admin_token) = state.config.admin_token.as_deref() else {
        return false;
    };

    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t == admin_token)
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

#[derive(Serialize)]
struct FormSummary {
    slug: String,
    title: String,
    honeypot: bool,
    submissions: usize,
}

impl FormSummary {
    fn new(page: &FormPage, submissions: usize) -> Self {
        Self {
            slug: page.slug.clone(),
            title: page.title.clone(),
            honeypot: page.honeypot,
            submissions,
        }
    }
}

async fn list_forms(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !validate_admin(&state, &headers) {
        return unauthorized();
    }

    let forms: Vec<FormSummary> = state
        .forms
        .list()
        .iter()
        .map(|page| FormSummary::new(page, state.forms.submission_count(&page.slug)))
        .collect();

    Json(forms).into_response()
}

#[derive(Debug, Deserialize)]
pub struct HoneypotUpdate {
    enabled: bool,
}

async fn set_honeypot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    body: Result<Json<HoneypotUpdate>, JsonRejection>,
) -> Response {
    if !validate_admin(&state, &headers) {
        return unauthorized();
    }

    let update = match body {
        Ok(Json(update)) => update,
        Err(e) => return e.into_response(),
    };

    match state.forms.set_honeypot(&slug, update.enabled) {
        Some(page) => {
            let status = if page.honeypot { "enabled" } else { "disabled" };
            tracing::info!("Honeypot {} for form {}", status, slug);
            let count = state.forms.submission_count(&slug);
            Json(FormSummary::new(&page, count)).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Form not found").into_response(),
    }
}

async fn list_submissions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Response {
    if !validate_admin(&state, &headers) {
        return unauthorized();
    }

    if state.forms.get(&slug).is_none() {
        return (StatusCode::NOT_FOUND, "Form not found").into_response();
    }

    let submissions: Vec<FormSubmission> = state.forms.submissions(&slug);
    Json(submissions).into_response()
}
