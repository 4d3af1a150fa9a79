//! Public form pages
//!
//! Every POST that passes field validation ends on the same thank-you page.
//! Only submissions the honeypot accepts are stored and notified.

use crate::forms::{FormPage, FormSubmission};
use crate::html;
use crate::routes::AppState;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use formtrap_common::{HoneypotFields, Verdict};
use std::collections::BTreeMap;

/// Build the form page router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(serve_form).post(submit_form))
        .route("/{slug}/", get(serve_form).post(submit_form))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(html::not_found())).into_response()
}

fn render_form(state: &AppState, page: &FormPage, errors: &[String]) -> Response {
    let honeypot = HoneypotFields::new(page.honeypot, state.policy.config(), state.policy.clock());
    Html(html::form_page(page, &honeypot, errors)).into_response()
}

/// Render a form page, stamping the honeypot fields with the current time
async fn serve_form(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.forms.get(&slug) {
        Some(page) => render_form(&state, &page, &[]),
        None => not_found(),
    }
}

/// Handle a form submission
async fn submit_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let Some(page) = state.forms.get(&slug) else {
        return not_found();
    };

    // An unreadable body is treated as an empty submission
    let pairs = match form {
        Ok(Form(pairs)) => pairs,
        Err(e) => {
            tracing::debug!("Unreadable submission for form {}: {}", slug, e);
            Vec::new()
        }
    };

    // Repeated names keep their last value, matching the classifier
    let data: BTreeMap<String, String> = pairs.iter().cloned().collect();

    let missing = page.missing_required(&data);
    if !missing.is_empty() {
        return render_form(&state, &page, &missing);
    }

    match state.policy.classify(page.honeypot, &pairs) {
        Verdict::Accept => process_submission(&state, &page, &data),
        Verdict::Reject(reason) => {
            tracing::debug!(
                form = %page.slug,
                reason = reason.as_str(),
                "Discarding submission caught by honeypot"
            );
        }
    }

    Html(html::landing_page(&page)).into_response()
}

/// Store an accepted submission and send its notification
fn process_submission(state: &AppState, page: &FormPage, data: &BTreeMap<String, String>) {
    match state.forms.add_submission(&page.slug, page.clean_data(data)) {
        Some(submission) => send_notification(page, &submission),
        None => tracing::error!("Form {} disappeared before its submission was stored", page.slug),
    }
}

fn send_notification(page: &FormPage, submission: &FormSubmission) {
    let Some(to_address) = &page.to_address else {
        return;
    };

    let content = submission
        .data
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n");

    tracing::info!(
        to = %to_address,
        submission_id = %submission.id,
        "New entry for {}\n{}",
        page.title,
        content
    );
}
