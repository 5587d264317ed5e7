//! Guestbook endpoints
//!
//! Neither endpoint fails at the HTTP level: database problems degrade the
//! page or are logged and skipped.

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::http::page::IndexPage;
use crate::state::AppState;

/// Sign form body
#[derive(Debug, Default, Deserialize)]
pub struct SignForm {
    pub name: Option<String>,
    pub message: Option<String>,
}

/// Load the index page model.
///
/// No store yet: empty list without an error. Store present but the query
/// fails: empty list with the "not connected" error.
pub async fn load_index(state: &AppState) -> IndexPage {
    let Some(store) = state.store() else {
        tracing::debug!("Visitor store not ready, rendering empty list");
        return IndexPage::default();
    };

    match store.list_recent().await {
        Ok(visitors) => IndexPage::with_visitors(visitors),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load visitors");
            IndexPage::not_connected()
        }
    }
}

/// Store a signature if possible. Returns whether a row was written.
pub async fn record_signature(state: &AppState, form: SignForm) -> bool {
    let Some(name) = form.name.filter(|n| !n.is_empty()) else {
        tracing::debug!("Ignoring signature without a name");
        return false;
    };
    let Some(store) = state.store() else {
        tracing::warn!("Visitor store not ready, dropping signature");
        return false;
    };

    match store.insert(&name, form.message.as_deref()).await {
        Ok(()) => {
            tracing::info!(name = %name, "Saved visitor");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Error saving visitor");
            false
        }
    }
}

/// GET /
async fn index(State(state): State<AppState>) -> IndexPage {
    load_index(&state).await
}

/// POST /sign
async fn sign(
    State(state): State<AppState>,
    form: Result<Form<SignForm>, FormRejection>,
) -> Response {
    match form {
        Ok(Form(form)) => {
            record_signature(&state, form).await;
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable sign form");
        }
    }

    redirect_home()
}

/// 302 back to the list
fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

/// Guestbook routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/sign", post(sign))
}
