//! Shell server handlers
//!
//! - `GET /` - full application shell
//! - `GET /pages/:role/:page` - page content fragment for a role
//! - `GET /status` - last known blockchain connection status
//! - `GET /health` - liveness and version

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ServerError, ServerResult};
use super::state::WebState;
use crate::blockchain::ConnectionStatus;
use crate::dashboard::shell;
use crate::navigation::{route_from_hash, PageContext, DEFAULT_PAGE};
use crate::session::{can_access, is_public, Role};
use crate::ui::ShellView;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub blockchain: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /
pub async fn index(State(state): State<Arc<WebState>>) -> Html<String> {
    let role = state.app.nav().selected_role();
    let document = shell::app_document(ShellView::Splash, |view| match view {
        ShellView::Splash => shell::splash(),
        ShellView::RoleSelection => shell::role_selection(),
        ShellView::Auth => shell::auth_view(role),
        ShellView::Dashboard => String::new(),
    });
    Html(document)
}

/// GET /pages/:role/:page
///
/// Content only; the frame is rendered once by the client. Served to the
/// signed-in session, and only under that session's own role.
pub async fn page_fragment(
    State(state): State<Arc<WebState>>,
    Path((role, page)): Path<(String, String)>,
) -> ServerResult<Response> {
    let requested: Role = role.parse()?;
    let page = route_from_hash(&page);

    let session = state
        .app
        .auth()
        .current_session()
        .ok_or_else(|| ServerError::Unauthorized(format!("sign in to open '{}'", page)))?;

    if session.role != requested {
        return Err(ServerError::Forbidden(format!(
            "signed in as {}, not {}",
            session.role.title(),
            requested.title()
        )));
    }

    if is_public(&page) {
        let target = format!("/pages/{}/{}", session.role.as_str(), DEFAULT_PAGE);
        return Ok(Redirect::to(&target).into_response());
    }

    if !can_access(Some(session.role), &page) {
        return Err(ServerError::Forbidden(format!(
            "{} may not open '{}'",
            session.role.title(),
            page
        )));
    }

    let status = state.app.client().status();
    let rendered = state.app.nav().registry().resolve(&PageContext {
        page: &page,
        role: Some(session.role),
        session: Some(&session),
        status: &status,
    });
    Ok(Html(rendered.html).into_response())
}

/// GET /status
pub async fn status(State(state): State<Arc<WebState>>) -> Json<ConnectionStatus> {
    Json(state.app.client().status())
}

/// GET /health
pub async fn health(State(state): State<Arc<WebState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        blockchain: state.app.client().status().status.as_str().to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
