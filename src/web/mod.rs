//! Shell Server
//!
//! Serves the application shell and page fragments over HTTP, built with Axum.
//!
//! # Endpoints
//!
//! - `GET /` - full HTML shell (splash, role selection, auth, dashboard container)
//! - `GET /pages/:role/:page` - page content for a role
//! - `GET /status` - latest blockchain connection status as JSON
//! - `GET /health` - liveness

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ServerError, ServerResult};
pub use state::WebState;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app::App;

pub fn build_router(state: WebState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/pages/:role/:page", get(routes::page_fragment))
        .route("/status", get(routes::status))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve until Ctrl+C or SIGTERM, then stop the app's background tasks
pub async fn serve(app: Arc<App>) -> Result<(), ServerError> {
    let addr = app.config().server.addr();
    let router = build_router(WebState::new(app.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("ChemTrack shell listening on {}", addr);

    app.start_background();

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Internal(format!("Server error: {}", e)));

    app.shutdown().await;
    served?;

    tracing::info!("ChemTrack shell shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::navigation::{MemorySurface, PageContext, RenderError, RenderedPage};
    use crate::session::{MemoryStorage, Role, SessionStorage, SESSION_KEY};
    use crate::transport::mock::MockTransport;
    use crate::transport::Method;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app(transport: MockTransport, signed_in: Option<Role>) -> (Router, Arc<App>) {
        let storage = MemoryStorage::new();
        if let Some(role) = signed_in {
            let record = json!({
                "id": 12,
                "username": "lee",
                "email": "lee@plant.io",
                "role": role.as_str(),
                "token": "t0k"
            });
            storage.set_item(SESSION_KEY, &record.to_string()).unwrap();
        }

        let app = Arc::new(App::with_parts(
            Config::default(),
            Arc::new(transport),
            Arc::new(storage),
            Arc::new(MemorySurface::new()),
        ));
        (build_router(WebState::new(app.clone())), app)
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = create_test_app(MockTransport::new(), None);
        let (status, body) = get(router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["blockchain"], "pending");
    }

    #[tokio::test]
    async fn test_index_renders_shell() {
        let (router, _) = create_test_app(MockTransport::new(), None);
        let (status, body) = get(router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<!DOCTYPE html>"));
        for id in ["splash-screen", "role-selection", "auth-container", "dashboard-container", "notification-area"] {
            assert!(body.contains(&format!(r#"id="{}""#, id)), "missing {}", id);
        }
    }

    #[tokio::test]
    async fn test_page_fragment_for_role() {
        let (router, _) = create_test_app(MockTransport::new(), Some(Role::Manufacturer));
        let (status, body) = get(router, "/pages/manufacturer/register").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"id="chemical-rfid""#));
    }

    #[tokio::test]
    async fn test_page_fragment_requires_session() {
        let (router, app) = create_test_app(MockTransport::new(), None);
        assert!(!app.auth().is_authenticated());

        let (status, body) = get(router, "/pages/admin/dashboard").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_page_fragment_errors() {
        let (router, _) = create_test_app(MockTransport::new(), Some(Role::Customer));

        let (status, body) = get(router.clone(), "/pages/chemist/dashboard").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].as_str().is_some());

        let (status, _) = get(router.clone(), "/pages/customer/admin").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // the path role must be the session's
        let (status, body) = get(router, "/pages/admin/dashboard").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("signed in as Customer"));
    }

    #[tokio::test]
    async fn test_page_fragment_public_path_redirects() {
        let (router, _) = create_test_app(MockTransport::new(), Some(Role::Distributor));
        let response = router
            .oneshot(Request::builder().uri("/pages/distributor/login").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/pages/distributor/dashboard");
    }

    #[tokio::test]
    async fn test_page_fragment_provider_failures_render_inline() {
        let (router, app) = create_test_app(MockTransport::new(), Some(Role::Admin));
        app.nav().registry().register("audit", |_ctx: &PageContext<'_>| -> Result<RenderedPage, RenderError> {
            panic!("audit log unavailable")
        });
        app.nav().registry().register("reports", |_ctx: &PageContext<'_>| {
            Err(RenderError::MissingData("report period".to_string()))
        });

        let (status, body) = get(router.clone(), "/pages/admin/audit").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Error Loading Page"));

        let (status, body) = get(router.clone(), "/pages/admin/reports").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Missing page data: report period"));

        let (status, body) = get(router, "/pages/admin/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("lee@plant.io"));
    }

    #[tokio::test]
    async fn test_status_reflects_last_check() {
        let transport = MockTransport::new().respond(
            Method::Get,
            "/blockchain-status",
            200,
            json!({"connected": true, "provider": "Hardhat", "contract_address": "0x5FbDB2315678afecb367f032d93F642f64180aa3"}),
        );
        let (router, app) = create_test_app(transport, None);
        app.client().check_connection().await;

        let (status, body) = get(router, "/status").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["status"], "connected");
        assert_eq!(body["provider"], "Hardhat");
    }
}
