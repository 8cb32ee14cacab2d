//! API module providing the HTTP endpoints of the alerts service.
//!
//! This module is organized into submodules:
//! - `admin_alerts` - Bulk alert dispatch (/api/admin/alerts/send)
//! - `users` - Email alert opt-in management (/api/users/alerts, /api/user/{id}/alerts)
//! - `auth` - Bearer token extractors
//! - `extract` - JSON body extractor with JSON error responses
//! - `health` - Health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod admin_alerts;
pub mod auth;
pub mod extract;
pub mod health;
pub mod openapi;
pub mod users;

pub use admin_alerts::ADMIN_ALERTS_TAG;
pub use health::MISC_TAG;
pub use users::USERS_TAG;

use crate::AppResources;
use crate::error::ApiError;
use axum::{
    Router,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Builds the full application router with all middleware attached.
pub fn app(app_resources: AppResources) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/api", admin_alerts::router().merge(users::router()))
        .routes(routes!(health::health))
        .split_for_parts();

    router
        .merge(Redoc::with_url("/api-docs", api))
        .fallback(route_not_found)
        .layer(axum::Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Starts the web server on the configured bind address.
#[tracing::instrument(skip(app_resources))]
pub async fn start_webserver(app_resources: AppResources) -> color_eyre::Result<()> {
    let addr = app_resources.config.bind_address.clone();
    let router = app(app_resources);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown panic".to_string()
    };
    tracing::error!(
        name = "api.handler_panicked",
        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
        error = %detail,
        message = "Request handler panicked"
    );
    ApiError::server_error(detail).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received, draining connections");
}
