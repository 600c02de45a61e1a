//! Health check and metrics endpoints.

use actix_web::{get, web, HttpResponse};

use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::session::SessionStore;

/// Health check endpoint
#[get("/health")]
pub(super) async fn health_check(sessions: web::Data<SessionStore>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": sessions.len()
    }))
}

/// Prometheus text exposition, when metrics are enabled
#[get("/metrics")]
pub(super) async fn metrics(
    metrics: Option<web::Data<AppMetrics>>,
) -> Result<HttpResponse, AppError> {
    let metrics = match metrics {
        Some(m) => m,
        None => return Err(AppError::NotFound("Metrics are disabled".into())),
    };

    let body = metrics.render().map_err(|e| {
        log::error!("Failed to encode metrics: {}", e);
        AppError::internal(format!("Failed to encode metrics: {}", e))
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
