//! Short code redirects and the not-found page.

use actix_web::{get, http::header, web, HttpResponse};

use crate::cache::AppCache;
use crate::constants::{NOT_FOUND_PATH, RESERVED_PATHS};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::services;

/// Redirect `/{short_code}` to its long URL.
///
/// Unknown codes go to the not-found page rather than failing in place.
#[get("/{short_code}")]
pub(super) async fn redirect_to_url(
    pool: web::Data<DbPool>,
    cache: web::Data<AppCache>,
    metrics: Option<web::Data<AppMetrics>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let short_code = path.into_inner();

    if RESERVED_PATHS.contains(&short_code.as_str()) {
        return Err(AppError::NotFound("Resource not found".into()));
    }

    let long_url = services::lookup_long_url_cached(
        &pool,
        &cache,
        &short_code,
        metrics.as_ref().map(|m| m.as_ref()),
    )?;

    let location = match long_url {
        Some(url) => {
            if let Some(m) = &metrics {
                m.record_redirect();
            }
            log::info!("Redirecting {} -> {}", short_code, url);
            url
        }
        None => {
            log::info!("No link for {}, redirecting to {}", short_code, NOT_FOUND_PATH);
            NOT_FOUND_PATH.to_string()
        }
    };

    Ok(HttpResponse::PermanentRedirect()
        .insert_header((header::LOCATION, location))
        .finish())
}

/// Landing page for unknown codes and API paths
#[get("/notfound")]
pub(super) async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Short link not found".into()))
}

/// Fallback for paths under `/api` that no endpoint claims
pub(super) async fn api_fallback(req: actix_web::HttpRequest) -> HttpResponse {
    if req.method() == actix_web::http::Method::GET {
        log::debug!("Unknown API path {}, redirecting", req.path());
        HttpResponse::PermanentRedirect()
            .insert_header((header::LOCATION, NOT_FOUND_PATH))
            .finish()
    } else {
        HttpResponse::NotFound().finish()
    }
}
