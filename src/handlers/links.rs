//! Link management endpoints, scoped to the signed-in account.

use actix_web::{delete, get, http::header, post, web, HttpResponse};

use crate::auth::CurrentSession;
use crate::cache::AppCache;
use crate::constants::MANAGE_PATH;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::{AddLinkForm, DeleteLinkQuery, MessageResponse};
use crate::services;

/// Add a link and send the browser back to the management page
#[post("/add")]
pub(super) async fn add_link(
    pool: web::Data<DbPool>,
    metrics: Option<web::Data<AppMetrics>>,
    CurrentSession(session): CurrentSession,
    form: web::Form<AddLinkForm>,
) -> Result<HttpResponse, AppError> {
    services::add_link(&pool, &session, &form.short, &form.long)?;

    if let Some(m) = &metrics {
        m.record_link_created();
    }

    Ok(HttpResponse::PermanentRedirect()
        .insert_header((header::LOCATION, MANAGE_PATH))
        .finish())
}

/// List the caller's links
#[get("/get")]
pub(super) async fn list_links(
    pool: web::Data<DbPool>,
    CurrentSession(session): CurrentSession,
) -> Result<HttpResponse, AppError> {
    let links = services::list_links(&pool, &session)?;
    Ok(HttpResponse::Ok().json(links))
}

/// Remove one of the caller's links
#[delete("/delete")]
pub(super) async fn remove_link(
    pool: web::Data<DbPool>,
    cache: web::Data<AppCache>,
    metrics: Option<web::Data<AppMetrics>>,
    CurrentSession(session): CurrentSession,
    query: web::Query<DeleteLinkQuery>,
) -> Result<HttpResponse, AppError> {
    let short_code = match query.short.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => {
            return Err(AppError::BadRequest(
                "Missing 'short' query parameter".into(),
            ))
        }
    };

    if !session.signed_in {
        return Err(AppError::not_owner(short_code));
    }

    services::remove_link(&pool, Some(&cache), &session, short_code)?;

    if let Some(m) = &metrics {
        m.record_link_removed();
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "Removed short link {}",
        short_code
    ))))
}
