//! Session binding for every request.
//!
//! [`bind_session`] wraps the whole app: it resolves the caller's session
//! from the cookie (creating one when needed), stores it in the request
//! extensions, and sets the cookie on the response for new sessions.
//! Handlers take the bound session through the [`CurrentSession`] extractor.

use actix_web::body::MessageBody;
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::errors::AppError;
use crate::session::{Session, SessionStore};

/// The session bound to the current request.
///
/// Holds a snapshot taken when the request arrived. Changes made through
/// the store (signin) are visible to later requests.
pub struct CurrentSession(pub Session);

impl FromRequest for CurrentSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Session>() {
            Some(session) => ready(Ok(CurrentSession(session.clone()))),
            None => ready(Err(AppError::internal(
                "Session binder middleware is not installed",
            ))),
        }
    }
}

/// Middleware resolving the session before any handler runs
pub async fn bind_session(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let store = req
        .app_data::<web::Data<SessionStore>>()
        .cloned()
        .ok_or_else(|| AppError::internal("Session store not available"))?;

    let cookie_value = req
        .cookie(store.cookie_name())
        .map(|cookie| cookie.value().to_string());
    let resolved = store.resolve(cookie_value.as_deref());

    log::debug!(
        "Serving session {} @ {}",
        resolved.session.log_id(),
        req.path()
    );
    req.extensions_mut().insert(resolved.session.clone());

    let mut res = next.call(req).await?;

    if resolved.is_new {
        let cookie = store.cookie_for(&resolved.session);
        if let Err(e) = res.response_mut().add_cookie(&cookie) {
            log::error!(
                "Failed to set cookie for session {}: {}",
                resolved.session.log_id(),
                e
            );
        }
    }

    Ok(res)
}
