//! Signup, signin and account pages.

use actix_web::{get, http::header, post, web, HttpResponse};
use validator::Validate;

use crate::auth::CurrentSession;
use crate::constants::{ACCOUNT_PATH, SIGNIN_REDIRECT_PATH};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::metrics::AppMetrics;
use crate::models::{MessageResponse, SigninForm, SignupForm};
use crate::services;
use crate::session::SessionStore;

const SIGNIN_FAILED: &str = "Username or password incorrect";
const SIGNUP_INVALID: &str = "Invalid input, please fill all the fields";

/// Create an account. The caller stays signed out.
#[post("/signup")]
pub(super) async fn signup(
    pool: web::Data<DbPool>,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    if let Err(e) = form.validate() {
        log::info!("Rejecting signup form: {}", e);
        return Err(AppError::invalid_input(SIGNUP_INVALID));
    }

    let username = form.username.clone();
    let result = web::block(move || services::signup(&pool, &form)).await?;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
            "Account {} created",
            username
        )))),
        Err(AppError::InvalidInput(_)) => Err(AppError::invalid_input(SIGNUP_INVALID)),
        Err(e) => Err(e),
    }
}

/// Sign the current session in
#[post("/auth")]
pub(super) async fn signin(
    pool: web::Data<DbPool>,
    sessions: web::Data<SessionStore>,
    metrics: Option<web::Data<AppMetrics>>,
    CurrentSession(mut session): CurrentSession,
    form: web::Form<SigninForm>,
) -> Result<HttpResponse, AppError> {
    let SigninForm { username, password } = form.into_inner();

    let result = web::block(move || {
        services::signin(&pool, &sessions, &mut session, &username, &password)
    })
    .await?;

    if let Some(m) = &metrics {
        let label = match &result {
            Ok(()) => "success",
            Err(AppError::NoSuchUser(_)) => "no_such_user",
            Err(e) if e.is_server_side() => "error",
            Err(_) => "unauthorized",
        };
        m.record_signin(label);
    }

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(MessageResponse::new("Signed in"))),
        Err(e) if e.is_server_side() => Err(e),
        Err(_) => Err(AppError::Unauthorized(SIGNIN_FAILED.into())),
    }
}

/// Profile and links of the signed-in account
#[get("/me")]
pub(super) async fn get_account(
    pool: web::Data<DbPool>,
    CurrentSession(session): CurrentSession,
) -> Result<HttpResponse, AppError> {
    let account = services::get_account(&pool, &session)?;
    Ok(HttpResponse::Ok().json(account))
}

/// Management entry point: anonymous callers are sent to sign in
#[get("/manage")]
pub(super) async fn manage(CurrentSession(session): CurrentSession) -> HttpResponse {
    let location = if session.signed_in {
        ACCOUNT_PATH
    } else {
        SIGNIN_REDIRECT_PATH
    };

    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, location))
        .finish()
}
