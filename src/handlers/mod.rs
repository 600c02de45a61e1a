//! HTTP request handlers for the link shortener.
//!
//! Defines all route handlers and configures the routing table.

mod accounts;
mod health;
mod links;
mod redirect;

use actix_web::web;

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(accounts::signin)
            .service(accounts::signup)
            .service(accounts::get_account)
            .service(links::add_link)
            .service(links::list_links)
            .service(links::remove_link)
            .default_service(web::to(redirect::api_fallback)),
    )
    // Register specific routes before catch-all route
    .service(health::health_check)
    .service(health::metrics)
    .service(accounts::manage)
    .service(redirect::not_found)
    .service(redirect::redirect_to_url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::bind_session;
    use crate::db::DbPool;
    use crate::metrics::AppMetrics;
    use crate::models::{AccountResponse, ErrorResponse, Link};
    use crate::session::SessionStore;
    use crate::test_utils::{setup_test_db, test_cache, test_sessions};
    use actix_web::body::MessageBody;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::{header, StatusCode};
    use actix_web::middleware::from_fn;
    use actix_web::{test, App};
    use prometheus::Registry;

    async fn setup_test_app(
        pool: DbPool,
        sessions: SessionStore,
    ) -> impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    > {
        let metrics = AppMetrics::new(&Registry::new()).expect("Failed to create metrics");

        test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(test_cache()))
                .app_data(web::Data::new(sessions))
                .app_data(web::Data::new(metrics))
                .wrap(from_fn(bind_session))
                .configure(configure_routes),
        )
        .await
    }

    fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == "session_id")
            .map(|c| c.into_owned())
    }

    fn location<B>(resp: &ServiceResponse<B>) -> String {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    const ALICE_FORM: &[(&str, &str)] = &[
        ("name", "Alice"),
        ("age", "30"),
        ("born", "2000-01-01"),
        ("username", "alice"),
        ("password", "pw1"),
    ];

    /// Sign up `alice` and sign in; returns the session cookie
    async fn signed_in_alice<S, B>(app: &S) -> Cookie<'static>
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::post()
            .uri("/api/signup")
            .set_form(ALICE_FORM)
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp).expect("signup should issue a session");

        let req = test::TestRequest::post()
            .uri("/api/auth")
            .cookie(cookie.clone())
            .set_form([("username", "alice"), ("password", "pw1")])
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        cookie
    }

    #[actix_rt::test]
    async fn test_full_link_lifecycle() {
        let pool = setup_test_db();
        let sessions = test_sessions();
        let app = setup_test_app(pool, sessions.clone()).await;
        let cookie = signed_in_alice(&app).await;
        assert!(sessions.get(cookie.value()).unwrap().signed_in);

        let req = test::TestRequest::post()
            .uri("/api/add")
            .cookie(cookie.clone())
            .set_form([("short", "abc123"), ("long", "https://example.com")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&resp), "/manage");

        let req = test::TestRequest::get()
            .uri("/api/get")
            .cookie(cookie.clone())
            .to_request();
        let links: Vec<Link> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            links,
            vec![Link {
                short: "abc123".into(),
                long: "https://example.com".into()
            }]
        );

        let req = test::TestRequest::get().uri("/abc123").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&resp), "https://example.com");

        let req = test::TestRequest::delete()
            .uri("/api/delete?short=abc123")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/get")
            .cookie(cookie)
            .to_request();
        let links: Vec<Link> = test::call_and_read_body_json(&app, req).await;
        assert!(links.is_empty());

        let req = test::TestRequest::get().uri("/abc123").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/notfound");
    }

    #[actix_rt::test]
    async fn test_signup_duplicate_and_invalid() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;

        let req = test::TestRequest::post()
            .uri("/api/signup")
            .set_form(ALICE_FORM)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/signup")
            .set_form(ALICE_FORM)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.code, "USERNAME_TAKEN");

        let req = test::TestRequest::post()
            .uri("/api/signup")
            .set_form([("name", "Bob"), ("username", "bob"), ("password", "pw")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Invalid input, please fill all the fields");
    }

    #[actix_rt::test]
    async fn test_signup_accepts_born_date_alias() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;

        let req = test::TestRequest::post()
            .uri("/api/signup")
            .set_form([
                ("name", "Bob"),
                ("age", "40"),
                ("bornDate", "1985-05-05"),
                ("username", "bob"),
                ("password", "pw"),
            ])
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_signin_failures_share_a_message() {
        let pool = setup_test_db();
        let sessions = test_sessions();
        let app = setup_test_app(pool, sessions.clone()).await;

        let req = test::TestRequest::post()
            .uri("/api/signup")
            .set_form(ALICE_FORM)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = session_cookie(&resp).unwrap();

        for (username, password) in [("alice", "wrong"), ("nobody", "pw1")] {
            let req = test::TestRequest::post()
                .uri("/api/auth")
                .cookie(cookie.clone())
                .set_form([("username", username), ("password", password)])
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.error, "Username or password incorrect");
        }

        assert!(!sessions.get(cookie.value()).unwrap().signed_in);
    }

    #[actix_rt::test]
    async fn test_anonymous_link_requests_are_rejected() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;

        let req = test::TestRequest::get().uri("/api/get").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&resp).is_some());

        let req = test::TestRequest::post()
            .uri("/api/add")
            .set_form([("short", "abc123"), ("long", "https://example.com")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::delete()
            .uri("/api/delete?short=abc123")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(
            body.error,
            "Cannot remove short link abc123 because you are unauthorized"
        );
    }

    #[actix_rt::test]
    async fn test_add_validation() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;
        let cookie = signed_in_alice(&app).await;

        let req = test::TestRequest::post()
            .uri("/api/add")
            .cookie(cookie.clone())
            .set_form([("short", "abc"), ("long", "https://example.com")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let long = "a".repeat(1025);
        let req = test::TestRequest::post()
            .uri("/api/add")
            .cookie(cookie.clone())
            .set_form([("short", "abc123"), ("long", long.as_str())])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::post()
            .uri("/api/add")
            .cookie(cookie.clone())
            .set_form([("short", "abc123"), ("long", "https://example.com")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::PERMANENT_REDIRECT
        );

        let req = test::TestRequest::post()
            .uri("/api/add")
            .cookie(cookie.clone())
            .set_form([("short", "abc123"), ("long", "https://other.example")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::post()
            .uri("/api/add")
            .cookie(cookie)
            .set_form([("short", "health"), ("long", "https://example.com")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::get().uri("/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_delete_requires_short_parameter() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;
        let cookie = signed_in_alice(&app).await;

        let req = test::TestRequest::delete()
            .uri("/api/delete")
            .cookie(cookie)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_rt::test]
    async fn test_account_and_manage() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;

        let req = test::TestRequest::get().uri("/manage").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&resp), "/signin?redirect=/manage");

        let cookie = signed_in_alice(&app).await;

        let req = test::TestRequest::get()
            .uri("/manage")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp), "/api/me");

        let req = test::TestRequest::get()
            .uri("/api/me")
            .cookie(cookie)
            .to_request();
        let account: AccountResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(account.username, "alice");
        assert_eq!(account.profile.born, "2000-01-01");
    }

    #[actix_rt::test]
    async fn test_not_found_routing() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;

        let req = test::TestRequest::get().uri("/zzz999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&resp), "/notfound");

        let req = test::TestRequest::get().uri("/api/unknown").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&resp), "/notfound");

        let req = test::TestRequest::get().uri("/notfound").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::get().uri("/favicon.ico").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_rt::test]
    async fn test_health_and_metrics() {
        let pool = setup_test_db();
        let app = setup_test_app(pool, test_sessions()).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");

        let req = test::TestRequest::get().uri("/zzz999").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("shortlink_redirect_cache_misses_total 1"));
    }
}
