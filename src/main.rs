//! # Shortlink
//!
//! A small URL shortener built with Rust, Actix-web, and SQLite.
//!
//! ## Features
//! - Account signup and signin with cookie-bound sessions
//! - Six-character short links owned by the account that created them
//! - Permanent redirects from short codes, served through a cache
//! - Prometheus metrics

mod auth;
mod cache;
mod config;
mod constants;
mod credentials;
mod db;
mod errors;
mod handlers;
mod metrics;
mod models;
mod queries;
mod services;
mod session;
#[cfg(test)]
mod test_utils;

use actix_web::{middleware::from_fn, middleware::Logger, web, App, HttpServer};
use log::info;
use prometheus::Registry;

use crate::session::{SessionStore, SessionSweeper};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env();

    // The store is the only fatal startup dependency
    let pool = db::init_pool(&config.database_url).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");

    let app_metrics = if config.metrics_enabled {
        let registry = Registry::new();
        let metrics =
            metrics::AppMetrics::new(&registry).expect("Failed to register Prometheus metrics");
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics)
    } else {
        None
    };

    let mut sessions =
        SessionStore::new(config.session_cookie_name.clone(), config.session_lifetime());
    if let Some(m) = &app_metrics {
        sessions = sessions.with_metrics(m.clone());
    }

    let app_cache =
        cache::AppCache::new(config.redirect_cache_ttl_secs, config.redirect_cache_max_capacity);

    info!(
        "Cache initialized: redirect TTL={}s, capacity={}",
        config.redirect_cache_ttl_secs, config.redirect_cache_max_capacity
    );
    info!(
        "Sessions: cookie={}, lifetime={}s, sweep every {}s",
        config.session_cookie_name, config.session_lifetime_secs, config.session_sweep_interval_secs
    );

    let sweeper = SessionSweeper::spawn(sessions.clone(), config.session_sweep_interval());

    let bind_addr = config.bind_addr();
    info!("Starting Shortlink server at http://{}", bind_addr);
    info!("   POST   /api/signup         - Create an account");
    info!("   POST   /api/auth           - Sign in");
    info!("   POST   /api/add            - Add a short link");
    info!("   GET    /api/get            - List your links");
    info!("   DELETE /api/delete?short=  - Remove a link");
    info!("   GET    /{{short_code}}       - Redirect to the long URL");

    let server = HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(app_cache.clone()))
            .app_data(web::Data::new(sessions.clone()));

        if let Some(m) = &app_metrics {
            app = app.app_data(web::Data::new(m.clone()));
        }

        app.wrap(from_fn(auth::bind_session))
            .wrap(Logger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await;

    sweeper.shutdown().await;
    server
}
