//! Prometheus metrics module for the link shortener.
//!
//! Defines business metrics for sessions, signins, link changes, redirects
//! and redirect cache performance.

use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

/// Application metrics for Prometheus monitoring
#[derive(Clone)]
pub struct AppMetrics {
    registry: Registry,
    /// Sessions issued to clients without a valid cookie
    pub sessions_created_total: Counter,
    /// Sessions removed by the background sweep
    pub sessions_evicted_total: Counter,
    /// Signin attempts with result label (success, unauthorized, no_such_user, error)
    pub signin_attempts_total: CounterVec,
    /// Total links created
    pub links_created_total: Counter,
    /// Total links removed
    pub links_removed_total: Counter,
    /// Total short-link redirects performed
    pub redirects_total: Counter,
    /// Redirect cache hit counter
    pub cache_hits_total: Counter,
    /// Redirect cache miss counter
    pub cache_misses_total: Counter,
}

impl AppMetrics {
    /// Create and register all custom metrics with the given Prometheus registry
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let counter = |name: &str, help: &str| -> Result<Counter, prometheus::Error> {
            let c = Counter::with_opts(Opts::new(name, help).namespace("shortlink"))?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };

        let sessions_created_total = counter("sessions_created_total", "Total sessions created")?;
        let sessions_evicted_total =
            counter("sessions_evicted_total", "Total expired sessions evicted")?;
        let links_created_total = counter("links_created_total", "Total links created")?;
        let links_removed_total = counter("links_removed_total", "Total links removed")?;
        let redirects_total = counter("redirects_total", "Total short-link redirects performed")?;
        let cache_hits_total = counter("redirect_cache_hits_total", "Total redirect cache hits")?;
        let cache_misses_total =
            counter("redirect_cache_misses_total", "Total redirect cache misses")?;

        let signin_attempts_total = CounterVec::new(
            Opts::new("signin_attempts_total", "Total signin attempts").namespace("shortlink"),
            &["result"],
        )?;
        registry.register(Box::new(signin_attempts_total.clone()))?;

        Ok(Self {
            registry: registry.clone(),
            sessions_created_total,
            sessions_evicted_total,
            signin_attempts_total,
            links_created_total,
            links_removed_total,
            redirects_total,
            cache_hits_total,
            cache_misses_total,
        })
    }

    /// Record a newly issued session
    pub fn record_session_created(&self) {
        self.sessions_created_total.inc();
    }

    /// Record sessions removed by one sweep pass
    pub fn record_sessions_evicted(&self, count: usize) {
        self.sessions_evicted_total.inc_by(count as f64);
    }

    /// Record a signin attempt outcome
    pub fn record_signin(&self, result: &str) {
        self.signin_attempts_total.with_label_values(&[result]).inc();
    }

    /// Record a link creation
    pub fn record_link_created(&self) {
        self.links_created_total.inc();
    }

    /// Record a link removal
    pub fn record_link_removed(&self) {
        self.links_removed_total.inc();
    }

    /// Record a redirect
    pub fn record_redirect(&self) {
        self.redirects_total.inc();
    }

    /// Record a redirect cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits_total.inc();
    }

    /// Record a redirect cache miss
    pub fn record_cache_miss(&self) {
        self.cache_misses_total.inc();
    }

    /// Render every registered metric in the text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
