//! In-memory session store and the background sweep that expires sessions.
//!
//! Sessions live only in this process and are lost on restart. Every read
//! and write of the map goes through one mutex; nothing inside the critical
//! sections does I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use rand::RngCore;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::constants::{ANONYMOUS_ACCOUNT_ID, SESSION_ID_BYTES};
use crate::errors::AppError;
use crate::metrics::AppMetrics;

/// Per-client state referenced by the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque 128-bit random id, hex encoded
    pub id: String,
    /// `0` until the session signs in
    pub account_id: i64,
    /// Set only by a successful signin
    pub signed_in: bool,
    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn anonymous(id: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id,
            account_id: ANONYMOUS_ACCOUNT_ID,
            signed_in: false,
            expires_at,
        }
    }

    /// A session is dead from the instant it reaches `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Leading characters of the id, safe to put in logs
    pub fn log_id(&self) -> &str {
        short(&self.id)
    }
}

/// Outcome of [`SessionStore::resolve`]
#[derive(Debug, Clone)]
pub struct Resolved {
    pub session: Session,
    /// True when the session was created for this request and the
    /// response must carry a fresh cookie
    pub is_new: bool,
}

/// Concurrent map of session id to [`Session`].
///
/// Cloning is cheap; all clones share the same map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    cookie_name: String,
    max_life: chrono::Duration,
    metrics: Option<AppMetrics>,
}

impl SessionStore {
    /// Create an empty store issuing sessions that live for `max_life`
    pub fn new(cookie_name: impl Into<String>, max_life: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            cookie_name: cookie_name.into(),
            max_life: chrono::Duration::from_std(max_life)
                .unwrap_or_else(|_| chrono::Duration::days(365)),
            metrics: None,
        }
    }

    /// Record session creations and evictions in `metrics`
    pub fn with_metrics(mut self, metrics: AppMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Name of the cookie carrying the session id
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    // Every critical section is a single map call, so a poisoned map is
    // never half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the live session named by `cookie`, or create an anonymous one.
    pub fn resolve(&self, cookie: Option<&str>) -> Resolved {
        self.resolve_at(cookie, Utc::now())
    }

    pub(crate) fn resolve_at(&self, cookie: Option<&str>, now: DateTime<Utc>) -> Resolved {
        let mut sessions = self.lock();

        match cookie.filter(|id| !id.is_empty()) {
            Some(id) => match sessions.get(id).cloned() {
                Some(session) if !session.is_expired_at(now) => {
                    return Resolved {
                        session,
                        is_new: false,
                    };
                }
                Some(_) => {
                    log::info!("Session {} expired, replacing it", short(id));
                    sessions.remove(id);
                }
                None => log::info!("Session {} unrecognized, creating a new one", short(id)),
            },
            None => log::debug!("No session id provided, creating a new session"),
        }

        let mut id = generate_session_id();
        while sessions.contains_key(&id) {
            id = generate_session_id();
        }

        let expires_at = now
            .checked_add_signed(self.max_life)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = Session::anonymous(id.clone(), expires_at);
        sessions.insert(id, session.clone());
        drop(sessions);

        if let Some(m) = &self.metrics {
            m.record_session_created();
        }
        log::info!("Created session {}", session.log_id());

        Resolved {
            session,
            is_new: true,
        }
    }

    /// Mark a session as signed in to `account_id`.
    ///
    /// Fails when the session has expired or been swept since it was resolved.
    pub fn elevate(&self, session_id: &str, account_id: i64) -> Result<(), AppError> {
        if account_id == ANONYMOUS_ACCOUNT_ID {
            return Err(AppError::internal("Cannot elevate a session to the anonymous account"));
        }

        let mut sessions = self.lock();
        match sessions.get_mut(session_id) {
            Some(session) if !session.is_expired_at(Utc::now()) => {
                session.signed_in = true;
                session.account_id = account_id;
                Ok(())
            }
            _ => {
                log::warn!("Session {} vanished before it could be elevated", short(session_id));
                Err(AppError::Unauthorized("Session expired, please sign in again".into()))
            }
        }
    }

    /// Look up a session by id without creating one
    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.lock().get(session_id).cloned()
    }

    /// Remove every session that has expired; returns how many were removed
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    pub(crate) fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let evicted = {
            let mut sessions = self.lock();
            let before = sessions.len();
            sessions.retain(|_, session| !session.is_expired_at(now));
            before - sessions.len()
        };

        if evicted > 0 {
            log::info!("Evicted {} expired session(s)", evicted);
            if let Some(m) = &self.metrics {
                m.record_sessions_evicted(evicted);
            }
        }
        evicted
    }

    /// Number of sessions currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Response cookie that hands `session` to the client
    pub fn cookie_for(&self, session: &Session) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.cookie_name.clone(), session.id.clone())
            .path("/")
            .same_site(SameSite::Strict)
            .finish();

        if let Ok(expires) = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp()) {
            cookie.set_expires(expires);
        }
        cookie
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    hex::encode(bytes)
}

/// Sleep before the next sweep so passes start `interval` apart
fn next_wait(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

// ============================================================================
// Background Sweep
// ============================================================================

/// Handle to the task that periodically calls [`SessionStore::evict_expired`].
///
/// Passes start a fixed `interval` apart: the sleep after each pass is
/// shortened by the time the pass itself took (never below zero).
pub struct SessionSweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl SessionSweeper {
    /// Start sweeping `store` on the current actix runtime
    pub fn spawn(store: SessionStore, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = actix_web::rt::spawn(async move {
            log::info!("Session sweeper started, interval {:?}", interval);
            loop {
                let started = Instant::now();
                store.evict_expired();
                let wait = next_wait(interval, started.elapsed());

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = &mut shutdown_rx => break,
                }
            }
            log::info!("Session sweeper stopped");
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    /// Stop the sweep after the pass in progress (if any) and wait for it
    pub async fn shutdown(self) {
        let Self { shutdown, handle } = self;
        if let Some(tx) = shutdown {
            let _ = tx.send(());
        }
        if let Err(e) = handle.await {
            log::warn!("Session sweeper ended abnormally: {}", e);
        }
    }
}
