//! Session middleware configuration for the dashboards.
//!
//! Sessions live in a bounded moka cache (SameSite=Strict, 24hr inactivity
//! expiry). Expired records are evicted by the cache itself, and past
//! `session_capacity` the least recently used session goes first. Sessions
//! do not survive a restart; users sign in again.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::DashboardConfig;

/// Session cookie name for the dashboards.
pub const SESSION_COOKIE_NAME: &str = "fu_dashboard_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session store holding at most `capacity` sessions.
#[must_use]
pub fn create_session_store(capacity: u64) -> MokaStore {
    MokaStore::new(Some(capacity))
}

/// Create the session layer over a bounded in-memory store.
#[must_use]
pub fn create_session_layer(config: &DashboardConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(create_session_store(config.session_capacity))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::{
        SessionStore,
        cookie::time::{Duration, OffsetDateTime},
        session::{Id, Record},
    };

    use super::*;

    fn record(expires_in: Duration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::from([("admin_view".to_string(), serde_json::json!({"customers": []}))]),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_live_session_is_loaded() {
        let store = create_session_store(10);
        let mut live = record(Duration::hours(1));
        store.create(&mut live).await.unwrap();

        let loaded = store.load(&live.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, live.data);
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let store = create_session_store(10);
        let mut stale = record(Duration::seconds(-5));
        store.create(&mut stale).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());
    }
}
