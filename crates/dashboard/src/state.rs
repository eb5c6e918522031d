//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::gateway::RemoteGateway;
use crate::models::CurrentUser;
use crate::services::DeliveryHistoryCache;
use crate::supabase::SupabaseClient;

/// Builds the gateway a dashboard command runs against for one user.
pub type GatewayFactory = dyn Fn(&CurrentUser) -> Arc<dyn RemoteGateway> + Send + Sync;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds no per-user data: every dashboard
/// command goes through a gateway built from the session's user.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    supabase: SupabaseClient,
    history: DeliveryHistoryCache,
    gateways: Box<GatewayFactory>,
}

impl AppState {
    /// Create a new application state acting on the backend with each
    /// user's access token.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        let supabase = SupabaseClient::new(&config.supabase);
        let client = supabase.clone();
        Self::build(config, supabase, move |user: &CurrentUser| {
            Arc::new(client.for_user(&user.access_token)) as Arc<dyn RemoteGateway>
        })
    }

    /// Create an application state whose dashboard commands run against
    /// the gateways `gateways` builds. Sign-in still goes to the configured
    /// backend.
    #[must_use]
    pub fn with_gateways<F>(config: DashboardConfig, gateways: F) -> Self
    where
        F: Fn(&CurrentUser) -> Arc<dyn RemoteGateway> + Send + Sync + 'static,
    {
        let supabase = SupabaseClient::new(&config.supabase);
        Self::build(config, supabase, gateways)
    }

    fn build<F>(config: DashboardConfig, supabase: SupabaseClient, gateways: F) -> Self
    where
        F: Fn(&CurrentUser) -> Arc<dyn RemoteGateway> + Send + Sync + 'static,
    {
        let history = DeliveryHistoryCache::new(config.history_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                history,
                gateways: Box::new(gateways),
            }),
        }
    }

    /// Get a reference to the dashboard configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Get a reference to the project-level backend client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Get a reference to the shared delivery history cache.
    #[must_use]
    pub fn history(&self) -> &DeliveryHistoryCache {
        &self.inner.history
    }

    /// Backend gateway acting as `user`.
    #[must_use]
    pub fn gateway_for(&self, user: &CurrentUser) -> Arc<dyn RemoteGateway> {
        (self.inner.gateways)(user)
    }
}
