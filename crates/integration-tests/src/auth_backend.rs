//! A stand-in for the backend's auth service.
//!
//! Serves password and refresh-token grants, sign-out and the `user_roles`
//! lookup on a local port so the dashboard router can sign users in for
//! real. Dashboard data itself comes from an [`InMemoryGateway`].
//!
//! [`InMemoryGateway`]: fruit_union_dashboard::gateway::InMemoryGateway

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use fruit_union_core::{UserId, UserRole};
use fruit_union_dashboard::config::{DashboardConfig, SupabaseConfig};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

/// Lifetime of issued access tokens, unless an account overrides it.
pub const TOKEN_LIFETIME_SECS: u64 = 3600;

#[derive(Debug, Clone)]
struct Account {
    login: String,
    password: String,
    id: UserId,
    role: UserRole,
    expires_in: u64,
}

#[derive(Debug, Default)]
struct AuthState {
    accounts: Vec<Account>,
    /// Live refresh tokens and the account they belong to.
    refresh_tokens: HashMap<String, UserId>,
    issued: u32,
    refresh_grants: usize,
}

impl AuthState {
    fn issue(&mut self, account: &Account) -> Value {
        self.issued += 1;
        let refresh_token = format!("refresh-{}", self.issued);
        self.refresh_tokens.insert(refresh_token.clone(), account.id);
        json!({
            "access_token": format!("access-{}", self.issued),
            "token_type": "bearer",
            "expires_in": account.expires_in,
            "refresh_token": refresh_token,
            "user": {"id": account.id, "email": account.login},
        })
    }
}

/// A running auth service on `127.0.0.1`.
#[derive(Clone)]
pub struct AuthBackend {
    addr: SocketAddr,
    state: Arc<Mutex<AuthState>>,
}

impl AuthBackend {
    /// Bind a free port and serve on the current runtime.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(AuthState::default()));
        let router = Router::new()
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/logout", post(logout))
            .route("/rest/v1/user_roles", get(user_roles))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account whose access tokens live [`TOKEN_LIFETIME_SECS`].
    pub fn add_account(&self, login: &str, password: &str, role: UserRole) -> UserId {
        self.add_account_with_lifetime(login, password, role, TOKEN_LIFETIME_SECS)
    }

    /// Register an account whose access tokens live `expires_in` seconds.
    pub fn add_account_with_lifetime(
        &self,
        login: &str,
        password: &str,
        role: UserRole,
        expires_in: u64,
    ) -> UserId {
        let id = UserId::random();
        self.lock().accounts.push(Account {
            login: login.to_owned(),
            password: password.to_owned(),
            id,
            role,
            expires_in,
        });
        id
    }

    /// Invalidate every refresh token issued so far.
    pub fn revoke_refresh_tokens(&self) {
        self.lock().refresh_tokens.clear();
    }

    /// How many refresh-token grants were answered, successful or not.
    #[must_use]
    pub fn refresh_grants(&self) -> usize {
        self.lock().refresh_grants
    }

    /// Dashboard config pointed at this service.
    #[must_use]
    pub fn config(&self) -> DashboardConfig {
        DashboardConfig::with_defaults(
            "http://localhost:3001",
            SupabaseConfig {
                url: Url::parse(&format!("http://{}", self.addr)).unwrap(),
                anon_key: SecretString::from("test-anon-key".to_string()),
            },
        )
    }
}

fn invalid_grant(description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "invalid_grant", "error_description": description})),
    )
        .into_response()
}

async fn token(
    State(state): State<Arc<Mutex<AuthState>>>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    match params.get("grant_type").map(String::as_str) {
        Some("password") => {
            let account = state
                .accounts
                .iter()
                .find(|a| body["email"] == a.login.as_str() && body["password"] == a.password.as_str())
                .cloned();
            match account {
                Some(account) => Json(state.issue(&account)).into_response(),
                None => invalid_grant("Invalid login credentials"),
            }
        }
        Some("refresh_token") => {
            state.refresh_grants += 1;
            let owner = body["refresh_token"]
                .as_str()
                .and_then(|t| state.refresh_tokens.remove(t));
            let account = owner.and_then(|id| state.accounts.iter().find(|a| a.id == id).cloned());
            match account {
                Some(account) => Json(state.issue(&account)).into_response(),
                None => invalid_grant("Invalid Refresh Token: Refresh Token Not Found"),
            }
        }
        _ => invalid_grant("unsupported grant type"),
    }
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn user_roles(
    State(state): State<Arc<Mutex<AuthState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let filter = params.get("user_id").map(String::as_str);
    let roles: Vec<Value> = state
        .accounts
        .iter()
        .filter(|a| filter == Some(format!("eq.{}", a.id).as_str()))
        .map(|a| json!({"role": a.role}))
        .collect();
    Json(Value::Array(roles))
}
