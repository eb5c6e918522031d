//! Sign-in, sign-out and current-user routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use fruit_union_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalUser, clear_current_user, refresh_if_expired, set_current_user};
use crate::models::{CurrentUser, SessionUser};
use crate::state::AppState;
use crate::supabase::SupabaseError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Sign-in form. `login` is an email address or a bare username.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Sign in and start a dashboard session.
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionUser>, AppError> {
    let email =
        Email::from_login(&request.login).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if request.password.is_empty() {
        return Err(AppError::BadRequest("password cannot be empty".to_string()));
    }

    let auth = match state
        .supabase()
        .sign_in_with_password(&email, &request.password)
        .await
    {
        Ok(auth) => auth,
        Err(SupabaseError::Api { status: 400, .. } | SupabaseError::Unauthorized(_)) => {
            warn!(email = %email, "Sign-in rejected");
            return Err(AppError::Unauthorized(
                "Invalid login credentials".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let role = state
        .supabase()
        .fetch_role(&auth.access_token, auth.user.id)
        .await?
        .filter(|role| role.dashboard_path().is_some())
        .ok_or_else(|| AppError::Forbidden("This account has no dashboard access".to_string()))?;

    let email = auth
        .user
        .email
        .as_deref()
        .and_then(|e| Email::parse(e).ok())
        .unwrap_or(email);
    let user = CurrentUser::signed_in(auth, email, role, Utc::now());

    // Fresh session ID on privilege change.
    session.cycle_id().await?;
    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id.to_string(), Some(user.email.as_str()));

    info!(user_id = %user.id, role = %user.role, "Signed in");
    Ok(Json(SessionUser::from(&user)))
}

/// Revoke the backend session and clear the dashboard session.
///
/// A failed backend sign-out is logged; the local session is cleared anyway.
async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<StatusCode, AppError> {
    if let Some(user) = user {
        if let Err(e) = state.supabase().sign_out(&user.access_token).await {
            warn!(error = %e, user_id = %user.id, "Backend sign-out failed");
        }
        info!(user_id = %user.id, "Signed out");
    }

    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user, once their backend session is confirmed current.
async fn me(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<Json<SessionUser>, AppError> {
    let user = user.ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;
    let user = refresh_if_expired(&state, &session, user).await?;
    Ok(Json(SessionUser::from(&user)))
}
