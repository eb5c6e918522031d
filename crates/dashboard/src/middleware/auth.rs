//! Authentication extractors for the dashboards.
//!
//! Handlers state the role they need in their signature, then pass the user
//! through [`refresh_if_expired`] before acting for them:
//!
//! ```rust,ignore
//! async fn admin_home(RequireAdmin(user): RequireAdmin) -> impl IntoResponse {
//!     format!("Hello, {}!", user.email)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use fruit_union_core::UserRole;
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Error returned when a dashboard route is hit without the right user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No signed-in user.
    Unauthorized,
    /// Signed in, but with another role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Not signed in").into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Your role cannot access this dashboard",
            )
                .into_response(),
        }
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

async fn require_role(parts: &Parts, role: UserRole) -> Result<CurrentUser, AuthRejection> {
    let user = session_user(parts)
        .await
        .ok_or(AuthRejection::Unauthorized)?;
    set_sentry_user(&user.id.to_string(), Some(user.email.as_str()));

    if user.role == role {
        Ok(user)
    } else {
        warn!(user_id = %user.id, role = %user.role, required = %role, "Dashboard access denied");
        Err(AuthRejection::Forbidden)
    }
}

/// Extractor that requires a signed-in administrator.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, UserRole::Admin).await.map(Self)
    }
}

/// Extractor that requires a signed-in delivery partner.
pub struct RequireDeliveryPartner(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireDeliveryPartner
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, UserRole::DeliveryPartner)
            .await
            .map(Self)
    }
}

/// Extractor that optionally gets the current user.
///
/// Never rejects; `None` when nobody is signed in.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

/// Store the signed-in user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop the user and every stored view from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Renew the user's access token when it has expired or is about to.
///
/// The renewed tokens are written back to the session. When the backend
/// refuses the refresh token, or there is none, the session is cleared and
/// the request answers 401 so the client signs in again.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] when the session can no longer act
/// for the user, or [`AppError::Backend`] when the backend is unreachable.
pub async fn refresh_if_expired(
    state: &AppState,
    session: &Session,
    user: CurrentUser,
) -> Result<CurrentUser, AppError> {
    let now = Utc::now();
    if !user.needs_refresh(now) {
        return Ok(user);
    }
    let Some(refresh_token) = user.refresh_token.clone() else {
        return end_expired_session(session, &user).await;
    };

    match state.supabase().refresh_session(&refresh_token).await {
        Ok(auth) => {
            let user = user.renewed(auth, now);
            set_current_user(session, &user).await?;
            debug!(user_id = %user.id, "Access token refreshed");
            Ok(user)
        }
        Err(SupabaseError::Api { status: 400, .. } | SupabaseError::Unauthorized(_)) => {
            end_expired_session(session, &user).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn end_expired_session(session: &Session, user: &CurrentUser) -> Result<CurrentUser, AppError> {
    warn!(user_id = %user.id, "Backend session expired");
    clear_current_user(session).await?;
    clear_sentry_user();
    Err(AppError::Unauthorized(
        "Session expired, please sign in again".to_string(),
    ))
}
