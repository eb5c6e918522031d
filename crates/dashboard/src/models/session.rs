//! Session-related types for dashboard authentication.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, TimeDelta, Utc};
use fruit_union_core::{Email, UserId, UserRole};
use serde::{Deserialize, Serialize};

use crate::supabase::AuthSession;

/// How long before expiry an access token is renewed.
const REFRESH_MARGIN: TimeDelta = TimeDelta::seconds(60);

/// Session-stored user identity.
///
/// Tokens are kept server-side only; they never appear in a response body
/// or in `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// Login address.
    pub email: Email,
    /// Dashboard role.
    pub role: UserRole,
    /// Bearer token for backend calls made on this user's behalf.
    pub access_token: String,
    /// Token exchanged for a new access token once this one expires.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CurrentUser {
    /// The user a sign-in produced.
    #[must_use]
    pub fn signed_in(auth: AuthSession, email: Email, role: UserRole, now: DateTime<Utc>) -> Self {
        Self {
            id: auth.user.id,
            email,
            role,
            access_token: String::new(),
            refresh_token: None,
            expires_at: None,
        }
        .renewed(auth, now)
    }

    /// Take the tokens from a refreshed backend session.
    ///
    /// The old refresh token is kept if the backend did not rotate it.
    #[must_use]
    pub fn renewed(mut self, auth: AuthSession, now: DateTime<Utc>) -> Self {
        self.access_token = auth.access_token;
        self.refresh_token = auth.refresh_token.or(self.refresh_token);
        self.expires_at = auth
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| now + TimeDelta::seconds(secs));
        self
    }

    /// Whether the access token is expired or about to be.
    ///
    /// Tokens without a known expiry are never refreshed.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - REFRESH_MARGIN <= now)
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Public view of the session user.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    /// Dashboard this role lands on, if any.
    pub dashboard: Option<&'static str>,
}

impl From<&CurrentUser> for SessionUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            dashboard: user.role.dashboard_path(),
        }
    }
}

/// Session keys for dashboard state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the last administrator dashboard view.
    pub const ADMIN_VIEW: &str = "admin_view";

    /// Key for the last delivery partner dashboard view.
    pub const PARTNER_VIEW: &str = "partner_view";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::supabase::AuthUser;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::random(),
            email: Email::parse("ops@fruitunion.in").unwrap(),
            role,
            access_token: "eyJhbGciOi".to_string(),
            refresh_token: Some("r-123".to_string()),
            expires_at: None,
        }
    }

    fn auth(access_token: &str, refresh_token: Option<&str>, expires_in: Option<u64>) -> AuthSession {
        AuthSession {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            expires_in,
            user: AuthUser {
                id: UserId::random(),
                email: None,
            },
        }
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", user(UserRole::Admin));
        assert!(!debug.contains("eyJhbGciOi"));
        assert!(!debug.contains("r-123"));
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let signed_in = CurrentUser::signed_in(
            auth("a-1", Some("r-1"), Some(3600)),
            Email::parse("ops@fruitunion.in").unwrap(),
            UserRole::Admin,
            now,
        );
        assert_eq!(signed_in.expires_at, Some(now + TimeDelta::hours(1)));
        assert!(!signed_in.needs_refresh(now));
        assert!(signed_in.needs_refresh(now + TimeDelta::minutes(59) + TimeDelta::seconds(1)));
        assert!(signed_in.needs_refresh(now + TimeDelta::hours(2)));

        // Unknown expiry: only a backend rejection ends the session.
        assert!(!user(UserRole::Admin).needs_refresh(now + TimeDelta::days(365)));
    }

    #[test]
    fn test_renewed_keeps_unrotated_refresh_token() {
        let now = Utc::now();
        let renewed = user(UserRole::DeliveryPartner).renewed(auth("a-2", None, Some(60)), now);
        assert_eq!(renewed.access_token, "a-2");
        assert_eq!(renewed.refresh_token.as_deref(), Some("r-123"));
        assert!(renewed.needs_refresh(now));

        let rotated = renewed.renewed(auth("a-3", Some("r-456"), Some(3600)), now);
        assert_eq!(rotated.refresh_token.as_deref(), Some("r-456"));
    }

    #[test]
    fn test_sessions_stored_before_expiry_tracking_still_load() {
        let json = serde_json::json!({
            "id": UserId::random(),
            "email": "ops@fruitunion.in",
            "role": "admin",
            "access_token": "a-1",
        });
        let user: CurrentUser = serde_json::from_value(json).unwrap();
        assert!(user.refresh_token.is_none());
        assert!(!user.needs_refresh(Utc::now()));
    }

    #[test]
    fn test_session_user_has_no_token() {
        let json = serde_json::to_value(SessionUser::from(&user(UserRole::DeliveryPartner))).unwrap();
        assert!(json.get("access_token").is_none());
        assert_eq!(json["role"], "delivery_partner");
        assert_eq!(json["dashboard"], "/partner");
    }
}
