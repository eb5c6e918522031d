//! Password sign-in, token refresh, sign-out and role lookup.

use fruit_union_core::{Email, UserId, UserRole};
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use super::{
    RestQuery, SupabaseClient, SupabaseError,
    client::check_response,
    types::{PasswordGrant, RefreshGrant, RoleRow},
};

/// Tokens issued by a successful sign-in.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

/// The identity a session belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl SupabaseClient {
    /// Sign in with an email address and password.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] (usually status 400) for bad
    /// credentials, or a transport error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.set_query(Some("grant_type=password"));

        let response = self
            .request(Method::POST, url, None)
            .json(&PasswordGrant {
                email: email.as_str(),
                password,
            })
            .send()
            .await?;
        let response = check_response(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] (usually status 400) when the refresh
    /// token was revoked or already used, or a transport error.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.set_query(Some("grant_type=refresh_token"));

        let response = self
            .request(Method::POST, url, None)
            .json(&RefreshGrant { refresh_token })
            .send()
            .await?;
        let response = check_response(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Revoke the session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .request(Method::POST, url, Some(access_token))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    /// Look up the dashboard role assigned to `user_id`.
    ///
    /// When several roles are assigned the most privileged wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn fetch_role(
        &self,
        access_token: &str,
        user_id: UserId,
    ) -> Result<Option<UserRole>, SupabaseError> {
        let query = RestQuery::table("user_roles")
            .select("role")
            .eq("user_id", user_id);
        let rows: Vec<RoleRow> = self.for_user(access_token).select(&query).await?;
        Ok(highest_role(rows.into_iter().map(|row| row.role)))
    }
}

fn highest_role(roles: impl IntoIterator<Item = UserRole>) -> Option<UserRole> {
    roles.into_iter().min_by_key(|role| match role {
        UserRole::Admin => 0,
        UserRole::DeliveryPartner => 1,
        UserRole::Customer => 2,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_session_deserialize() {
        let json = r#"{
            "access_token": "eyJhbGciOi",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r-123",
            "user": {"id": "0b7f8a4e-3c51-4f3e-8f60-5d2b9c1a7e21", "email": "jane_d@internal.local"}
        }"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "eyJhbGciOi");
        assert_eq!(session.user.email.as_deref(), Some("jane_d@internal.local"));

        let debug = format!("{session:?}");
        assert!(!debug.contains("eyJhbGciOi"));
        assert!(!debug.contains("r-123"));
    }

    #[test]
    fn test_highest_role() {
        assert_eq!(
            highest_role([UserRole::Customer, UserRole::DeliveryPartner]),
            Some(UserRole::DeliveryPartner)
        );
        assert_eq!(
            highest_role([UserRole::DeliveryPartner, UserRole::Admin]),
            Some(UserRole::Admin)
        );
        assert_eq!(highest_role([]), None);
    }
}
