//! Backend REST client (Supabase: PostgREST + GoTrue).
//!
//! # Architecture
//!
//! - [`SupabaseClient`] holds the shared HTTP client, project URL and anon key
//! - [`UserClient`] scopes requests to one signed-in user's access token, so
//!   row-level security applies; it implements
//!   [`RemoteGateway`](crate::gateway::RemoteGateway)
//! - [`RestQuery`] renders PostgREST filter/order/select URLs
//! - No retries and no request timeout: a hung call hangs its caller
//!
//! # Example
//!
//! ```rust,ignore
//! use fruit_union_dashboard::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase);
//! let session = client.sign_in_with_password(&email, "secret123").await?;
//! let user = client.for_user(&session.access_token);
//! let customers = user.list_customers().await?;
//! ```

mod auth;
mod client;
mod query;
pub mod types;

pub use auth::{AuthSession, AuthUser};
pub use client::{SupabaseClient, UserClient};
pub use query::{RestQuery, parse_content_range_total};

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A count request came back without a usable `Content-Range` header.
    #[error("response did not include an exact count")]
    MissingCount,

    /// Building a request URL failed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_error_display() {
        let err = SupabaseError::Api {
            status: 409,
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (409): duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn test_unauthorized_error() {
        let err = SupabaseError::Unauthorized("JWT expired".to_string());
        assert_eq!(err.to_string(), "Unauthorized: JWT expired");
    }
}
