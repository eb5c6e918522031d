//! HTTP middleware stack for the dashboards.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Session layer (tower-sessions, bounded moka store)
//! 4. Request ID (recorded on the span, echoed in the response)
//!
//! Role checks happen in the [`RequireAdmin`] and [`RequireDeliveryPartner`]
//! extractors rather than as a layer; expired access tokens are renewed by
//! [`refresh_if_expired`] before a dashboard command runs.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    AuthRejection, OptionalUser, RequireAdmin, RequireDeliveryPartner, clear_current_user,
    refresh_if_expired, set_current_user,
};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, create_session_store};
