//! HTTP client for the backend's REST surface.

use std::sync::Arc;

use async_trait::async_trait;
use fruit_union_core::{
    Customer, CustomerId, Delivery, DeliveryId, DeliveryStatus, DeliveryStatusChange,
    NewCustomerAccount, SubscriptionStatus,
};
use reqwest::{Method, RequestBuilder, Response, header::CONTENT_RANGE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;

use crate::config::SupabaseConfig;
use crate::gateway::{GatewayError, RemoteGateway};

use super::{
    RestQuery, SupabaseError, parse_content_range_total,
    types::{ApiErrorBody, CreateCustomerAccountParams, SubscriptionStatusPatch},
};

const CUSTOMER_ROSTER_SELECT: &str = "*,profiles(full_name,phone)";

/// Project-level client: URL, anon key and a pooled HTTP client.
///
/// Cheap to clone. Per-user calls go through [`SupabaseClient::for_user`].
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
}

impl SupabaseClient {
    /// Create a new client for the configured project.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.clone(),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    /// Project base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Scope requests to a signed-in user's access token.
    #[must_use]
    pub fn for_user(&self, access_token: &str) -> UserClient {
        UserClient {
            client: self.clone(),
            access_token: SecretString::from(access_token.to_owned()),
        }
    }

    /// Check that the auth service answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), SupabaseError> {
        let url = self.endpoint("auth/v1/health")?;
        let response = self.request(Method::GET, url, None).send().await?;
        check_response(response).await?;
        Ok(())
    }

    pub(super) fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Build a request carrying the project key and a bearer token.
    ///
    /// Without a user token the anon key doubles as the bearer.
    pub(super) fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        let anon_key = self.inner.anon_key.expose_secret();
        self.inner
            .client
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(bearer.unwrap_or(anon_key))
    }
}

/// Map non-success responses to [`SupabaseError`].
pub(super) async fn check_response(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(SupabaseError::Unauthorized(message));
    }

    Err(SupabaseError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Requests made on behalf of one signed-in user.
#[derive(Clone)]
pub struct UserClient {
    client: SupabaseClient,
    access_token: SecretString,
}

impl std::fmt::Debug for UserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserClient")
            .field("base_url", &self.client.base_url().as_str())
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl UserClient {
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url, Some(self.access_token.expose_secret()))
    }

    fn rest_url(&self, query: &RestQuery) -> Result<Url, SupabaseError> {
        Ok(query.to_url(self.client.base_url())?)
    }

    /// Fetch rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows cannot be decoded.
    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &RestQuery,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.rest_url(query)?;
        let response = self.request(Method::GET, url).send().await?;
        let response = check_response(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Exact row count for `query`, without transferring rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the count header is missing.
    pub async fn count(&self, query: &RestQuery) -> Result<u64, SupabaseError> {
        let url = self.rest_url(query)?;
        let response = self
            .request(Method::HEAD, url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = check_response(response).await?;

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or(SupabaseError::MissingCount)
    }

    /// Patch rows matching `query` and return the updated rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows cannot be decoded.
    pub async fn update<B, T>(&self, query: &RestQuery, body: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.rest_url(query)?;
        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = check_response(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Invoke a stored procedure.
    ///
    /// The result body is discarded; void functions answer with no content.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the procedure raises.
    pub async fn rpc<B>(&self, function: &str, params: &B) -> Result<(), SupabaseError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.client.endpoint(&format!("rest/v1/rpc/{function}"))?;
        let response = self
            .request(Method::POST, url)
            .json(params)
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteGateway for UserClient {
    #[instrument(skip(self))]
    async fn list_customers(&self) -> Result<Vec<Customer>, GatewayError> {
        let query = RestQuery::table("customers")
            .select(CUSTOMER_ROSTER_SELECT)
            .order("created_at", false);
        Ok(self.select(&query).await?)
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn list_deliveries(&self, customer_id: CustomerId) -> Result<Vec<Delivery>, GatewayError> {
        let query = RestQuery::table("deliveries")
            .select("*")
            .eq("customer_id", customer_id)
            .order("delivery_date", false);
        Ok(self.select(&query).await?)
    }

    async fn count_customers(&self) -> Result<u64, GatewayError> {
        Ok(self.count(&RestQuery::table("customers").select("*")).await?)
    }

    async fn count_deliveries(&self) -> Result<u64, GatewayError> {
        Ok(self.count(&RestQuery::table("deliveries").select("*")).await?)
    }

    async fn count_partners(&self) -> Result<u64, GatewayError> {
        Ok(self
            .count(&RestQuery::table("delivery_partners").select("*"))
            .await?)
    }

    async fn count_active_deliveries(&self) -> Result<u64, GatewayError> {
        let query = RestQuery::table("deliveries")
            .select("*")
            .in_("delivery_status", DeliveryStatus::ACTIVE);
        Ok(self.count(&query).await?)
    }

    #[instrument(skip(self), fields(customer_id = %customer_id, status = %status))]
    async fn update_subscription_status(
        &self,
        customer_id: CustomerId,
        status: SubscriptionStatus,
    ) -> Result<Option<Customer>, GatewayError> {
        let query = RestQuery::table("customers").eq("id", customer_id);
        let rows: Vec<Customer> = self
            .update(
                &query,
                &SubscriptionStatusPatch {
                    subscription_status: status,
                },
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self), fields(delivery_id = %delivery_id))]
    async fn update_delivery_status(
        &self,
        delivery_id: DeliveryId,
        change: DeliveryStatusChange,
    ) -> Result<Option<Delivery>, GatewayError> {
        let query = RestQuery::table("deliveries").eq("id", delivery_id);
        let rows: Vec<Delivery> = self.update(&query, &change).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip_all, fields(username = account.username()))]
    async fn create_customer_account(&self, account: &NewCustomerAccount) -> Result<(), GatewayError> {
        self.rpc(
            "create_customer_account",
            &CreateCustomerAccountParams::from(account),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> SupabaseConfig {
        SupabaseConfig {
            url: Url::parse("https://abc123.supabase.co/").unwrap(),
            anon_key: SecretString::from("anon-key".to_string()),
        }
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client = SupabaseClient::new(&config());
        let url = client.endpoint("rest/v1/rpc/create_customer_account").unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc123.supabase.co/rest/v1/rpc/create_customer_account"
        );
    }

    #[test]
    fn test_request_headers() {
        let client = SupabaseClient::new(&config());
        let url = client.endpoint("rest/v1/customers").unwrap();

        let anon = client.request(Method::GET, url.clone(), None).build().unwrap();
        assert_eq!(anon.headers()["apikey"], "anon-key");
        assert_eq!(anon.headers()["authorization"], "Bearer anon-key");

        let user = client.for_user("user-jwt");
        let req = user.request(Method::GET, url).build().unwrap();
        assert_eq!(req.headers()["apikey"], "anon-key");
        assert_eq!(req.headers()["authorization"], "Bearer user-jwt");
    }

    #[test]
    fn test_user_client_debug_redacts_token() {
        let user = SupabaseClient::new(&config()).for_user("user-jwt");
        let debug = format!("{user:?}");
        assert!(!debug.contains("user-jwt"));
        assert!(debug.contains("[REDACTED]"));
    }
}
