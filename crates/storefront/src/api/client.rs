//! HTTP client for the REST API.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use heavyline_core::ProductId;

use super::ApiError;
use super::types::{
    CurrentUserRecord, ErrorBody, OrderPayload, OrderRecord, PriceListRecord, TokenResponse,
    VehicleRecord,
};
use crate::config::StorefrontConfig;
use crate::models::AuthSession;

/// Header carrying a per-attempt request ID for log correlation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client for the catalog, auth and order endpoints.
///
/// # Authentication
///
/// The bearer token obtained at login is cached in memory and attached to
/// every subsequent request. Clones share the same token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    /// In-memory token cache
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the API at `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("heavyline-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                token: RwLock::new(None),
            }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Token
    // =========================================================================

    /// Set the bearer token (after login or when restoring from storage).
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Drop the cached bearer token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a bearer token is currently cached.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// The token is returned, not cached; callers decide whether to keep it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for wrong credentials, or another
    /// `ApiError` if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/login")?)
            .form(&[("username", email), ("password", password.expose_secret())])
            .send()
            .await?;

        let token: TokenResponse = read_json(response, "login").await?;
        Ok(SecretString::from(token.access_token))
    }

    /// Fetch the user the cached token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if there is no valid session.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<AuthSession, ApiError> {
        let request = self.inner.client.get(self.endpoint("auth/me")?);
        let response = self.authorized(request).await.send().await?;

        let record: CurrentUserRecord = read_json(response, "current user").await?;
        if !record.is_active {
            return Err(ApiError::Unauthorized);
        }
        Ok(record.into())
    }

    /// End the server-side session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = self.inner.client.post(self.endpoint("auth/logout")?);
        let response = self.authorized(request).await.send().await?;
        ensure_success(response, "logout").await.map(drop)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the vehicle does not exist.
    #[instrument(skip(self), fields(vehicle_id = %id))]
    pub async fn vehicle(&self, id: ProductId) -> Result<VehicleRecord, ApiError> {
        let request = self.inner.client.get(self.endpoint(&format!("vehicles/{id}"))?);
        let response = self.authorized(request).await.send().await?;
        read_json(response, &format!("vehicle {id}")).await
    }

    /// Fetch the price list entries for a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(vehicle_id = %id))]
    pub async fn vehicle_prices(&self, id: ProductId) -> Result<Vec<PriceListRecord>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.endpoint(&format!("price-list/vehicle/{id}"))?);
        let response = self.authorized(request).await.send().await?;
        read_json(response, &format!("prices for vehicle {id}")).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order request.
    ///
    /// Sends exactly one request; no retries.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with the backend's detail message if the order
    /// is rejected, or `ApiError::Http` on transport failure.
    #[instrument(skip(self, payload), fields(lines = payload.tovary_v_zayavke.len(), %request_id))]
    pub async fn create_order(
        &self,
        payload: &OrderPayload,
        request_id: Uuid,
    ) -> Result<OrderRecord, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("requests/create-order")?)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(payload);
        let response = self.authorized(request).await.send().await?;
        read_json(response, "order").await
    }

    /// Order requests placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if there is no valid session.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<OrderRecord>, ApiError> {
        let request = self.inner.client.get(self.endpoint("requests/my/")?);
        let response = self.authorized(request).await.send().await?;
        read_json(response, "orders").await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.inner.token.read().await.as_ref() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

/// Map non-success statuses to `ApiError`, passing successful responses through.
async fn ensure_success(response: Response, what: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(what.to_string())),
        _ => {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .map_or(text, |body| body.message());
            Err(ApiError::Api {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
    let response = ensure_success(response, what).await?;
    response
        .json()
        .await
        .map_err(|e| ApiError::Parse(format!("{what}: {e}")))
}
