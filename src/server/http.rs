//! HTTP client for the JSON API cart endpoints.

use std::{sync::RwLock, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cart::Cart,
    payload::CartPayload,
    products::ProductId,
    server::{ServerCartError, ServerCartStore, validate_insert_quantity, validate_product},
    users::UserId,
};

/// Connection settings for [`HttpServerCartStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// API base URL, e.g. `https://shop.example.com/api`
    pub base_url: String,

    /// Upper bound for a single request, including reading the response
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    10_000
}

impl HttpStoreConfig {
    /// Settings for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest {
    product_id: i64,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct SetQuantityRequest {
    quantity: i64,
}

/// Server cart store reached over HTTP.
///
/// Requests carry the session's bearer token, which the host sets when the user signs in.
/// Without a token every call fails with [`ServerCartError::Unauthenticated`] and no request is
/// sent.
#[derive(Debug)]
pub struct HttpServerCartStore {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpServerCartStore {
    /// Build a client for the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`ServerCartError::Unavailable`] if the HTTP client cannot be constructed.
    pub fn new(config: &HttpStoreConfig) -> Result<Self, ServerCartError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|error| ServerCartError::Unavailable(error.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Set or forget the bearer token used for requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerCartError::Unavailable`] when the token lock is poisoned.
    pub fn set_bearer_token(&self, token: Option<String>) -> Result<(), ServerCartError> {
        *self
            .token
            .write()
            .map_err(|error| ServerCartError::Unavailable(error.to_string()))? = token;

        Ok(())
    }

    fn bearer_token(&self) -> Result<String, ServerCartError> {
        self.token
            .read()
            .map_err(|error| ServerCartError::Unavailable(error.to_string()))?
            .clone()
            .ok_or(ServerCartError::Unauthenticated)
    }

    fn cart_url(&self, user: UserId) -> String {
        format!("{}/users/{user}/cart", self.base_url)
    }

    fn item_url(&self, user: UserId, product: ProductId) -> String {
        format!("{}/items/{product}", self.cart_url(user))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Cart, ServerCartError> {
        let token = self.bearer_token()?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();

        if status.is_success() {
            let payload: CartPayload = response.json().await.map_err(transport_error)?;

            return Cart::try_from(payload)
                .map_err(|error| ServerCartError::Unavailable(error.to_string()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                debug!(%error, "failed to read error response body");

                String::new()
            }
        };

        let error = error_for_status(status, body);

        warn!(%status, %error, "cart request rejected");

        Err(error)
    }
}

#[async_trait]
impl ServerCartStore for HttpServerCartStore {
    async fn get_or_create(&self, user: UserId) -> Result<Cart, ServerCartError> {
        self.send(self.client.get(self.cart_url(user))).await
    }

    async fn add_item(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<Cart, ServerCartError> {
        validate_product(product)?;
        validate_insert_quantity(quantity)?;

        let request = self
            .client
            .post(format!("{}/items", self.cart_url(user)))
            .json(&AddItemRequest {
                product_id: product.get(),
                quantity,
            });

        self.send(request).await
    }

    async fn set_quantity(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, ServerCartError> {
        validate_product(product)?;

        let request = self
            .client
            .put(self.item_url(user, product))
            .json(&SetQuantityRequest { quantity });

        self.send(request).await
    }

    async fn remove_item(&self, user: UserId, product: ProductId) -> Result<Cart, ServerCartError> {
        validate_product(product)?;

        self.send(self.client.delete(self.item_url(user, product)))
            .await
    }

    async fn clear(&self, user: UserId) -> Result<Cart, ServerCartError> {
        self.send(self.client.delete(self.cart_url(user))).await
    }
}

fn transport_error(error: reqwest::Error) -> ServerCartError {
    if error.is_timeout() {
        ServerCartError::Timeout
    } else {
        ServerCartError::Unavailable(error.to_string())
    }
}

/// Map a non-success response onto the cart error taxonomy.
///
/// `403 Forbidden` means the bearer token belongs to a different user than the cart being
/// addressed. The credentials no longer match the signed-in user, so it is reported as
/// [`ServerCartError::Unauthenticated`] and the controller drops back to the local cart.
fn error_for_status(status: StatusCode, body: String) -> ServerCartError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServerCartError::Unauthenticated,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServerCartError::Validation(body)
        }
        StatusCode::NOT_FOUND => ServerCartError::NotFound,
        StatusCode::CONFLICT => ServerCartError::Conflict,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ServerCartError::Timeout,
        _ => ServerCartError::Unavailable(format!("unexpected status {status}")),
    }
}
