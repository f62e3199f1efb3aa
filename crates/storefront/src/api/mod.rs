//! Client for the Hardalum storefront HTTP/JSON API.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; the API is the source of truth for catalog,
//!   accounts, and orders
//! - In-memory caching via `moka` for catalog reads (5 minute TTL)
//! - Bearer tokens are passed per call and never logged
//!
//! # Example
//!
//! ```rust,ignore
//! use hardalum_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api_base_url)?;
//! let products = client.list_products().await?;
//! let product = client.get_product(products[0].id).await?;
//! ```

mod cache;
pub mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use hardalum_core::{Category, Email, Order, Product, ProductId, User};

use cache::{CacheKey, CacheValue};

use crate::config::with_trailing_slash;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Token missing, expired, or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status associated with this error, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Message suitable for showing to the shopper.
    ///
    /// API-provided messages are passed through; transport problems are
    /// summarized.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please wait a moment.".to_string(),
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => {
                "An unexpected error occurred.".to_string()
            }
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront API.
///
/// Cheaply cloneable; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .user_agent(concat!("hardalum-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: with_trailing_slash(base_url.clone()),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop all cached catalog responses.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Resolve `path`, which must be relative, under the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.get(self.endpoint(path)?))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.post(self.endpoint(path)?))
    }

    /// Send a request and return the body of a successful response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(body)
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            tracing::debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.send(self.get("api/products")?).await?);
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Full-text product search. Results are not cached.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>, ApiError> {
        let request = self.get("api/search")?.query(&[("q", term)]);
        let response: SearchResponse = self.send(request).await?;
        Ok(response.products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the product does not exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            tracing::debug!(product_id = %id, "Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.send(self.get(&format!("api/products/{id}"))?).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List product categories.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories: Arc<Vec<Category>> =
            Arc::new(self.send(self.get("api/categories")?).await?);
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Register a cart addition with the backend.
    ///
    /// The response body is not used; the local cart stays authoritative.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn register_cart_addition(&self, addition: &CartAddition) -> Result<(), ApiError> {
        self.send_raw(self.post("api/cart")?.json(addition))
            .await
            .map(drop)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Status` for rejected
    /// credentials, or another error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        self.send(self.post("api/login")?.json(&body)).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns error if the API rejects the registration or the request fails.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password.expose_secret(),
        });
        self.send(self.post("api/signup")?.json(&body)).await
    }

    /// Fetch the profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &SecretString) -> Result<User, ApiError> {
        let request = self.get("api/profile")?.bearer_auth(token.expose_secret());
        let envelope: UserEnvelope = self.send(request).await?;
        Ok(envelope.user)
    }

    /// Resolve a guest checkout to a user account, creating one if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn find_or_create_user(&self, email: &Email, name: &str) -> Result<User, ApiError> {
        let body = serde_json::json!({ "email": email, "name": name });
        let envelope: UserEnvelope = self
            .send(self.post("api/users/find-or-create")?.json(&body))
            .await?;
        Ok(envelope.user)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order. The token is attached when the buyer is signed in.
    ///
    /// # Errors
    ///
    /// Returns error if the API rejects the order or the request fails.
    #[instrument(skip(self, order, token), fields(items = order.items.len()))]
    pub async fn place_order(
        &self,
        order: &PlaceOrderRequest,
        token: Option<&SecretString>,
    ) -> Result<OrderConfirmation, ApiError> {
        let mut request = self.post("api/orders")?.json(order);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        self.send(request).await
    }

    /// Fetch the token owner's order history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn order_history(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let request = self
            .get("api/orders/user")?
            .bearer_auth(token.expose_secret());
        let response: OrderHistoryResponse = self.send(request).await?;
        Ok(response.orders)
    }

    // =========================================================================
    // Contact
    // =========================================================================

    /// Submit the contact form.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    pub async fn submit_contact(&self, message: &ContactRequest) -> Result<(), ApiError> {
        self.send_raw(self.post("api/contact")?.json(message))
            .await
            .map(drop)
    }
}

/// Extract a shopper-facing message from an error response body.
///
/// Uses the JSON `message` field when present, else a generic status line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        let message = error_message(StatusCode::BAD_REQUEST, r#"{"message":"Email taken"}"#);
        assert_eq!(message, "Email taken");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "HTTP error! status: 500"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":""}"#),
            "HTTP error! status: 400"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 404,
            message: "Product not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Product not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Product not found");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_endpoint_joins_base_path() {
        let client = ApiClient::new(&Url::parse("http://localhost:5000").unwrap()).unwrap();
        assert_eq!(
            client.endpoint("api/products/3").unwrap().as_str(),
            "http://localhost:5000/api/products/3"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        for base in ["https://host.example/shop/", "https://host.example/shop"] {
            let client = ApiClient::new(&Url::parse(base).unwrap()).unwrap();
            assert_eq!(
                client.endpoint("api/products").unwrap().as_str(),
                "https://host.example/shop/api/products"
            );
            assert_eq!(
                client.endpoint("api/orders/user").unwrap().as_str(),
                "https://host.example/shop/api/orders/user"
            );
        }
    }
}
