//! Unified error handling with Sentry integration.
//!
//! [`StorefrontError`] is what every storefront flow (auth, catalog,
//! checkout, account, contact) returns. Call [`StorefrontError::report`] at
//! the outermost layer to send transport and server failures to Sentry; the
//! shopper-facing text comes from [`StorefrontError::user_message`].

use thiserror::Error;

use hardalum_core::EmailError;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Storefront API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local state could not be encoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Email address is malformed.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// The operation needs a signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The API rejected the stored token; the session has been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// Form input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Checkout was attempted with nothing to buy.
    #[error("Nothing to check out")]
    EmptyCheckout,
}

impl StorefrontError {
    /// Whether this error points at a fault outside the shopper's control.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(err, ApiError::Unauthorized | ApiError::RateLimited(_)),
            Self::Storage(_) | Self::Config(_) | Self::Serialize(_) => true,
            _ => false,
        }
    }

    /// Send the error to Sentry if it is a server or transport failure.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }

    /// Message suitable for showing to the shopper.
    ///
    /// Internal details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Storage(_) | Self::Config(_) | Self::Serialize(_) => "An unexpected error occurred.".to_string(),
            Self::Email(_) => "Please enter a valid email address.".to_string(),
            Self::NotAuthenticated => "Please log in to continue.".to_string(),
            Self::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::EmptyCheckout => "Your cart is empty.".to_string(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper actions.
///
/// # Example
///
/// ```rust
/// use hardalum_storefront::error::add_breadcrumb;
///
/// add_breadcrumb("cart", "Added item to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
