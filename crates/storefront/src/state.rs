//! Application root.
//!
//! [`Storefront`] wires configuration, the API client, durable storage, the
//! cart, and the auth session together once at startup. Nothing in the
//! crate is global; callers hold the `Storefront` and borrow from it.

use std::sync::Arc;

use secrecy::SecretString;

use hardalum_core::{Email, Order, User};

use crate::account;
use crate::api::ApiClient;
use crate::auth::AuthSession;
use crate::cart::CartStore;
use crate::checkout::{self, CheckoutForm, CheckoutSource, OrderReceipt};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::storage::{FileStore, KeyValueStore};

/// The storefront session: one shopper, one cart.
#[derive(Debug)]
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore,
    auth: AuthSession,
}

impl Storefront {
    /// Open the storefront with file-backed storage under
    /// `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the API
    /// base URL is unusable.
    pub async fn open(config: StorefrontConfig) -> Result<Self> {
        let storage = FileStore::open(&config.data_dir)?;
        Self::with_storage(config, Arc::new(storage)).await
    }

    /// Open the storefront over an explicit storage backend.
    ///
    /// Hydrates the cart, validates any stored session, and starts reporting
    /// cart additions in the background. Must be called from within a Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url)?;

        let mut auth = AuthSession::new(Arc::clone(&storage));
        auth.initialize(&api).await;

        let mut cart =
            CartStore::hydrate(storage, config.shipping_flat_rate).with_sync(api.clone());
        cart.set_user(auth.user().map(|u| u.id));

        tracing::info!(
            api = %config.api_base_url,
            signed_in = auth.is_authenticated(),
            cart_items = cart.items().len(),
            "Storefront ready"
        );

        Ok(Self {
            config,
            api,
            cart,
            auth,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// Sign in and attach the cart to the user.
    ///
    /// # Errors
    ///
    /// See [`AuthSession::sign_in`].
    pub async fn login(&mut self, email: &Email, password: &SecretString) -> Result<User> {
        let user = self.auth.sign_in(&self.api, email, password).await?.clone();
        self.cart.set_user(Some(user.id));
        Ok(user)
    }

    /// Create an account, sign in, and attach the cart to it.
    ///
    /// # Errors
    ///
    /// See [`AuthSession::sign_up`].
    pub async fn signup(
        &mut self,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<User> {
        let user = self
            .auth
            .sign_up(&self.api, username, email, password)
            .await?
            .clone();
        self.cart.set_user(Some(user.id));
        Ok(user)
    }

    /// Sign out. The cart is kept.
    pub fn logout(&mut self) {
        self.auth.logout();
        self.cart.set_user(None);
    }

    /// See [`account::fetch_profile`].
    ///
    /// # Errors
    ///
    /// See [`account::fetch_profile`].
    pub async fn profile(&mut self) -> Result<User> {
        let result = account::fetch_profile(&self.api, &mut self.auth).await;
        self.sync_cart_user();
        result
    }

    /// See [`account::fetch_order_history`].
    ///
    /// # Errors
    ///
    /// See [`account::fetch_order_history`].
    pub async fn order_history(&mut self) -> Result<Vec<Order>> {
        let result = account::fetch_order_history(&self.api, &mut self.auth).await;
        self.sync_cart_user();
        result
    }

    /// See [`checkout::place_order`].
    ///
    /// # Errors
    ///
    /// See [`checkout::place_order`].
    pub async fn place_order(
        &mut self,
        form: &CheckoutForm,
        source: &CheckoutSource,
    ) -> Result<OrderReceipt> {
        let result =
            checkout::place_order(&self.api, &mut self.auth, &mut self.cart, form, source).await;
        self.sync_cart_user();
        result
    }

    /// Wait for background cart reports to finish.
    pub async fn shutdown(&self) {
        self.cart.settle().await;
        tracing::debug!("Storefront shut down");
    }

    fn sync_cart_user(&mut self) {
        self.cart.set_user(self.auth.user().map(|u| u.id));
    }
}
