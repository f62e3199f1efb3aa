//! Shopping cart state.
//!
//! [`CartStore`] owns the authoritative list of line items for the current
//! session. Every mutation runs to completion synchronously and writes the
//! whole resulting collection to durable storage before returning
//! (last write wins). Cart additions are also reported to the storefront API
//! through a background [`CartNotifier`]; that report never blocks or alters
//! the local collection.
//!
//! # Identity
//!
//! Two line items are the same entry when their product IDs match and their
//! selected variant labels match. A line without a variant only matches
//! another line without a variant.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hardalum_core::{Price, Product, ProductId};
//! use hardalum_storefront::cart::CartStore;
//! use hardalum_storefront::storage::MemoryStore;
//!
//! let mut cart = CartStore::hydrate(Arc::new(MemoryStore::new()), Price::from_cents(1500));
//! let lock = Product {
//!     id: ProductId::new(5),
//!     name: "Tubing Lock".to_string(),
//!     description: String::new(),
//!     image_url: String::new(),
//!     price: Some(Price::from_cents(1520)),
//!     variants: Vec::new(),
//!     category: None,
//! };
//!
//! cart.add(&lock, 2, None);
//! assert_eq!(cart.totals().subtotal, Price::from_cents(3040));
//! assert_eq!(cart.totals().total, Price::from_cents(4540));
//! ```

mod notifier;
mod totals;

pub use notifier::{CartNotifier, CartSync};
pub use totals::CartTotals;

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use hardalum_core::{Price, Product, ProductId, UserId, Variant};

use crate::api::CartAddition;
use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, keys};

/// Message recorded when a cart addition could not be registered remotely.
pub const CART_SYNC_FAILED_MESSAGE: &str = "Failed to add item to cart. Please try again.";

/// One entry of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    /// Selected variant, if the product has variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
    /// Normally at least 1. [`CartStore::update_quantity`] stores its
    /// argument verbatim, so this may be zero or negative on that path.
    pub quantity: i64,
    /// Unit price captured when the item was last added.
    pub unit_price: Price,
}

impl LineItem {
    /// Label of the selected variant, if any.
    #[must_use]
    pub fn dimension(&self) -> Option<&str> {
        self.variant.as_ref().map(|v| v.dimension.as_str())
    }

    /// Whether this line is the entry identified by `product_id` and
    /// `dimension`.
    #[must_use]
    pub fn matches(&self, product_id: ProductId, dimension: Option<&str>) -> bool {
        self.product_id == product_id && self.dimension() == dimension
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Last remote-notification failure, shared with the background notifier.
///
/// Cleared by [`CartStore::clear_error`] or by the next successful
/// notification.
#[derive(Debug, Clone, Default)]
pub struct CartErrorFlag(Arc<RwLock<Option<String>>>);

impl CartErrorFlag {
    /// Current error message, if any.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, message: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    pub(crate) fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// The session's shopping cart.
///
/// Constructed once by the application root and passed by reference to
/// whatever needs it.
pub struct CartStore {
    items: Vec<LineItem>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Option<CartNotifier>,
    error: CartErrorFlag,
    user_id: Option<UserId>,
    shipping_flat_rate: Price,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items.len())
            .field("connected", &self.notifier.is_some())
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from durable storage.
    ///
    /// Absent or unreadable content yields an empty cart. The returned store
    /// is offline: additions are not reported anywhere until
    /// [`CartStore::with_sync`] is called.
    #[must_use]
    pub fn hydrate(storage: Arc<dyn KeyValueStore>, shipping_flat_rate: Price) -> Self {
        let items = load_items(storage.as_ref());
        tracing::debug!(items = items.len(), "Cart hydrated");

        Self {
            items,
            storage,
            notifier: None,
            error: CartErrorFlag::default(),
            user_id: None,
            shipping_flat_rate,
        }
    }

    /// Report cart additions to `sink` from a background task.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_sync<S: CartSync>(mut self, sink: S) -> Self {
        self.notifier = Some(CartNotifier::spawn(sink, self.error.clone()));
        self
    }

    /// Set the user attached to remote cart notifications.
    pub const fn set_user(&mut self, user_id: Option<UserId>) {
        self.user_id = user_id;
    }

    /// Read-only view of the line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units, as shown on the cart badge.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Subtotal, shipping, and total of the current items.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::for_items(&self.items, self.shipping_flat_rate)
    }

    /// Flat shipping surcharge applied to non-empty orders.
    #[must_use]
    pub const fn shipping_flat_rate(&self) -> Price {
        self.shipping_flat_rate
    }

    /// Last remote-notification failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    /// Forget the last remote-notification failure.
    pub fn clear_error(&self) {
        self.error.clear();
    }

    /// Add `quantity` units of `product`, optionally in a specific variant.
    ///
    /// Merges into the matching line if one exists, overwriting its unit
    /// price with the freshly resolved one; otherwise appends a new line.
    /// The addition is then queued for the storefront API without waiting
    /// for it. Adding zero units changes nothing.
    #[instrument(skip(self, product, variant), fields(product_id = %product.id))]
    pub fn add(&mut self, product: &Product, quantity: u32, variant: Option<&Variant>) {
        if quantity == 0 {
            tracing::debug!("Ignoring addition of zero units");
            return;
        }

        self.insert(
            LineItem {
                product_id: product.id,
                name: product.name.clone(),
                image_url: product.image_url.clone(),
                variant: variant.cloned(),
                quantity: i64::from(quantity),
                unit_price: product.unit_price(variant),
            },
            "Added item to cart",
        );
    }

    /// Move the line for `product_id` in variant `from` over to variant `to`.
    ///
    /// The old line is removed and its quantity re-added under `to`, priced
    /// at `to`'s price and merged into an existing `to` line if there is
    /// one. Nothing happens when the labels are equal or no line matches.
    #[instrument(skip(self, to), fields(to = %to.dimension))]
    pub fn change_variant(&mut self, product_id: ProductId, from: Option<&str>, to: &Variant) {
        if from == Some(to.dimension.as_str()) {
            return;
        }
        let Some(position) = self
            .items
            .iter()
            .position(|line| line.matches(product_id, from))
        else {
            tracing::debug!("No cart line to change variant on");
            return;
        };

        let old = self.items.remove(position);
        self.items.retain(|line| !line.matches(product_id, from));
        self.insert(
            LineItem {
                variant: Some(to.clone()),
                unit_price: to.price,
                ..old
            },
            "Changed cart item variant",
        );
    }

    /// Merge `line` into the cart, report it, and persist.
    fn insert(&mut self, line: LineItem, breadcrumb: &str) {
        let addition = CartAddition {
            user_id: self.user_id,
            product_id: line.product_id,
            variant_id: line.variant.as_ref().map(|v| v.id),
            quantity: line.quantity,
        };
        let product_id = line.product_id.to_string();
        let dimension = line.dimension().unwrap_or_default().to_string();

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|existing| existing.matches(line.product_id, line.dimension()))
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            existing.unit_price = line.unit_price;
        } else {
            self.items.push(line);
        }

        add_breadcrumb(
            "cart",
            breadcrumb,
            Some(&[
                ("product_id", product_id.as_str()),
                ("dimension", dimension.as_str()),
            ]),
        );

        if let Some(notifier) = &self.notifier {
            notifier.dispatch(addition);
        }

        self.persist();
    }

    /// Remove every line matching `product_id` and `dimension`.
    ///
    /// Removing an entry that is not in the cart is a no-op.
    #[instrument(skip(self))]
    pub fn remove(&mut self, product_id: ProductId, dimension: Option<&str>) {
        self.items
            .retain(|line| !line.matches(product_id, dimension));
        self.persist();
    }

    /// Set the quantity of the matching line verbatim.
    ///
    /// Zero and negative values are stored as given; callers that want
    /// "reduce to zero" to drop the line must call [`CartStore::remove`].
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64, dimension: Option<&str>) {
        for line in &mut self.items {
            if line.matches(product_id, dimension) {
                line.quantity = quantity;
            }
        }
        self.persist();
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Wait until every notification queued so far has been answered.
    ///
    /// Returns immediately for offline carts.
    pub async fn settle(&self) {
        if let Some(notifier) = &self.notifier {
            notifier.flush().await;
        }
    }

    /// Write the full collection to durable storage. Failures are logged.
    fn persist(&self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.put(keys::CART, &json) {
            tracing::error!(error = %e, "Failed to save cart to storage");
        }
    }
}

/// Read the persisted cart, treating anything unreadable as empty.
fn load_items(storage: &dyn KeyValueStore) -> Vec<LineItem> {
    let stored = match storage.get(keys::CART) {
        Ok(Some(stored)) => stored,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load cart from storage");
            return Vec::new();
        }
    };

    serde_json::from_str(&stored).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored cart is corrupt, starting empty");
        Vec::new()
    })
}
