//! Order placement.
//!
//! A checkout buys either the whole cart or a single product ("buy now").
//! Guests are attached to an account through `find-or-create` before the
//! order is posted. Only cart checkouts empty the cart afterwards.

use tracing::instrument;

use hardalum_core::{Email, Product, UserId, Variant};

use crate::api::{ApiClient, OrderConfirmation, OrderLineRequest, PlaceOrderRequest};
use crate::auth::AuthSession;
use crate::cart::{CartStore, CartTotals, LineItem};
use crate::error::{Result, StorefrontError, add_breadcrumb};

/// Shipping and contact details entered at checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    /// Ten digits.
    pub phone: String,
}

impl CheckoutForm {
    /// Check that every field is filled in and well formed.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` naming the first bad field, or
    /// `StorefrontError::Email` for a malformed address.
    pub fn validate(&self) -> Result<Email> {
        for (field, value) in [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Address", &self.address),
            ("City", &self.city),
            ("Zip", &self.zip),
        ] {
            if value.trim().is_empty() {
                return Err(StorefrontError::Validation(format!("{field} is required")));
            }
        }

        let phone = self.phone.trim();
        if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(StorefrontError::Validation(
                "Phone must be 10 digits".to_string(),
            ));
        }

        Ok(Email::parse(&self.email)?)
    }

    /// Address line sent as both shipping and billing address.
    #[must_use]
    pub fn address_line(&self) -> String {
        format!(
            "{}, {}, {}",
            self.address.trim(),
            self.city.trim(),
            self.zip.trim()
        )
    }
}

/// What is being bought.
#[derive(Debug, Clone)]
pub enum CheckoutSource {
    /// Everything in the cart.
    Cart,
    /// A single product, bypassing the cart.
    Direct {
        product: Product,
        quantity: u32,
        variant: Option<Variant>,
    },
}

impl CheckoutSource {
    /// Whether this is a buy-now purchase.
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        matches!(self, Self::Direct { .. })
    }

    /// Resolve the lines being purchased. A direct purchase of zero units
    /// resolves to nothing.
    #[must_use]
    pub fn checkout_items(&self, cart: &CartStore) -> Vec<LineItem> {
        match self {
            Self::Cart => cart.items().to_vec(),
            Self::Direct { quantity: 0, .. } => Vec::new(),
            Self::Direct {
                product,
                quantity,
                variant,
            } => vec![LineItem {
                product_id: product.id,
                name: product.name.clone(),
                image_url: product.image_url.clone(),
                variant: variant.clone(),
                quantity: i64::from(*quantity),
                unit_price: product.unit_price(variant.as_ref()),
            }],
        }
    }
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub user_id: UserId,
    pub totals: CartTotals,
    pub confirmation: OrderConfirmation,
}

/// Build the order body for `items`.
#[must_use]
pub fn order_request(
    user_id: UserId,
    items: &[LineItem],
    totals: &CartTotals,
    form: &CheckoutForm,
) -> PlaceOrderRequest {
    let address = form.address_line();
    PlaceOrderRequest {
        user_id,
        total_amount: totals.total.amount(),
        shipping_address: address.clone(),
        billing_address: address,
        items: items
            .iter()
            .map(|item| OrderLineRequest {
                product_id: item.product_id,
                variant_id: item.variant.as_ref().map(|v| v.id),
                quantity: item.quantity,
                price_at_purchase: item.unit_price.amount(),
            })
            .collect(),
    }
}

/// Validate the form, resolve the buyer, and post the order.
///
/// # Errors
///
/// - `EmptyCheckout` when there is nothing to buy (no request is sent)
/// - `Validation` / `Email` for bad form input
/// - `SessionExpired` when the API rejects the signed-in user's token
/// - `Api` for any other API failure
#[instrument(skip_all, fields(direct = source.is_direct()))]
pub async fn place_order(
    api: &ApiClient,
    auth: &mut AuthSession,
    cart: &mut CartStore,
    form: &CheckoutForm,
    source: &CheckoutSource,
) -> Result<OrderReceipt> {
    let items = source.checkout_items(cart);
    if items.is_empty() {
        return Err(StorefrontError::EmptyCheckout);
    }
    let email = form.validate()?;

    let user_id = match auth.user() {
        Some(user) => user.id,
        None => {
            api.find_or_create_user(&email, form.name.trim())
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Failed to find or create user"))?
                .id
        }
    };

    let totals = CartTotals::for_items(&items, cart.shipping_flat_rate());
    let request = order_request(user_id, &items, &totals, form);

    let confirmation = match api.place_order(&request, auth.token()).await {
        Ok(confirmation) => confirmation,
        Err(e) => {
            if auth.token().is_some() && auth.handle_auth_error(e.status()) {
                return Err(StorefrontError::SessionExpired);
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        %user_id,
        order_id = ?confirmation.order_id,
        total = %totals.total,
        "Order placed"
    );
    add_breadcrumb("checkout", "Order placed", None);

    if !source.is_direct() {
        cart.clear();
    }

    Ok(OrderReceipt {
        user_id,
        totals,
        confirmation,
    })
}
