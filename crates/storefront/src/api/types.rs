//! Request and response bodies of the storefront API.
//!
//! Field names follow the API's mixed conventions: request bodies are
//! camelCase, while order history rows come back snake_case.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hardalum_core::{Email, Order, OrderId, Product, ProductId, User, UserId, VariantId};

/// Body of `POST /api/cart`, registering a cart addition remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddition {
    /// Signed-in user, if any. Sent as `null` for anonymous carts.
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    #[serde(rename = "dimensionId")]
    pub variant_id: Option<VariantId>,
    pub quantity: i64,
}

/// Successful response of `POST /api/login` and `POST /api/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
    pub token: String,
}

/// Wrapper for endpoints that return `{ "user": ... }`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

/// Response of `GET /api/search`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Response of `GET /api/orders/user`.
#[derive(Debug, Deserialize)]
pub(crate) struct OrderHistoryResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// One line of a [`PlaceOrderRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    #[serde(rename = "dimensionId")]
    pub variant_id: Option<VariantId>,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_at_purchase: Decimal,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub billing_address: String,
    pub items: Vec<OrderLineRequest>,
}

/// Response of `POST /api/orders`.
///
/// The backend's confirmation shape is loose; only the order ID and an
/// optional message are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderConfirmation {
    #[serde(default, alias = "orderId", alias = "id")]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_addition_wire_shape() {
        let body = CartAddition {
            user_id: None,
            product_id: ProductId::new(1),
            variant_id: Some(VariantId::new(2)),
            quantity: 3,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "userId": null, "productId": 1, "dimensionId": 2, "quantity": 3 })
        );
    }

    #[test]
    fn test_place_order_wire_shape() {
        let body = PlaceOrderRequest {
            user_id: UserId::new(9),
            total_amount: Decimal::new(9500, 2),
            shipping_address: "1 Main St, Springfield, 12345".to_string(),
            billing_address: "1 Main St, Springfield, 12345".to_string(),
            items: vec![OrderLineRequest {
                product_id: ProductId::new(1),
                variant_id: None,
                quantity: 2,
                price_at_purchase: Decimal::new(4000, 2),
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "userId": 9,
                "totalAmount": 95.0,
                "shippingAddress": "1 Main St, Springfield, 12345",
                "billingAddress": "1 Main St, Springfield, 12345",
                "items": [
                    { "productId": 1, "dimensionId": null, "quantity": 2, "priceAtPurchase": 40.0 }
                ]
            })
        );
    }

    #[test]
    fn test_order_confirmation_accepts_aliases() {
        let confirmation: OrderConfirmation =
            serde_json::from_value(json!({ "orderId": 77, "message": "ok" })).unwrap();
        assert_eq!(confirmation.order_id, Some(OrderId::new(77)));

        let confirmation: OrderConfirmation = serde_json::from_value(json!({})).unwrap();
        assert!(confirmation.order_id.is_none());
    }
}
