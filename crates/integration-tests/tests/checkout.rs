//! Order placement against the mock API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use secrecy::SecretString;
use serde_json::json;

use hardalum_core::{Email, OrderId, ProductId, UserId};
use hardalum_integration_tests::{
    EMAIL, GUEST_USER_ID, MockApi, ORDER_ID, PASSWORD, USER_ID, VALID_TOKEN,
};
use hardalum_storefront::StorefrontError;
use hardalum_storefront::catalog;
use hardalum_storefront::checkout::{CheckoutForm, CheckoutSource};

fn form(email: &str) -> CheckoutForm {
    CheckoutForm {
        name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        zip: "12345".to_string(),
        phone: "5551234567".to_string(),
    }
}

#[tokio::test]
async fn test_guest_cart_checkout() {
    let api = MockApi::start().await;
    let (mut storefront, _) = api.ephemeral_storefront().await;

    let tubing = catalog::product_details(storefront.api(), ProductId::new(1))
        .await
        .unwrap();
    let half_inch = tubing.variant_by_dimension("1/2\" Diameter").cloned();
    storefront.cart_mut().add(&tubing, 2, half_inch.as_ref());

    let receipt = storefront
        .place_order(&form("guest@example.com"), &CheckoutSource::Cart)
        .await
        .unwrap();

    assert_eq!(receipt.user_id, UserId::new(GUEST_USER_ID));
    assert_eq!(receipt.confirmation.order_id, Some(OrderId::new(ORDER_ID)));
    assert!(storefront.cart().is_empty());

    let recorded = api.recorded();
    assert_eq!(
        recorded.find_or_create,
        vec![json!({ "email": "guest@example.com", "name": "Ada Lovelace" })]
    );
    let (auth, body) = &recorded.orders[0];
    assert_eq!(*auth, None);
    assert_eq!(
        *body,
        json!({
            "userId": GUEST_USER_ID,
            "totalAmount": 95.0,
            "shippingAddress": "1 Main St, Springfield, 12345",
            "billingAddress": "1 Main St, Springfield, 12345",
            "items": [
                { "productId": 1, "dimensionId": 2, "quantity": 2, "priceAtPurchase": 40.0 }
            ]
        })
    );
}

#[tokio::test]
async fn test_signed_in_checkout_sends_bearer() {
    let api = MockApi::start().await;
    let (mut storefront, _) = api.ephemeral_storefront().await;
    storefront
        .login(&Email::parse(EMAIL).unwrap(), &SecretString::from(PASSWORD))
        .await
        .unwrap();

    let lock = catalog::product_details(storefront.api(), ProductId::new(5))
        .await
        .unwrap();
    storefront.cart_mut().add(&lock, 1, None);

    let receipt = storefront
        .place_order(&form(EMAIL), &CheckoutSource::Cart)
        .await
        .unwrap();

    assert_eq!(receipt.user_id, UserId::new(USER_ID));
    let recorded = api.recorded();
    assert!(recorded.find_or_create.is_empty());
    let (auth, body) = &recorded.orders[0];
    assert_eq!(auth.as_deref(), Some(format!("Bearer {VALID_TOKEN}").as_str()));
    assert_eq!(body["userId"], json!(USER_ID));
    assert_eq!(body["totalAmount"], json!(30.2));
}

#[tokio::test]
async fn test_direct_purchase_keeps_cart() {
    let api = MockApi::start().await;
    let (mut storefront, _) = api.ephemeral_storefront().await;

    let sheet = catalog::product_details(storefront.api(), ProductId::new(9))
        .await
        .unwrap();
    storefront.cart_mut().add(&sheet, 1, sheet.default_variant());

    let tubing = catalog::product_details(storefront.api(), ProductId::new(1))
        .await
        .unwrap();
    let source = CheckoutSource::Direct {
        variant: tubing.default_variant().cloned(),
        product: tubing,
        quantity: 1,
    };

    let receipt = storefront
        .place_order(&form("guest@example.com"), &source)
        .await
        .unwrap();

    assert_eq!(receipt.totals.subtotal.to_string(), "$35.50");
    assert_eq!(storefront.cart().items().len(), 1);

    let recorded = api.recorded();
    assert_eq!(recorded.orders[0].1["items"][0]["productId"], json!(1));
    assert_eq!(recorded.orders[0].1["items"][0]["dimensionId"], json!(1));
}

#[tokio::test]
async fn test_empty_cart_sends_nothing() {
    let api = MockApi::start().await;
    let (mut storefront, _) = api.ephemeral_storefront().await;

    let err = storefront
        .place_order(&form("guest@example.com"), &CheckoutSource::Cart)
        .await
        .unwrap_err();

    assert!(matches!(err, StorefrontError::EmptyCheckout));
    let recorded = api.recorded();
    assert!(recorded.find_or_create.is_empty());
    assert!(recorded.orders.is_empty());
}
