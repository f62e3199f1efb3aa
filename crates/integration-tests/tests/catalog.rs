//! Catalog loading, fallbacks, and caching.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use hardalum_core::{CategoryId, Price, ProductId};
use hardalum_integration_tests::MockApi;
use hardalum_storefront::catalog::{self, CatalogQuery, LOAD_FAILED_MESSAGE, SortOrder};
use hardalum_storefront::contact::ContactForm;
use hardalum_storefront::{StorefrontError, contact};

#[tokio::test]
async fn test_products_load_from_api() {
    let api = MockApi::start().await;
    let (storefront, _) = api.ephemeral_storefront().await;

    let loaded = catalog::load_products(storefront.api(), None).await;
    assert!(loaded.error.is_none());
    assert_eq!(loaded.products.len(), 3);
    assert_eq!(loaded.products[1].price, Some(Price::from_cents(1520)));
}

#[tokio::test]
async fn test_product_list_is_cached() {
    let api = MockApi::start().await;
    let (storefront, _) = api.ephemeral_storefront().await;

    catalog::load_products(storefront.api(), None).await;
    catalog::load_products(storefront.api(), None).await;
    assert_eq!(api.recorded().product_list_hits, 1);

    storefront.api().invalidate_catalog();
    catalog::load_products(storefront.api(), None).await;
    assert_eq!(api.recorded().product_list_hits, 2);
}

#[tokio::test]
async fn test_search_uses_search_endpoint() {
    let api = MockApi::start().await;
    let (storefront, _) = api.ephemeral_storefront().await;

    let loaded = catalog::load_products(storefront.api(), Some("tubing")).await;
    let ids: Vec<ProductId> = loaded.products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ProductId::new(1), ProductId::new(5)]);
    assert_eq!(api.recorded().product_list_hits, 0);
}

#[tokio::test]
async fn test_failures_fall_back_to_bundled_data() {
    let api = MockApi::start().await;
    api.recorded().fail_catalog = true;
    let (storefront, _) = api.ephemeral_storefront().await;

    let loaded = catalog::load_products(storefront.api(), None).await;
    assert_eq!(loaded.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
    assert_eq!(loaded.products.len(), 8);

    let categories = catalog::load_categories(storefront.api()).await;
    assert_eq!(categories, catalog::default_categories());

    let rod = catalog::product_details(storefront.api(), ProductId::new(7))
        .await
        .unwrap();
    assert_eq!(rod.variants.len(), 3);

    let missing = catalog::product_details(storefront.api(), ProductId::new(404)).await;
    assert!(matches!(missing, Err(StorefrontError::Api(_))));
}

#[tokio::test]
async fn test_browse_with_live_categories() {
    let api = MockApi::start().await;
    let (storefront, _) = api.ephemeral_storefront().await;

    let loaded = catalog::load_products(storefront.api(), None).await;
    let categories = catalog::load_categories(storefront.api()).await;

    let query = CatalogQuery {
        category: Some(CategoryId::new(10)),
        sort: SortOrder::PriceDesc,
        page: 1,
    };
    let page = catalog::browse(&loaded.products, &categories, &query);
    assert_eq!(page.total, 1);
    assert_eq!(page.products[0].id, ProductId::new(1));

    let by_price = catalog::browse(
        &loaded.products,
        &categories,
        &CatalogQuery {
            sort: SortOrder::PriceAsc,
            ..CatalogQuery::default()
        },
    );
    let ids: Vec<i64> = by_price.products.iter().map(|p| p.id.as_i64()).collect();
    assert_eq!(ids, vec![5, 9, 1]);
}

#[tokio::test]
async fn test_contact_message_is_posted() {
    let api = MockApi::start().await;
    let (storefront, _) = api.ephemeral_storefront().await;

    let form = ContactForm {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        subject: "Custom lengths".to_string(),
        message: "Can you cut 30\" pieces?".to_string(),
    };
    contact::submit_contact(storefront.api(), &form).await.unwrap();

    let recorded = api.recorded();
    assert_eq!(recorded.contact.len(), 1);
    assert_eq!(recorded.contact[0]["subject"], "Custom lengths");
    assert_eq!(recorded.contact[0]["email"], "ada@example.com");
}
