//! Product listing, browsing, and the built-in fallback catalog.
//!
//! When the storefront API is unreachable the shop still renders: products
//! fall back to a bundled catalog and categories to a fixed default set.

use std::cmp::Reverse;
use std::sync::LazyLock;

use tracing::instrument;

use hardalum_core::{Category, CategoryId, Product, ProductId};

use crate::api::ApiClient;
use crate::error::Result;

/// Products shown per catalog page.
pub const PAGE_SIZE: usize = 8;

/// Message shown when the live catalog could not be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load products. Please try again later.";

static FALLBACK_PRODUCTS: LazyLock<Vec<Product>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../data/products.json")).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Bundled product catalog is invalid");
        Vec::new()
    })
});

/// The bundled catalog used when the API is unavailable.
#[must_use]
pub fn fallback_products() -> &'static [Product] {
    &FALLBACK_PRODUCTS
}

/// Categories used when the API is unavailable.
#[must_use]
pub fn default_categories() -> Vec<Category> {
    [
        "Aluminum Extrusions",
        "Aluminum Sheets",
        "Aluminum Pipes",
        "Aluminum Connectors",
    ]
    .into_iter()
    .zip(1..)
    .map(|(name, id)| Category {
        id: CategoryId::new(id),
        name: name.to_string(),
    })
    .collect()
}

/// Result of loading the product list.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub products: Vec<Product>,
    /// Set when the fallback catalog is being shown.
    pub error: Option<String>,
}

/// Load products, searching when `search` is a non-blank term.
///
/// Falls back to the bundled catalog on any API failure.
#[instrument(skip(api))]
pub async fn load_products(api: &ApiClient, search: Option<&str>) -> CatalogLoad {
    let result = match search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => api.search_products(term).await,
        None => api.list_products().await.map(|products| products.to_vec()),
    };

    match result {
        Ok(products) => CatalogLoad {
            products,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch products, using bundled catalog");
            CatalogLoad {
                products: fallback_products().to_vec(),
                error: Some(LOAD_FAILED_MESSAGE.to_string()),
            }
        }
    }
}

/// Load categories, falling back to [`default_categories`].
#[instrument(skip(api))]
pub async fn load_categories(api: &ApiClient) -> Vec<Category> {
    match api.list_categories().await {
        Ok(categories) => categories.to_vec(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch categories, using defaults");
            default_categories()
        }
    }
}

/// Fetch one product, falling back to the bundled catalog entry.
///
/// # Errors
///
/// Returns the API error if the product is neither available remotely nor
/// in the bundled catalog.
#[instrument(skip(api))]
pub async fn product_details(api: &ApiClient, id: ProductId) -> Result<Product> {
    match api.get_product(id).await {
        Ok(product) => Ok(product),
        Err(e) => {
            if let Some(product) = fallback_products().iter().find(|p| p.id == id) {
                tracing::warn!(error = %e, %id, "Failed to fetch product, using bundled entry");
                Ok(product.clone())
            } else {
                Err(e.into())
            }
        }
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// As returned by the API.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(Self::Default),
            "price-asc" | "asc" => Ok(Self::PriceAsc),
            "price-desc" | "desc" => Ok(Self::PriceDesc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filter, order, and page selection for [`browse`].
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Only products in this category. Unknown IDs filter nothing.
    pub category: Option<CategoryId>,
    pub sort: SortOrder,
    /// 1-based page number. Zero is treated as 1.
    pub page: usize,
}

/// One page of browse results.
#[derive(Debug, Clone)]
pub struct CatalogPage<'a> {
    pub products: Vec<&'a Product>,
    pub page: usize,
    pub total_pages: usize,
    /// Matching products across all pages.
    pub total: usize,
}

/// Apply `query` to `products`.
#[must_use]
pub fn browse<'a>(
    products: &'a [Product],
    categories: &[Category],
    query: &CatalogQuery,
) -> CatalogPage<'a> {
    let category_name = query
        .category
        .and_then(|id| categories.iter().find(|c| c.id == id))
        .map(|c| c.name.as_str());

    let mut matching: Vec<&Product> = products
        .iter()
        .filter(|p| category_name.is_none_or(|name| p.category.as_deref() == Some(name)))
        .collect();

    match query.sort {
        SortOrder::Default => {}
        SortOrder::PriceAsc => matching.sort_by_key(|p| p.effective_price()),
        SortOrder::PriceDesc => matching.sort_by_key(|p| Reverse(p.effective_price())),
    }

    let total = matching.len();
    let page = query.page.max(1);
    let products = matching
        .into_iter()
        .skip((page - 1).saturating_mul(PAGE_SIZE))
        .take(PAGE_SIZE)
        .collect();

    CatalogPage {
        products,
        page,
        total_pages: total.div_ceil(PAGE_SIZE),
        total,
    }
}
