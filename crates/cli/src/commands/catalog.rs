//! Catalog browsing commands.

use hardalum_core::{CategoryId, Product, ProductId};
use hardalum_storefront::Storefront;
use hardalum_storefront::catalog::{self, CatalogQuery, SortOrder};
use hardalum_storefront::error::Result;

/// One listing row: ID, name, and the price shown in listings.
pub fn product_row(product: &Product) -> String {
    let from = if product.variants.len() > 1 { "from " } else { "" };
    format!(
        "{:>4}  {:<48} {}{}",
        product.id,
        product.name,
        from,
        product.effective_price()
    )
}

/// List products with optional search, category filter, sort, and page.
#[allow(clippy::print_stdout)]
pub async fn products(
    storefront: &Storefront,
    search: Option<&str>,
    category: Option<CategoryId>,
    sort: SortOrder,
    page: usize,
) {
    let loaded = catalog::load_products(storefront.api(), search).await;
    let categories = catalog::load_categories(storefront.api()).await;

    if let Some(error) = &loaded.error {
        println!("{error}");
    }

    let query = CatalogQuery {
        category,
        sort,
        page,
    };
    let page = catalog::browse(&loaded.products, &categories, &query);

    if page.products.is_empty() {
        println!("No products found.");
        return;
    }

    for product in &page.products {
        println!("{}", product_row(product));
    }
    println!(
        "Page {} of {} ({} products)",
        page.page, page.total_pages, page.total
    );
}

/// Show a product's details and variants.
///
/// # Errors
///
/// Returns an error if the product cannot be found.
#[allow(clippy::print_stdout)]
pub async fn product(storefront: &Storefront, id: ProductId) -> Result<()> {
    let product = catalog::product_details(storefront.api(), id).await?;

    println!("{}", product.name);
    if !product.description.is_empty() {
        println!("{}", product.description);
    }

    if product.has_variants() {
        println!();
        for variant in &product.variants {
            println!("  {:<32} {}", variant.dimension, variant.price);
        }
    } else {
        println!("Price: {}", product.unit_price(None));
    }
    Ok(())
}

/// List categories.
#[allow(clippy::print_stdout)]
pub async fn categories(storefront: &Storefront) {
    for category in catalog::load_categories(storefront.api()).await {
        println!("{:>4}  {}", category.id, category.name);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_row_marks_variant_ranges() {
        let products = catalog::fallback_products();
        let tubing = products.iter().find(|p| p.id == ProductId::new(1)).unwrap();
        let lock = products.iter().find(|p| p.id == ProductId::new(5)).unwrap();

        assert!(product_row(tubing).ends_with("from $35.50"));
        assert!(product_row(lock).ends_with(" $15.20"));
    }
}
