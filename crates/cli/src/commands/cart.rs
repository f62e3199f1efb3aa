//! Cart commands.

use std::fmt::Write as _;

use hardalum_core::ProductId;
use hardalum_storefront::Storefront;
use hardalum_storefront::cart::CartStore;
use hardalum_storefront::catalog;
use hardalum_storefront::error::{Result, StorefrontError};

/// Render the cart as printed by `cart show`.
pub fn render(cart: &CartStore) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let label = item
            .dimension()
            .map_or_else(|| item.name.clone(), |d| format!("{} ({d})", item.name));
        let _ = writeln!(
            out,
            "{:>4}  {:<56} {} x {} = {}",
            item.product_id,
            label,
            item.quantity,
            item.unit_price,
            item.line_total()
        );
    }

    let totals = cart.totals();
    let _ = writeln!(out, "Items:    {}", cart.item_count());
    let _ = writeln!(out, "Subtotal: {}", totals.subtotal);
    let _ = writeln!(out, "Shipping: {}", totals.shipping);
    let _ = write!(out, "Total:    {}", totals.total);
    out
}

#[allow(clippy::print_stdout)]
pub fn show(cart: &CartStore) {
    println!("{}", render(cart));
}

/// Add a product. Without `variant`, the product's first variant is used.
///
/// # Errors
///
/// Returns an error if the product is unknown or has no such variant.
#[allow(clippy::print_stdout)]
pub async fn add(
    storefront: &mut Storefront,
    product_id: ProductId,
    variant: Option<&str>,
    quantity: u32,
) -> Result<()> {
    let product = catalog::product_details(storefront.api(), product_id).await?;

    let selected = match variant {
        Some(label) => Some(product.variant_by_dimension(label).ok_or_else(|| {
            StorefrontError::Validation(format!("{} has no variant \"{label}\"", product.name))
        })?),
        None => product.default_variant(),
    };

    let cart = storefront.cart_mut();
    cart.add(&product, quantity, selected);
    cart.settle().await;

    println!("Added {quantity} x {} to cart.", product.name);
    if let Some(error) = cart.error() {
        println!("{error}");
    }
    Ok(())
}

/// Switch a line to another variant of its product.
///
/// # Errors
///
/// Returns an error if the product is unknown, has no variant `to`, or has
/// no line in variant `from`.
#[allow(clippy::print_stdout)]
pub async fn change_variant(
    storefront: &mut Storefront,
    product_id: ProductId,
    from: Option<&str>,
    to: &str,
) -> Result<()> {
    if !storefront
        .cart()
        .items()
        .iter()
        .any(|line| line.matches(product_id, from))
    {
        return Err(StorefrontError::Validation(
            "That item is not in your cart".to_string(),
        ));
    }

    let product = catalog::product_details(storefront.api(), product_id).await?;
    let variant = product.variant_by_dimension(to).ok_or_else(|| {
        StorefrontError::Validation(format!("{} has no variant \"{to}\"", product.name))
    })?;

    let cart = storefront.cart_mut();
    cart.change_variant(product_id, from, variant);
    cart.settle().await;

    println!("{}", render(cart));
    if let Some(error) = cart.error() {
        println!("{error}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn remove(storefront: &mut Storefront, product_id: ProductId, variant: Option<&str>) {
    storefront.cart_mut().remove(product_id, variant);
    println!("{}", render(storefront.cart()));
}

/// Set a line's quantity. The cart keeps whatever it is given, so
/// non-positive quantities are turned into a removal here.
#[allow(clippy::print_stdout)]
pub fn update(
    storefront: &mut Storefront,
    product_id: ProductId,
    quantity: i64,
    variant: Option<&str>,
) {
    let cart = storefront.cart_mut();
    if quantity <= 0 {
        cart.remove(product_id, variant);
    } else {
        cart.update_quantity(product_id, quantity, variant);
    }
    println!("{}", render(storefront.cart()));
}

#[allow(clippy::print_stdout)]
pub fn clear(storefront: &mut Storefront) {
    storefront.cart_mut().clear();
    println!("Cart cleared.");
}
