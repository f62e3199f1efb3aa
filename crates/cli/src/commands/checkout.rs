//! Checkout command.

use clap::Args;

use hardalum_core::ProductId;
use hardalum_storefront::Storefront;
use hardalum_storefront::catalog;
use hardalum_storefront::checkout::{CheckoutForm, CheckoutSource};
use hardalum_storefront::error::{Result, StorefrontError};

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    name: String,

    /// Defaults to the signed-in user's email
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    zip: String,

    /// Ten-digit phone number
    #[arg(long)]
    phone: String,

    /// Buy this product directly instead of the cart
    #[arg(long)]
    buy_now: Option<ProductId>,

    /// Variant label for `--buy-now`
    #[arg(long, requires = "buy_now")]
    variant: Option<String>,

    /// Quantity for `--buy-now`
    #[arg(
        long,
        default_value_t = 1,
        requires = "buy_now",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    quantity: u32,
}

/// Place an order for the cart or a single product.
///
/// # Errors
///
/// Returns an error for invalid details, an empty cart, or a failed order.
#[allow(clippy::print_stdout)]
pub async fn checkout(storefront: &mut Storefront, args: CheckoutArgs) -> Result<()> {
    let source = match args.buy_now {
        Some(product_id) => {
            let product = catalog::product_details(storefront.api(), product_id).await?;
            let variant = match args.variant.as_deref() {
                Some(label) => Some(product.variant_by_dimension(label).cloned().ok_or_else(
                    || StorefrontError::Validation(format!("{} has no variant \"{label}\"", product.name)),
                )?),
                None => product.default_variant().cloned(),
            };
            CheckoutSource::Direct {
                product,
                quantity: args.quantity,
                variant,
            }
        }
        None => CheckoutSource::Cart,
    };

    let email = args
        .email
        .or_else(|| storefront.auth().user().map(|u| u.email.to_string()))
        .unwrap_or_default();

    let form = CheckoutForm {
        name: args.name,
        email,
        address: args.address,
        city: args.city,
        zip: args.zip,
        phone: args.phone,
    };

    let receipt = storefront.place_order(&form, &source).await?;

    println!("Your order has been placed successfully!");
    if let Some(order_id) = receipt.confirmation.order_id {
        println!("Order #{order_id}");
    }
    println!("Subtotal: {}", receipt.totals.subtotal);
    println!("Shipping: {}", receipt.totals.shipping);
    println!("Total:    {}", receipt.totals.total);
    Ok(())
}
