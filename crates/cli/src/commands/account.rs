//! Sign-in and account commands.

use secrecy::SecretString;

use hardalum_core::{Email, Order};
use hardalum_storefront::Storefront;
use hardalum_storefront::error::Result;

/// Sign in with email and password.
///
/// # Errors
///
/// Returns an error for a malformed email or rejected credentials.
#[allow(clippy::print_stdout)]
pub async fn login(storefront: &mut Storefront, email: &str, password: SecretString) -> Result<()> {
    let email = Email::parse(email)?;
    let user = storefront.login(&email, &password).await?;
    println!("Signed in as {}.", user.display_name());
    Ok(())
}

/// Create an account.
///
/// # Errors
///
/// Returns an error for a malformed email or if the API rejects the signup.
#[allow(clippy::print_stdout)]
pub async fn signup(
    storefront: &mut Storefront,
    username: &str,
    email: &str,
    password: SecretString,
) -> Result<()> {
    let email = Email::parse(email)?;
    let user = storefront.signup(username.trim(), &email, &password).await?;
    println!("Welcome, {}! Your account is ready.", user.display_name());
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn logout(storefront: &mut Storefront) {
    storefront.logout();
    println!("Signed out.");
}

/// Show the signed-in user's profile.
///
/// # Errors
///
/// Returns an error if not signed in or the session has expired.
#[allow(clippy::print_stdout)]
pub async fn profile(storefront: &mut Storefront) -> Result<()> {
    let user = storefront.profile().await?;
    println!("Username: {}", user.display_name());
    println!("Email:    {}", user.email);
    if let Some(created_at) = user.created_at {
        println!("Member since {}", created_at.format("%B %-d, %Y"));
    }
    Ok(())
}

/// Summary line for one past order.
pub fn order_summary(order: &Order) -> String {
    format!(
        "Order #{} - {} - {} - {} item(s) - {}",
        order.id,
        order.order_date.format("%Y-%m-%d"),
        order.status.as_str(),
        order.unit_count(),
        order.total_amount
    )
}

/// Show the signed-in user's past orders.
///
/// # Errors
///
/// Returns an error if not signed in or the session has expired.
#[allow(clippy::print_stdout)]
pub async fn orders(storefront: &mut Storefront) -> Result<()> {
    let orders = storefront.order_history().await?;
    if orders.is_empty() {
        println!("You have not placed any orders yet.");
        return Ok(());
    }

    for order in &orders {
        println!("{}", order_summary(order));
        for item in &order.items {
            let dimension = item
                .dimension
                .as_deref()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default();
            println!(
                "    {}{dimension} x {} @ {}",
                item.product_name, item.quantity, item.price_at_purchase
            );
        }
        println!("    Ship to: {}", order.shipping_address);
    }
    Ok(())
}
