//! Contact command.

use hardalum_storefront::Storefront;
use hardalum_storefront::contact::{self, ContactForm, THANK_YOU_MESSAGE};
use hardalum_storefront::error::Result;

/// Send a message to the shop.
///
/// # Errors
///
/// Returns an error for invalid fields or if the API rejects the message.
#[allow(clippy::print_stdout)]
pub async fn send(storefront: &Storefront, form: ContactForm) -> Result<()> {
    contact::submit_contact(storefront.api(), &form).await?;
    println!("{THANK_YOU_MESSAGE}");
    Ok(())
}
