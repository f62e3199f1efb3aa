//! Contact form.

use tracing::instrument;

use hardalum_core::Email;

use crate::api::{ApiClient, ContactRequest};
use crate::error::{Result, StorefrontError};

/// Message shown after a successful submission.
pub const THANK_YOU_MESSAGE: &str = "Thank you for your message! We will get back to you shortly.";

/// A message to the shop.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Check every field and build the request body.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank field or `Email` for a malformed
    /// address.
    pub fn validate(&self) -> Result<ContactRequest> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(StorefrontError::Validation(format!(
                    "Please enter your {field}."
                )));
            }
        }

        Ok(ContactRequest {
            name: self.name.trim().to_string(),
            email: Email::parse(&self.email)?,
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// Validate and send a contact message.
///
/// # Errors
///
/// Returns a validation error before any request is made, or the API error.
#[instrument(skip_all)]
pub async fn submit_contact(api: &ApiClient, form: &ContactForm) -> Result<()> {
    let request = form.validate()?;
    api.submit_contact(&request).await?;
    tracing::info!("Contact message sent");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: " Ada ".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Bulk order".to_string(),
            message: "Do you cut to length?".to_string(),
        }
    }

    #[test]
    fn test_validate_builds_trimmed_request() {
        let request = form().validate().unwrap();
        assert_eq!(request.name, "Ada");
        assert_eq!(request.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_validate_rejects_blank_message() {
        let mut blank = form();
        blank.message = "\n".to_string();
        assert!(matches!(
            blank.validate(),
            Err(StorefrontError::Validation(msg)) if msg == "Please enter your message."
        ));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut bad = form();
        bad.email = "ada@".to_string();
        assert!(matches!(bad.validate(), Err(StorefrontError::Email(_))));
    }
}
