//! Signed-in account pages: profile and order history.

use tracing::instrument;

use hardalum_core::{Order, User};

use crate::api::{ApiClient, ApiError};
use crate::auth::AuthSession;
use crate::error::{Result, StorefrontError};

/// Fetch the signed-in user's profile.
///
/// # Errors
///
/// Returns `NotAuthenticated` without a token, `SessionExpired` if the API
/// rejects it (the session is cleared), or the underlying API error.
#[instrument(skip_all)]
pub async fn fetch_profile(api: &ApiClient, auth: &mut AuthSession) -> Result<User> {
    let token = auth.token().ok_or(StorefrontError::NotAuthenticated)?;
    let result = api.profile(token).await;
    authorized(auth, result)
}

/// Fetch the signed-in user's orders, newest first as returned by the API.
///
/// # Errors
///
/// Same as [`fetch_profile`].
#[instrument(skip_all)]
pub async fn fetch_order_history(api: &ApiClient, auth: &mut AuthSession) -> Result<Vec<Order>> {
    let token = auth.token().ok_or(StorefrontError::NotAuthenticated)?;
    let result = api.order_history(token).await;
    authorized(auth, result)
}

/// Turn a rejected token into a signed-out session.
fn authorized<T>(auth: &mut AuthSession, result: std::result::Result<T, ApiError>) -> Result<T> {
    result.map_err(|e| {
        if auth.handle_auth_error(e.status()) {
            StorefrontError::SessionExpired
        } else {
            tracing::warn!(error = %e, "Account request failed");
            e.into()
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use hardalum_core::{Email, UserId};
    use secrecy::SecretString;

    use super::*;
    use crate::storage::MemoryStore;

    fn signed_in() -> AuthSession {
        let mut auth = AuthSession::new(Arc::new(MemoryStore::new()));
        auth.login(
            User {
                id: UserId::new(1),
                username: "ada".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
                created_at: None,
            },
            SecretString::from("tok"),
        )
        .unwrap();
        auth
    }

    #[tokio::test]
    async fn test_requires_token() {
        let mut auth = AuthSession::new(Arc::new(MemoryStore::new()));
        let api = ApiClient::new(&"http://127.0.0.1:9".parse().unwrap()).unwrap();

        assert!(matches!(
            fetch_profile(&api, &mut auth).await,
            Err(StorefrontError::NotAuthenticated)
        ));
        assert!(matches!(
            fetch_order_history(&api, &mut auth).await,
            Err(StorefrontError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_unauthorized_signs_out() {
        let mut auth = signed_in();
        let result: Result<()> = authorized(&mut auth, Err(ApiError::Unauthorized));
        assert!(matches!(result, Err(StorefrontError::SessionExpired)));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_other_errors_keep_session() {
        let mut auth = signed_in();
        let result: Result<()> = authorized(
            &mut auth,
            Err(ApiError::Status {
                status: 500,
                message: "down".to_string(),
            }),
        );
        assert!(matches!(result, Err(StorefrontError::Api(_))));
        assert!(auth.is_authenticated());
    }
}
