//! Signed-in user session.
//!
//! The user and bearer token are persisted under the `user` and `token`
//! storage keys so a session survives restarts. On startup
//! [`AuthSession::initialize`] checks the stored token against
//! `GET /api/profile` and forgets both values if the API rejects it.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use hardalum_core::{Email, User};

use crate::api::ApiClient;
use crate::error::{Result, StorefrontError, clear_sentry_user, set_sentry_user};
use crate::storage::{KeyValueStore, keys};

/// Current authentication state.
pub struct AuthSession {
    storage: Arc<dyn KeyValueStore>,
    user: Option<User>,
    token: Option<SecretString>,
    initialized: bool,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("has_token", &self.token.is_some())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Load whatever credentials are stored, without validating them.
    ///
    /// A stored user that cannot be parsed is treated as absent.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let user = match storage.get(keys::USER) {
            Ok(Some(json)) => serde_json::from_str::<User>(&json)
                .inspect_err(|e| tracing::warn!(error = %e, "Stored user is corrupt"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored user");
                None
            }
        };

        let token = match storage.get(keys::TOKEN) {
            Ok(token) => token.map(SecretString::from),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        };

        Self {
            storage,
            user,
            token,
            initialized: false,
        }
    }

    /// Validate stored credentials against the API.
    ///
    /// Keeps them if `GET /api/profile` succeeds; otherwise clears the session
    /// and its stored keys. Always marks the session initialized.
    #[instrument(skip(self, api))]
    pub async fn initialize(&mut self, api: &ApiClient) {
        let keep = match self.user.as_ref().zip(self.token.as_ref()) {
            Some((user, token)) => match api.profile(token).await {
                Ok(_) => {
                    tracing::debug!(user_id = %user.id, "Stored session is valid");
                    set_sentry_user(&user.id, Some(user.email.as_str()));
                    true
                }
                Err(e) => {
                    tracing::info!(error = %e, "Stored session rejected, signing out");
                    false
                }
            },
            // Half a session is no session.
            None => self.user.is_none() && self.token.is_none(),
        };

        if !keep {
            self.logout();
        }

        self.initialized = true;
    }

    /// Whether [`AuthSession::initialize`] has run.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The bearer token, if signed in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Record a successful sign-in and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be written to storage. The
    /// in-memory session is updated either way.
    pub fn login(&mut self, user: User, token: SecretString) -> Result<()> {
        set_sentry_user(&user.id, Some(user.email.as_str()));
        tracing::info!(user_id = %user.id, "Signed in");

        let user_json = serde_json::to_string(&user)?;
        let token_value = token.expose_secret().to_string();
        self.user = Some(user);
        self.token = Some(token);

        self.storage.put(keys::USER, &user_json)?;
        self.storage.put(keys::TOKEN, &token_value)?;
        Ok(())
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the API error for rejected credentials, or a storage error if
    /// the session cannot be persisted.
    #[instrument(skip(self, api, email, password), fields(email = %email))]
    pub async fn sign_in(
        &mut self,
        api: &ApiClient,
        email: &Email,
        password: &SecretString,
    ) -> Result<&User> {
        let response = api.login(email, password).await?;
        self.login(response.user, SecretString::from(response.token))?;
        self.user.as_ref().ok_or(StorefrontError::NotAuthenticated)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns the API error if signup is rejected, or a storage error if the
    /// session cannot be persisted.
    #[instrument(skip(self, api, email, password), fields(email = %email))]
    pub async fn sign_up(
        &mut self,
        api: &ApiClient,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<&User> {
        let response = api.signup(username, email, password).await?;
        self.login(response.user, SecretString::from(response.token))?;
        self.user.as_ref().ok_or(StorefrontError::NotAuthenticated)
    }

    /// Forget the session and its stored keys.
    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        clear_sentry_user();

        for key in [keys::USER, keys::TOKEN] {
            if let Err(e) = self.storage.delete(key) {
                tracing::error!(key, error = %e, "Failed to remove stored credential");
            }
        }
        tracing::info!("Signed out");
    }

    /// Sign out if `status` says the token was rejected.
    ///
    /// Returns `true` when the session was cleared.
    pub fn handle_auth_error(&mut self, status: Option<u16>) -> bool {
        if status == Some(401) {
            self.logout();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hardalum_core::UserId;

    use super::*;
    use crate::storage::MemoryStore;

    fn user() -> User {
        User {
            id: UserId::new(42),
            username: "mira".to_string(),
            email: Email::parse("mira@example.com").unwrap(),
            created_at: None,
        }
    }

    #[test]
    fn test_login_persists_and_restores() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = AuthSession::new(storage.clone());
        assert!(!session.is_authenticated());

        session
            .login(user(), SecretString::from("tok-123"))
            .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("tok-123"));

        let restored = AuthSession::new(storage);
        assert_eq!(restored.user(), Some(&user()));
        assert_eq!(restored.token().unwrap().expose_secret(), "tok-123");
        assert!(!restored.is_initialized());
    }

    #[test]
    fn test_logout_clears_state_and_storage() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = AuthSession::new(storage.clone());
        session.login(user(), SecretString::from("tok")).unwrap();

        session.logout();
        assert!(session.user().is_none());
        assert!(session.token().is_none());
        assert_eq!(storage.get(keys::USER).unwrap(), None);
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
    }

    #[test]
    fn test_handle_auth_error_only_on_401() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = AuthSession::new(storage);
        session.login(user(), SecretString::from("tok")).unwrap();

        assert!(!session.handle_auth_error(Some(500)));
        assert!(!session.handle_auth_error(None));
        assert!(session.is_authenticated());

        assert!(session.handle_auth_error(Some(401)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_corrupt_stored_user_is_ignored() {
        let storage = Arc::new(MemoryStore::new());
        storage.put(keys::USER, "{broken").unwrap();
        storage.put(keys::TOKEN, "tok").unwrap();

        let session = AuthSession::new(storage);
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_drops_half_session_without_network() {
        let storage = Arc::new(MemoryStore::new());
        storage.put(keys::TOKEN, "orphan").unwrap();

        let mut session = AuthSession::new(storage.clone());
        // Unroutable base URL: the profile check must never be attempted.
        let api = ApiClient::new(&"http://127.0.0.1:9".parse().unwrap()).unwrap();
        session.initialize(&api).await;

        assert!(session.is_initialized());
        assert!(session.token().is_none());
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
    }
}
