//! Sign-in flows.
//!
//! [`AuthService`] drives the auth endpoints and publishes the result through
//! its [`AuthContext`]. The bearer token is persisted under
//! [`keys::TOKEN`](crate::storage::keys::TOKEN) so a later run can restore the
//! session with a single `/auth/me` call.

mod context;
mod error;

pub use context::{AuthContext, AuthState};
pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::instrument;

use heavyline_core::Email;

use crate::api::{ApiClient, ApiError};
use crate::models::AuthSession;
use crate::storage::{KeyValueStore, keys};

/// Login, logout and session restore on top of the REST API.
pub struct AuthService<S> {
    api: ApiClient,
    context: AuthContext,
    store: S,
}

impl<S: KeyValueStore> AuthService<S> {
    /// Create a service with nobody signed in.
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            context: AuthContext::new(),
            store,
        }
    }

    /// Subscribe to sign-in changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.context.subscribe()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.context.session()
    }

    /// Restore a session from a persisted token.
    ///
    /// Any failure (no token, expired token, unreachable API) leaves the user
    /// signed out, and a token that did not work is dropped.
    #[instrument(skip(self))]
    pub async fn restore(&mut self) -> Option<AuthSession> {
        let token = match self.store.get(keys::TOKEN) {
            Ok(Some(token)) if !token.trim().is_empty() => token,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted token");
                return None;
            }
        };

        self.api.set_token(SecretString::from(token)).await;
        match self.api.current_user().await {
            Ok(session) => {
                self.context.sign_in(session.clone());
                Some(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session restore failed");
                self.forget_token().await;
                None
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` before any request if the email is
    /// malformed, `AuthError::InvalidCredentials` if the API rejects the
    /// password, and `AuthError::Api`/`AuthError::Storage` otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email)?;

        let token = self
            .api
            .login(email.as_str(), password)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized => AuthError::InvalidCredentials,
                other => AuthError::Api(other),
            })?;

        self.api.set_token(token.clone()).await;
        let session = match self.api.current_user().await {
            Ok(session) => session,
            Err(e) => {
                self.api.clear_token().await;
                return Err(e.into());
            }
        };

        self.store.set(keys::TOKEN, token.expose_secret())?;
        self.context.sign_in(session.clone());
        Ok(session)
    }

    /// Sign out locally and tell the API.
    ///
    /// The local sign-out always happens; an API failure is only logged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the persisted token cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if self.api.has_token().await
            && let Err(e) = self.api.logout().await
        {
            tracing::warn!(error = %e, "Logout request failed");
        }

        self.api.clear_token().await;
        self.context.sign_out();
        self.store.remove(keys::TOKEN)?;
        Ok(())
    }

    /// Drop the session after the API reported it as no longer valid.
    pub async fn invalidate(&mut self) {
        tracing::info!("Session rejected by API");
        self.forget_token().await;
    }

    async fn forget_token(&mut self) {
        self.api.clear_token().await;
        self.context.expire();
        if let Err(e) = self.store.remove(keys::TOKEN) {
            tracing::warn!(error = %e, "Failed to remove persisted token");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStore;

    fn service(server: &MockServer, store: MemoryStore) -> AuthService<MemoryStore> {
        let config = StorefrontConfig::for_api(&server.base_url()).unwrap();
        AuthService::new(ApiClient::new(&config).unwrap(), store)
    }

    fn mock_me(server: &MockServer, token: &str) {
        let bearer = format!("Bearer {token}");
        server.mock(|when, then| {
            when.method(GET).path("/auth/me").header("authorization", bearer);
            then.status(200).json_body(serde_json::json!({
                "user_id": 5, "email": "buyer@example.ru", "name": "Иван", "is_active": true, "is_admin": false
            }));
        });
    }

    #[tokio::test]
    async fn test_login_persists_token_and_signs_in() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(200).json_body(serde_json::json!({"access_token": "tok", "token_type": "bearer"}));
        });
        mock_me(&server, "tok");

        let mut auth = service(&server, MemoryStore::new());
        let rx = auth.subscribe();
        let session = auth
            .login("buyer@example.ru", &SecretString::from("pw"))
            .await
            .unwrap();

        assert_eq!(session.display_name(), "Иван");
        assert!(rx.borrow().is_authenticated());
        assert_eq!(auth.store.get(keys::TOKEN).unwrap().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_login_with_malformed_email_makes_no_request() {
        let server = MockServer::start();
        let login = server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(200);
        });

        let mut auth = service(&server, MemoryStore::new());
        let result = auth.login("not-an-email", &SecretString::from("pw")).await;

        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
        login.assert_calls(0);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(401).json_body(serde_json::json!({"detail": "Incorrect email or password"}));
        });

        let mut auth = service(&server, MemoryStore::new());
        let result = auth.login("buyer@example.ru", &SecretString::from("pw")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(auth.session().is_none());
    }

    #[tokio::test]
    async fn test_restore_uses_persisted_token() {
        let server = MockServer::start();
        mock_me(&server, "saved");

        let mut store = MemoryStore::new();
        store.set(keys::TOKEN, "saved").unwrap();
        let mut auth = service(&server, store);

        let session = auth.restore().await.unwrap();
        assert_eq!(session.email, "buyer@example.ru");
    }

    #[tokio::test]
    async fn test_restore_with_rejected_token_drops_it() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/auth/me");
            then.status(401).json_body(serde_json::json!({"detail": "Not authenticated"}));
        });

        let mut store = MemoryStore::new();
        store.set(keys::TOKEN, "stale").unwrap();
        let mut auth = service(&server, store);
        let rx = auth.subscribe();

        assert!(auth.restore().await.is_none());
        assert_eq!(auth.store.get(keys::TOKEN).unwrap(), None);
        assert_eq!(rx.borrow().sign_outs, 1);
    }

    #[tokio::test]
    async fn test_restore_without_token_is_not_a_sign_out() {
        let server = MockServer::start();
        let me = server.mock(|when, then| {
            when.method(GET).path("/auth/me");
            then.status(200);
        });

        let mut auth = service(&server, MemoryStore::new());
        let rx = auth.subscribe();

        assert!(auth.restore().await.is_none());
        assert_eq!(rx.borrow().sign_outs, 0);
        me.assert_calls(0);
    }

    #[tokio::test]
    async fn test_logout_survives_api_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(200).json_body(serde_json::json!({"access_token": "tok"}));
        });
        mock_me(&server, "tok");
        server.mock(|when, then| {
            when.method(POST).path("/auth/logout");
            then.status(500);
        });

        let mut auth = service(&server, MemoryStore::new());
        let rx = auth.subscribe();
        auth.login("buyer@example.ru", &SecretString::from("pw"))
            .await
            .unwrap();
        auth.logout().await.unwrap();

        assert!(auth.session().is_none());
        assert_eq!(rx.borrow().sign_outs, 1);
        assert_eq!(auth.store.get(keys::TOKEN).unwrap(), None);
    }
}
