//! Session store: bearer token, user profile and permission set.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is the single owner of session state. The navigation guard
//! reads it and may ask it to hydrate via [`AuthStore::fetch_me`]; the
//! request wrapper receives the store's token for every call.
//!
//! LIFECYCLE
//! =========
//! - construction: token read from storage key `"token"`, user/permissions empty
//! - `login`: token, user and permissions replaced together, token persisted
//! - `fetch_me`: user and permissions refreshed; any failure logs out
//! - `logout`: everything cleared, storage key removed
//!
//! `user` and `permissions` are only ever non-empty while `token` is.

use serde_json::Value;

use crate::net::api::{ApiClient, RequestOptions};
use crate::net::error::ApiError;
use crate::net::types::{LoginRequest, LoginResponse, MeResponse, User};
use crate::state::storage::{StorageError, TOKEN_KEY, TokenStorage};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const ME_PATH: &str = "/api/auth/me";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The login endpoint answered 2xx without a usable token.
    #[error("login response carried no token")]
    MissingToken,
}

/// In-memory session. An empty token means logged out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
    pub permissions: Vec<String>,
}

pub struct AuthStore {
    api: ApiClient,
    storage: Box<dyn TokenStorage>,
    session: Session,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("base_url", &self.api.base_url())
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.session.user.as_ref().and_then(User::email))
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Create the store, restoring the token persisted in `storage`.
    pub fn new(api: ApiClient, storage: Box<dyn TokenStorage>) -> Self {
        let token = storage.get_item(TOKEN_KEY).unwrap_or_default();
        Self { api, storage, session: Session { token, user: None, permissions: Vec::new() } }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.session.token
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    #[must_use]
    pub fn permissions(&self) -> &[String] {
        &self.session.permissions
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.session.token.is_empty()
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Authenticate against `/api/auth/login` and replace the session.
    ///
    /// # Errors
    ///
    /// Returns the endpoint's [`ApiError`] on rejected credentials, transport
    /// failure or an unexpected payload, and [`StorageError`] if the token
    /// cannot be persisted. An empty token in the response is
    /// [`AuthError::MissingToken`]. The session is unchanged on any error.
    pub async fn login(&mut self, email: &str, password: &str, remember_me: bool) -> Result<&Session, AuthError> {
        let body = serde_json::to_value(LoginRequest { email, password, remember_me }).map_err(ApiError::from)?;
        let data: LoginResponse = self
            .api
            .request_json(&self.session.token, LOGIN_PATH, RequestOptions::post(body))
            .await?;
        if data.token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        self.storage.set_item(TOKEN_KEY, &data.token)?;

        let permissions = data.user.permissions.clone();
        self.session = Session { token: data.token, user: Some(data.user), permissions };
        tracing::info!(%email, permissions = self.session.permissions.len(), "logged in");

        Ok(&self.session)
    }

    /// Refresh the profile from `/api/auth/me`.
    ///
    /// Does nothing without a token. Recovery policy: any failure (network,
    /// rejected token, malformed payload) ends the session through
    /// [`AuthStore::logout`]; this method never fails.
    pub async fn fetch_me(&mut self) {
        if self.session.token.is_empty() {
            return;
        }

        let result = self
            .api
            .request_json::<MeResponse>(&self.session.token, ME_PATH, RequestOptions::get())
            .await;

        match result {
            Ok(data) => {
                self.session.permissions = data.user.permissions.clone();
                self.session.user = Some(data.user);
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "profile fetch failed; logging out");
                self.logout();
            }
        }
    }

    /// Whether the current session holds `permission`. False when logged out.
    #[must_use]
    pub fn has_perm(&self, permission: &str) -> bool {
        self.is_authenticated() && self.session.permissions.iter().any(|p| p == permission)
    }

    /// Clear the session and the persisted token. Safe to call repeatedly.
    pub fn logout(&mut self) {
        let was_authenticated = self.is_authenticated();
        self.session = Session::default();
        if let Err(e) = self.storage.remove_item(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted token");
        }
        if was_authenticated {
            tracing::info!("logged out");
        }
    }

    /// Call the API with the current token attached.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        self.api.request(&self.session.token, path, options).await
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
