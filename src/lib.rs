//! # session-guard
//!
//! Client-side authentication layer for the single-page app: a session store
//! holding the bearer token and permission set, a JSON request wrapper that
//! injects the token, and a navigation guard that gates routes on
//! authentication and permissions.
//!
//! SYSTEM CONTEXT
//! ==============
//! A navigation runs the guard in [`router`], which may hydrate the session
//! through [`state::session::AuthStore::fetch_me`], which issues its call via
//! [`net::api::ApiClient`] using the token the store currently holds.

pub mod config;
pub mod net;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::ClientConfig;
pub use net::api::{ApiClient, RequestOptions};
pub use net::error::ApiError;
pub use router::guard::Navigation;
pub use router::routes::{Route, RouteMeta, Router, View};
pub use state::session::{AuthError, AuthStore, Session};
pub use state::storage::{FileStorage, MemoryStorage, StorageError, TokenStorage};
