//! Navigation guard run before every route transition.
//!
//! Checks, in order:
//! 1. token present but no profile loaded: hydrate via `fetch_me`
//! 2. route requires auth and there is no token: go to `/login`
//! 3. route requires a permission the session lacks: go to `/forbidden`
//! 4. otherwise proceed
//!
//! Each navigation is evaluated on its own; the only shared state is the
//! session store.

use super::routes::{FORBIDDEN_ROUTE, LOGIN_ROUTE, RouteMeta};
use crate::state::session::AuthStore;

/// Guard verdict for a single transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

pub async fn before_each(auth: &mut AuthStore, to: &RouteMeta) -> Navigation {
    // Lazy hydration after a reload: the token survived, the profile did not.
    if auth.is_authenticated() && auth.user().is_none() {
        auth.fetch_me().await;
    }

    if to.requires_auth && !auth.is_authenticated() {
        return Navigation::Redirect(LOGIN_ROUTE);
    }

    if let Some(permission) = to.permission.as_deref() {
        if !auth.has_perm(permission) {
            return Navigation::Redirect(FORBIDDEN_ROUTE);
        }
    }

    Navigation::Proceed
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
