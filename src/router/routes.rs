//! Route table and guarded navigation.
//!
//! Routes are static configuration. [`Router::navigate`] runs the guard for
//! the requested path and follows redirects until some route is allowed.

use super::guard::{self, Navigation};
use crate::state::session::AuthStore;

pub const LOGIN_ROUTE: &str = "/login";
pub const FORBIDDEN_ROUTE: &str = "/forbidden";
pub const HOME_ROUTE: &str = "/";

/// Upper bound on consecutive guard redirects within one navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("no route matches {0}")]
    NotFound(String),
    #[error("redirect loop while navigating to {0}")]
    RedirectLoop(String),
}

/// Guard-relevant route metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// Permission the session must hold to enter.
    pub permission: Option<String>,
}

impl RouteMeta {
    #[must_use]
    pub fn requires_auth() -> Self {
        Self { requires_auth: true, permission: None }
    }

    #[must_use]
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }
}

/// Pages of the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Login,
    Forbidden,
    Dashboard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route<C = View> {
    pub path: String,
    pub component: C,
    pub meta: RouteMeta,
}

impl<C> Route<C> {
    pub fn new(path: impl Into<String>, component: C) -> Self {
        Self { path: path.into(), component, meta: RouteMeta::default() }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Router<C = View> {
    routes: Vec<Route<C>>,
}

impl Default for Router<View> {
    /// The application route table.
    fn default() -> Self {
        Self::new(vec![
            Route::new(LOGIN_ROUTE, View::Login),
            Route::new(FORBIDDEN_ROUTE, View::Forbidden),
            Route::new(HOME_ROUTE, View::Dashboard).with_meta(RouteMeta::requires_auth()),
        ])
    }
}

impl<C> Router<C> {
    #[must_use]
    pub fn new(routes: Vec<Route<C>>) -> Self {
        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[Route<C>] {
        &self.routes
    }

    /// Exact-path lookup. A trailing slash is ignored except on `/`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Route<C>> {
        let wanted = normalize(path);
        self.routes.iter().find(|route| normalize(&route.path) == wanted)
    }

    /// Navigate to `path`, applying the guard and following its redirects.
    ///
    /// # Errors
    ///
    /// [`RouterError::NotFound`] when a requested or redirected-to path has
    /// no route, [`RouterError::RedirectLoop`] after [`MAX_REDIRECTS`] hops.
    pub async fn navigate(&self, auth: &mut AuthStore, path: &str) -> Result<&Route<C>, RouterError> {
        let mut target = self.resolve(path).ok_or_else(|| RouterError::NotFound(path.to_owned()))?;

        for _ in 0..=MAX_REDIRECTS {
            match guard::before_each(auth, &target.meta).await {
                Navigation::Proceed => return Ok(target),
                Navigation::Redirect(next) => {
                    tracing::debug!(from = %target.path, to = next, "navigation redirected");
                    target = self.resolve(next).ok_or_else(|| RouterError::NotFound(next.to_owned()))?;
                }
            }
        }

        Err(RouterError::RedirectLoop(path.to_owned()))
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
