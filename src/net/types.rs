//! Wire types for the auth API.
//!
//! Response shapes are decoded into these records at the request-wrapper
//! boundary so the session store never handles loosely-typed JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated user profile as returned by `/api/auth/login` and `/api/auth/me`.
///
/// Only `permissions` is structural. Everything else the server sends (id,
/// email, account flags) is kept as raw JSON in `fields` so an unexpected
/// type there never fails the decode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Granted permission names, sorted by the server. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl User {
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.fields.get("id").filter(|id| !id.is_null())
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.fields.get("email").and_then(Value::as_str)
    }

    /// Boolean account flag such as `is_active`; missing or non-boolean is false.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.fields.get(name).and_then(Value::as_bool).unwrap_or(false)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /api/auth/login`.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub remember_me: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
