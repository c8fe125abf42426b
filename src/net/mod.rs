//! HTTP layer: the JSON request wrapper and the auth API wire types.

pub mod api;
pub mod error;
pub mod types;
