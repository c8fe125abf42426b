//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` owns the in-memory token, profile and permissions; `storage`
//! is the key-value backend the token is persisted to. The store is an
//! explicitly constructed value handed to the router and request layers.

pub mod session;
pub mod storage;
