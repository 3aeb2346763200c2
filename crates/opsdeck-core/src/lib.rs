//! Core library for the opsdeck operations client.
//!
//! - `api`: the HTTP gateway every backend call goes through
//! - `auth`: bearer token storage and the session store
//! - `router`: the static route table and its authentication guard
//! - `config`: persisted client configuration
//! - `models`: backend payload types

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;

pub use api::{ApiClient, ApiError};
pub use auth::SessionStore;
pub use config::Config;
pub use router::{Route, Router};
