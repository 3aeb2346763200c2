//! HTTP gateway for the operations platform backend.
//!
//! Every backend call goes through the shared `ApiClient`, which applies the
//! configured base URL and timeout, attaches the bearer token, and reports
//! failures uniformly through the host hooks in `hooks`.

pub mod client;
pub mod error;
pub mod hooks;

pub use client::{ApiClient, RequestBody};
pub use error::ApiError;
pub use hooks::{Navigator, Notifier};
