//! Backend payload types.
//!
//! - `UserProfile`: the principal returned by `/auth/me`
//! - `LoginResponse`: the token issued by `/auth/login`
//! - `HealthStatus`: the `/health` probe

pub mod user;

pub use user::{HealthStatus, LoginResponse, UserProfile};
