//! Authentication module for the client session.
//!
//! This module provides:
//! - `SessionStore`: bearer token and user profile, login/logout lifecycle
//! - `TokenStore`: durable token slot (JSON file or OS keychain)
//!
//! The session store is the only writer of the gateway's authorization
//! header and of the stored token, apart from the gateway's `401` path which
//! wipes the stored token directly.

pub mod session;
pub mod storage;

pub use session::SessionStore;
pub use storage::{token_store_for, FileTokenStore, KeyringTokenStore, TokenStore};
