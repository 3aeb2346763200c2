//! Side effects the gateway asks its host to perform.
//!
//! The gateway itself never draws anything or owns navigation state. Hosts
//! (the terminal UI, the one-shot CLI commands, tests) implement these
//! traits and hand them to `ApiClient::new`.

/// Surfaces a transient, user-facing error message.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Performs a hard redirect: a full reset of the host's navigation state,
/// bypassing the router guard.
pub trait Navigator: Send + Sync {
    fn hard_redirect(&self, path: &str);
}
