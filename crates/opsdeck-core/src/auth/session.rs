use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::TokenStore;
use crate::api::ApiClient;
use crate::models::{LoginResponse, UserProfile};

pub const LOGIN_PATH: &str = "/auth/login";
pub const ME_PATH: &str = "/auth/me";

#[derive(Debug, Default)]
struct SessionState {
    /// Empty when anonymous
    token: String,
    user: Option<UserProfile>,
}

struct Inner {
    api: ApiClient,
    storage: Arc<dyn TokenStore>,
    state: Mutex<SessionState>,
    /// Flips to true once the bootstrap profile fetch has resolved.
    ready: watch::Sender<bool>,
}

/// Client-side session: the bearer token, the user it belongs to, and the
/// login/logout lifecycle around them.
///
/// Clones share state. Token changes update memory, durable storage and the
/// gateway's authorization header under one lock, so the three never
/// disagree once a call returns.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Build the store from whatever token durable storage holds.
    ///
    /// With a stored token the session is authenticated immediately, before
    /// the profile is confirmed, and `fetch_user` runs as a background task.
    /// `wait_ready` resolves once that task finishes.
    ///
    /// # Panics
    ///
    /// Spawning the bootstrap fetch requires a Tokio runtime.
    pub fn restore(api: ApiClient, storage: Arc<dyn TokenStore>) -> Self {
        let token = match storage.load() {
            Ok(token) => token.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to load stored token, starting anonymous");
                String::new()
            }
        };
        let has_token = !token.is_empty();
        api.set_authorization(has_token.then_some(token.as_str()));

        let (ready, _) = watch::channel(!has_token);
        let store = Self {
            inner: Arc::new(Inner {
                api,
                storage,
                state: Mutex::new(SessionState { token, user: None }),
                ready,
            }),
        };

        if has_token {
            debug!("Stored token found, fetching profile");
            let bootstrap = store.clone();
            tokio::spawn(async move {
                bootstrap.fetch_user().await;
                bootstrap.inner.ready.send_replace(true);
            });
        }

        store
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn token(&self) -> String {
        self.state().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.state().token.is_empty()
    }

    /// Whether the bootstrap profile fetch (if any) has resolved.
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    /// Wait for the bootstrap profile fetch, then report whether the
    /// session survived it.
    pub async fn wait_ready(&self) -> bool {
        let mut rx = self.inner.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|ready| *ready).await;
        self.is_authenticated()
    }

    pub fn set_token(&self, token: &str) {
        let mut state = self.state();
        state.token = token.to_string();
        if let Err(e) = self.inner.storage.save(token) {
            warn!(error = %e, "Failed to persist token");
        }
        self.inner.api.set_authorization(Some(token));
    }

    pub fn clear_token(&self) {
        let mut state = self.state();
        state.token.clear();
        state.user = None;
        if let Err(e) = self.inner.storage.clear() {
            warn!(error = %e, "Failed to remove stored token");
        }
        self.inner.api.set_authorization(None);
    }

    /// Exchange credentials for a token, then load the profile.
    ///
    /// Returns `true` once the token is stored; a failed profile fetch
    /// afterwards drops the session back to anonymous on its own. Any
    /// failure before that is logged and reported as `false`. Nothing is
    /// rolled back.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        // A pending bootstrap fetch for an older token must not wipe the new one.
        self.wait_ready().await;

        let response: LoginResponse = match self
            .inner
            .api
            .post_form(LOGIN_PATH, &[("username", username), ("password", password)])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, username, "Login failed");
                return false;
            }
        };

        self.set_token(&response.access_token);
        info!(username, "Login successful");
        self.fetch_user().await;
        true
    }

    /// Purely local; the backend is not told.
    pub fn logout(&self) {
        info!("Logging out");
        self.clear_token();
    }

    /// Load the current principal. A failure means the session cannot be
    /// confirmed and clears it.
    pub async fn fetch_user(&self) {
        match self.inner.api.get_json::<UserProfile>(ME_PATH).await {
            Ok(user) => {
                debug!(username = user.display_name(), "Fetched user profile");
                self.state().user = Some(user);
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch user");
                self.clear_token();
            }
        }
    }
}
