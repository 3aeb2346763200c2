//! Application state for the opsdeck terminal client.
//!
//! `App` owns the session, the router guarding every screen change, the
//! login form, and the host hooks the gateway reports through.

use std::sync::Arc;

use anyhow::Result;
use opsdeck_core::auth::{token_store_for, TokenStore};
use opsdeck_core::router::{Layout, SHELL_PATH};
use opsdeck_core::{ApiClient, Config, Route, Router, SessionStore};
use tracing::{debug, info, warn};

use crate::host::{Notifications, RedirectSignal};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Environment variables pre-filling the login form
const USERNAME_ENV: &str = "OPSDECK_USERNAME";
const PASSWORD_ENV: &str = "OPSDECK_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Overlay state on top of the current route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub router: Router<SessionStore>,
    pub notifications: Arc<Notifications>,
    redirects: Arc<RedirectSignal>,
    storage: Arc<dyn TokenStore>,

    pub state: AppState,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
}

impl App {
    /// Restore the session and run the initial navigation to `/`.
    pub fn new(config: Config) -> Result<Self> {
        let storage = token_store_for(&config)?;
        Self::with_storage(config, storage)
    }

    /// Like `new`, with the durable token slot supplied by the caller.
    pub fn with_storage(config: Config, storage: Arc<dyn TokenStore>) -> Result<Self> {
        let notifications = Arc::new(Notifications::default());
        let redirects = Arc::new(RedirectSignal::default());
        let api = ApiClient::new(&config, storage.clone(), notifications.clone(), redirects.clone())?;
        debug!(base_url = api.base_url(), "API client configured");

        let session = SessionStore::restore(api, storage.clone());
        let mut router = Router::new(session.clone());
        router.push(SHELL_PATH)?;

        let login_username = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var(PASSWORD_ENV).unwrap_or_default();
        let login_focus = if login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };

        Ok(Self {
            config,
            session,
            router,
            notifications,
            redirects,
            storage,
            state: AppState::Normal,
            login_username,
            login_password,
            login_focus,
            login_error: None,
        })
    }

    pub fn current_route(&self) -> Route {
        self.router.current()
    }

    pub fn on_login_screen(&self) -> bool {
        self.current_route().layout() == Layout::Public
    }

    /// Navigate through the guard; unknown paths are reported, not fatal.
    pub fn navigate(&mut self, path: &str) {
        if let Err(e) = self.router.push(path) {
            warn!(error = %e, "Navigation failed");
        }
    }

    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    pub fn prev_tab(&mut self) {
        self.step_tab(-1);
    }

    fn step_tab(&mut self, step: isize) {
        let tabs: Vec<Route> = Route::shell_routes().collect();
        let current = tabs
            .iter()
            .position(|r| *r == self.current_route())
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = tabs[((current + step).rem_euclid(len)) as usize];
        self.navigate(next.path());
    }

    /// Jump to the n-th shell tab (1-based).
    pub fn select_tab(&mut self, index: usize) {
        if let Some(route) = Route::shell_routes().nth(index.saturating_sub(1)) {
            self.navigate(route.path());
        }
    }

    pub fn go_back(&mut self) {
        match self.router.back() {
            Some(Err(e)) => warn!(error = %e, "Back navigation failed"),
            Some(Ok(_)) | None => {}
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let username = self.login_username.trim().to_string();
        if username.is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;
        let accepted = self.session.login(&username, &self.login_password).await;
        if accepted && self.session.is_authenticated() {
            self.login_password.clear();
            self.config.last_username = Some(username);
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
            self.navigate(SHELL_PATH);
        } else {
            self.login_error = Some(
                self.notifications
                    .current()
                    .unwrap_or_else(|| "Login failed".to_string()),
            );
        }
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.navigate(Route::Login.path());
    }

    pub async fn refresh_user(&mut self) {
        self.session.fetch_user().await;
    }

    // =========================================================================
    // Main loop hooks
    // =========================================================================

    /// Apply a pending hard redirect from the gateway, if any.
    pub fn tick(&mut self) {
        if let Some(path) = self.redirects.take() {
            self.hard_reload(&path);
        }
    }

    /// Equivalent of a full page load at `path`: the session is rebuilt from
    /// durable storage and the route replaced without consulting the guard.
    fn hard_reload(&mut self, path: &str) {
        info!(path, "Session expired, reloading");
        self.session = SessionStore::restore(self.session.api().clone(), self.storage.clone());
        self.router.set_auth(self.session.clone());
        self.router
            .hard_redirect(Route::from_path(path).unwrap_or(Route::Login));
        self.state = AppState::Normal;
        self.login_password.clear();
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
