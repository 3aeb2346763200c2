//! Static route table and the authentication guard in front of it.
//!
//! There is one public screen (login) and a shell layout whose children are
//! all protected. Authorization is binary: a route either needs an
//! authenticated session or it is the login screen.

use thiserror::Error;
use tracing::debug;

use crate::auth::SessionStore;

/// Navigable screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Servers,
    Scripts,
    Tasks,
    Alerts,
    Users,
}

/// Where a route is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Rendered on its own
    Public,
    /// Rendered inside the main shell with the navigation tabs
    Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub route: Route,
    pub layout: Layout,
}

impl RouteEntry {
    pub fn requires_auth(&self) -> bool {
        self.route != Route::Login
    }
}

/// The shell mounts at `/` and forwards there.
pub const SHELL_PATH: &str = "/";
pub const SHELL_REDIRECT: Route = Route::Dashboard;

pub const ROUTES: &[RouteEntry] = &[
    RouteEntry { path: "/login", route: Route::Login, layout: Layout::Public },
    RouteEntry { path: "/dashboard", route: Route::Dashboard, layout: Layout::Shell },
    RouteEntry { path: "/servers", route: Route::Servers, layout: Layout::Shell },
    RouteEntry { path: "/scripts", route: Route::Scripts, layout: Layout::Shell },
    RouteEntry { path: "/tasks", route: Route::Tasks, layout: Layout::Shell },
    RouteEntry { path: "/alerts", route: Route::Alerts, layout: Layout::Shell },
    RouteEntry { path: "/users", route: Route::Users, layout: Layout::Shell },
];

impl Route {
    fn entry(&self) -> &'static RouteEntry {
        ROUTES
            .iter()
            .find(|e| e.route == *self)
            .unwrap_or(&ROUTES[0])
    }

    pub fn path(&self) -> &'static str {
        self.entry().path
    }

    pub fn layout(&self) -> Layout {
        self.entry().layout
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Servers => "Servers",
            Route::Scripts => "Scripts",
            Route::Tasks => "Tasks",
            Route::Alerts => "Alerts",
            Route::Users => "Users",
        }
    }

    /// Routes shown as tabs in the shell, in display order.
    pub fn shell_routes() -> impl Iterator<Item = Route> {
        ROUTES
            .iter()
            .filter(|e| e.layout == Layout::Shell)
            .map(|e| e.route)
    }

    /// Resolve a path. `/` forwards to the shell's default child; a single
    /// trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        if path == SHELL_PATH || path.is_empty() {
            return Some(SHELL_REDIRECT);
        }
        let path = path.strip_suffix('/').unwrap_or(path);
        ROUTES.iter().find(|e| e.path == path).map(|e| e.route)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// The session predicate the guard consults.
pub trait AuthState {
    fn is_authenticated(&self) -> bool;
}

impl AuthState for SessionStore {
    fn is_authenticated(&self) -> bool {
        SessionStore::is_authenticated(self)
    }
}

/// Outcome of the pre-navigation hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

/// Global pre-navigation hook. `target` is `None` for paths that match no
/// route, which are guarded like any protected screen.
pub fn guard(target: Option<Route>, auth: &impl AuthState) -> Navigation {
    let authenticated = auth.is_authenticated();
    match target {
        Some(Route::Login) if authenticated => Navigation::Redirect(Route::Dashboard),
        Some(Route::Login) => Navigation::Proceed,
        _ if !authenticated => Navigation::Redirect(Route::Login),
        _ => Navigation::Proceed,
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouterError {
    #[error("No route matches {0}")]
    NoMatch(String),
}

/// Current location plus history, guarded by an injected session context.
pub struct Router<A: AuthState> {
    auth: A,
    current: Route,
    history: Vec<Route>,
}

impl<A: AuthState> Router<A> {
    /// Start on the login screen; callers push the initial path.
    pub fn new(auth: A) -> Self {
        Self {
            auth,
            current: Route::Login,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Swap the session context, e.g. after a hard reload.
    pub fn set_auth(&mut self, auth: A) {
        self.auth = auth;
    }

    /// Navigate to `path` through the guard, following its redirect.
    /// Returns the route actually committed.
    ///
    /// The guard only ever redirects to a route it admits in the same
    /// session state, so a single hop settles every navigation.
    pub fn push(&mut self, path: &str) -> Result<Route, RouterError> {
        let target = Route::from_path(path);
        let route = match guard(target, &self.auth) {
            Navigation::Proceed => target.ok_or_else(|| RouterError::NoMatch(path.to_string()))?,
            Navigation::Redirect(to) => {
                debug!(from = path, to = %to, "Navigation redirected");
                to
            }
        };
        if route != self.current {
            self.history.push(self.current);
            self.current = route;
        }
        Ok(route)
    }

    pub fn navigate(&mut self, route: Route) -> Result<Route, RouterError> {
        self.push(route.path())
    }

    /// Go back one step, still through the guard. Returns `None` when there
    /// is no history.
    pub fn back(&mut self) -> Option<Result<Route, RouterError>> {
        let previous = self.history.pop()?;
        let depth = self.history.len();
        let result = self.push(previous.path());
        // The step we just took is not history
        if self.history.len() > depth {
            self.history.pop();
        }
        Some(result)
    }

    /// Full reset to `route`, bypassing the guard and dropping history.
    pub fn hard_redirect(&mut self, route: Route) {
        debug!(to = %route, "Hard redirect");
        self.current = route;
        self.history.clear();
    }
}
