//! Host-side implementations of the gateway hooks.
//!
//! The TUI shows notifications in the status bar for a few seconds and
//! performs hard redirects on the next tick of the main loop. CLI commands
//! print to stderr instead.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use opsdeck_core::api::{Navigator, Notifier};

/// How long a notification stays on screen.
const NOTICE_DURATION: Duration = Duration::from_secs(3);

struct Notice {
    message: String,
    shown_at: Instant,
}

/// Latest error notification, expiring after `NOTICE_DURATION`.
#[derive(Default)]
pub struct Notifications {
    latest: Mutex<Option<Notice>>,
}

impl Notifications {
    pub fn current(&self) -> Option<String> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest
            .as_ref()
            .filter(|n| n.shown_at.elapsed() < NOTICE_DURATION)
            .map(|n| n.message.clone())
    }
}

impl Notifier for Notifications {
    fn error(&self, message: &str) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(Notice {
            message: message.to_string(),
            shown_at: Instant::now(),
        });
    }
}

/// Hard redirect requested by the gateway, applied by the main loop.
#[derive(Default)]
pub struct RedirectSignal {
    pending: Mutex<Option<String>>,
}

impl RedirectSignal {
    pub fn take(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Navigator for RedirectSignal {
    fn hard_redirect(&self, path: &str) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.to_string());
    }
}

/// Notifier for one-shot CLI commands.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

/// Navigator for one-shot CLI commands; there is no screen to reset.
pub struct StderrNavigator;

impl Navigator for StderrNavigator {
    fn hard_redirect(&self, _path: &str) {
        eprintln!("Session expired. Run `opsdeck login` to sign in again.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_is_shown() {
        let notifications = Notifications::default();
        assert_eq!(notifications.current(), None);
        notifications.error("Request failed");
        assert_eq!(notifications.current().as_deref(), Some("Request failed"));
        notifications.error("Server not found");
        assert_eq!(notifications.current().as_deref(), Some("Server not found"));
    }

    #[test]
    fn test_notification_expires() {
        let notifications = Notifications::default();
        *notifications.latest.lock().unwrap() = Some(Notice {
            message: "old".to_string(),
            shown_at: Instant::now() - NOTICE_DURATION - Duration::from_millis(1),
        });
        assert_eq!(notifications.current(), None);
    }

    #[test]
    fn test_redirect_is_taken_once() {
        let signal = RedirectSignal::default();
        assert_eq!(signal.take(), None);
        signal.hard_redirect("/login");
        assert_eq!(signal.take().as_deref(), Some("/login"));
        assert_eq!(signal.take(), None);
    }
}
