//! Page-level runtime shared across the site: theme switching, session
//! watch and the logout fast path.
//!
//! One [`SiteRuntime`] lives per page load. Clicks are routed centrally
//! so the logout link always wins over anything else it might overlap
//! with, and so every theme trigger behaves identically.

pub mod session;
pub mod theme;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

pub use session::{is_protected_route, RedirectSink, SessionMonitor, PUBLIC_ROUTES};
pub use theme::{
    is_toggle_trigger, stored_theme, theme_cookie, theme_from_cookies, AppliedTheme,
    MemoryPreferences, PreferenceError, PreferenceStore, ThemeManager, ThemeMode,
    TOGGLE_SELECTORS,
};

/// What a routed click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Logout started (or was already underway); navigation is cancelled
    /// either way.
    LogoutStarted,
    ThemeToggled(AppliedTheme),
    Ignored,
}

pub struct SiteRuntime {
    theme: ThemeManager,
    redirect: Arc<dyn RedirectSink>,
    monitor: Mutex<Option<JoinHandle<()>>>,
    logging_out: AtomicBool,
}

impl SiteRuntime {
    pub fn new(theme: ThemeManager, redirect: Arc<dyn RedirectSink>) -> Self {
        Self {
            theme,
            redirect,
            monitor: Mutex::new(None),
            logging_out: AtomicBool::new(false),
        }
    }

    pub fn theme(&self) -> &ThemeManager {
        &self.theme
    }

    /// True once logout has begun; page chrome freezes transitions and
    /// hides itself while the redirect lands.
    pub fn is_logging_out(&self) -> bool {
        self.logging_out.load(Ordering::SeqCst)
    }

    /// Starts the session watch for this page load.
    pub fn watch_session(&self, monitor: SessionMonitor) {
        let handle = monitor.spawn();
        if let Ok(mut slot) = self.monitor.lock() {
            *slot = handle;
        }
    }

    /// Routes one click. Logout links take priority over theme triggers;
    /// anything else is left alone.
    pub fn handle_click(&self, href: Option<&str>, selector: &str) -> ClickOutcome {
        if href == Some("/logout") {
            self.force_logout();
            return ClickOutcome::LogoutStarted;
        }
        if is_toggle_trigger(selector) {
            return ClickOutcome::ThemeToggled(self.theme.toggle());
        }
        ClickOutcome::Ignored
    }

    /// Tears the page down for logout: stops the session watch and
    /// redirects. Only the first call does anything.
    pub fn force_logout(&self) -> bool {
        if self.logging_out.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Ok(mut slot) = self.monitor.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        self.redirect.redirect("/logout");
        true
    }
}
