//! Light/dark preference shared by every page.
//!
//! The preference lives in two places: a key-value store (the pages use
//! browser storage, the console uses a file) and a mirrored cookie.
//! Resolution reads the store first, falls back to the cookie, and
//! defaults to light.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::warn;

pub const STORAGE_KEY: &str = "theme";
pub const COOKIE_MAX_AGE_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Elements that flip the theme when clicked. Pages register any subset;
/// the click router treats them all the same.
pub const TOGGLE_SELECTORS: [&str; 10] = [
    ".theme-toggle-public",
    ".theme-toggle-result",
    ".theme-toggle-login",
    "#theme-toggle",
    "#theme-toggle-nav",
    "#toggleThemeBtn",
    "#toggleTheme",
    ".theme-toggle",
    ".mobile-nav-theme-toggle",
    "[data-action=\"toggle-theme\"]",
];

pub fn is_toggle_trigger(selector: &str) -> bool {
    TOGGLE_SELECTORS.contains(&selector)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub const fn background(self) -> &'static str {
        match self {
            ThemeMode::Light => "#f8f9fa",
            ThemeMode::Dark => "#0f0f23",
        }
    }

    pub const fn text(self) -> &'static str {
        match self {
            ThemeMode::Light => "#1a202c",
            ThemeMode::Dark => "#f7fafc",
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cookie mirroring the stored preference, one-year expiry.
pub fn theme_cookie(mode: ThemeMode) -> String {
    format!(
        "{STORAGE_KEY}={};path=/;SameSite=Lax;max-age={COOKIE_MAX_AGE_SECONDS}",
        mode.as_str()
    )
}

/// Picks the theme out of a `Cookie` request header.
pub fn theme_from_cookies(header: &str) -> Option<ThemeMode> {
    header.split(';').find_map(|pair| {
        pair.trim_start()
            .strip_prefix("theme=")
            .and_then(ThemeMode::parse)
    })
}

#[derive(Debug, thiserror::Error)]
#[error("preference store unavailable: {0}")]
pub struct PreferenceError(pub String);

/// Key-value persistence behind the theme. Loading from an unavailable
/// backend yields `None` and the caller falls through to the cookie;
/// failed saves are logged and ignored, the cookie still carries the
/// value.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// In-memory store, enough for tests and for pages without persistence.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| PreferenceError("lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Theme with the colors and cookie to apply alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTheme {
    pub mode: ThemeMode,
    pub background: &'static str,
    pub text: &'static str,
    pub cookie: String,
}

/// Resolves the stored preference: store first, cookie second, light
/// as the final default. An unparseable value in either place is treated
/// as absent.
pub fn stored_theme(preferences: &dyn PreferenceStore, cookie_header: Option<&str>) -> ThemeMode {
    if let Some(mode) = preferences
        .load(STORAGE_KEY)
        .and_then(|raw| ThemeMode::parse(&raw))
    {
        return mode;
    }
    if let Some(mode) = cookie_header.and_then(theme_from_cookies) {
        return mode;
    }
    ThemeMode::default()
}

/// Owns the applied theme for one page load. Appliers persist and publish;
/// chrome that needs to restyle subscribes to the watch channel.
pub struct ThemeManager {
    preferences: Arc<dyn PreferenceStore>,
    applied: watch::Sender<ThemeMode>,
}

impl ThemeManager {
    pub fn new(preferences: Arc<dyn PreferenceStore>, cookie_header: Option<&str>) -> Self {
        let initial = stored_theme(preferences.as_ref(), cookie_header);
        let (applied, _) = watch::channel(initial);
        Self {
            preferences,
            applied,
        }
    }

    pub fn current(&self) -> ThemeMode {
        *self.applied.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.applied.subscribe()
    }

    /// Persists and publishes a theme, returning what the page applies.
    pub fn apply(&self, mode: ThemeMode) -> AppliedTheme {
        if let Err(err) = self.preferences.save(STORAGE_KEY, mode.as_str()) {
            warn!("theme preference not persisted: {err}");
        }
        self.applied.send_replace(mode);
        AppliedTheme {
            mode,
            background: mode.background(),
            text: mode.text(),
            cookie: theme_cookie(mode),
        }
    }

    pub fn toggle(&self) -> AppliedTheme {
        self.apply(self.current().opposite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_prefers_the_store_over_the_cookie() {
        let preferences = MemoryPreferences::default();
        preferences
            .save(STORAGE_KEY, "dark")
            .expect("memory store accepts writes");

        let mode = stored_theme(&preferences, Some("session=abc; theme=light"));
        assert_eq!(mode, ThemeMode::Dark);
    }

    #[test]
    fn resolution_falls_back_to_cookie_then_default() {
        let preferences = MemoryPreferences::default();

        assert_eq!(
            stored_theme(&preferences, Some("a=1; theme=dark; b=2")),
            ThemeMode::Dark
        );
        assert_eq!(stored_theme(&preferences, Some("a=1")), ThemeMode::Light);
        assert_eq!(stored_theme(&preferences, None), ThemeMode::Light);

        // A garbage stored value is skipped, not trusted.
        preferences
            .save(STORAGE_KEY, "sepia")
            .expect("memory store accepts writes");
        assert_eq!(
            stored_theme(&preferences, Some("theme=dark")),
            ThemeMode::Dark
        );
    }

    #[test]
    fn cookie_carries_path_samesite_and_expiry() {
        assert_eq!(
            theme_cookie(ThemeMode::Dark),
            "theme=dark;path=/;SameSite=Lax;max-age=31536000"
        );
    }

    #[test]
    fn toggle_flips_persists_and_publishes() {
        let preferences = Arc::new(MemoryPreferences::default());
        let manager = ThemeManager::new(Arc::clone(&preferences) as Arc<dyn PreferenceStore>, None);
        let mut seen = manager.subscribe();

        let applied = manager.toggle();

        assert_eq!(applied.mode, ThemeMode::Dark);
        assert_eq!(applied.background, "#0f0f23");
        assert_eq!(applied.text, "#f7fafc");
        assert_eq!(preferences.load(STORAGE_KEY).as_deref(), Some("dark"));
        assert!(seen.has_changed().expect("theme channel open"));

        assert_eq!(manager.toggle().mode, ThemeMode::Light);
    }

    #[test]
    fn every_registered_trigger_toggles() {
        for selector in TOGGLE_SELECTORS {
            assert!(is_toggle_trigger(selector));
        }
        assert!(!is_toggle_trigger(".btn-primary"));
    }
}
