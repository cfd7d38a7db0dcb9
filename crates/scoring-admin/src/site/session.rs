//! Background session watch for authenticated pages.
//!
//! Public routes never poll. Protected ones probe the session endpoint on
//! a slow cadence and bounce the visitor to the login page once the server
//! answers 401 or 403. Transport errors do not count as an expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::info;

use crate::panel::client::ScoringApiClient;

/// Paths that work without a session.
pub const PUBLIC_ROUTES: [&str; 4] = ["/", "/calcular", "/login", "/logout"];

const INITIAL_DELAY: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_secs(300);

pub fn is_protected_route(path: &str) -> bool {
    !PUBLIC_ROUTES.contains(&path)
}

/// Navigation seam. Pages replace the location, the console just logs.
pub trait RedirectSink: Send + Sync {
    fn redirect(&self, location: &str);
}

/// Polls the session endpoint for one page load.
pub struct SessionMonitor {
    client: Arc<ScoringApiClient>,
    redirect: Arc<dyn RedirectSink>,
    path: String,
    initial_delay: Duration,
    interval: Duration,
}

impl SessionMonitor {
    pub fn new(
        client: Arc<ScoringApiClient>,
        redirect: Arc<dyn RedirectSink>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            redirect,
            path: path.into(),
            initial_delay: INITIAL_DELAY,
            interval: POLL_INTERVAL,
        }
    }

    /// Shrinks the cadence; tests use millisecond timings.
    pub fn with_timings(mut self, initial_delay: Duration, interval: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.interval = interval;
        self
    }

    /// Starts the watch, or does nothing on a public route. The first
    /// probe lands one full interval after the initial delay.
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        if !is_protected_route(&self.path) {
            return None;
        }
        Some(tokio::spawn(async move {
            time::sleep(self.initial_delay).await;
            let mut ticker = time::interval(self.interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match self.client.session_expired().await {
                    Ok(true) => {
                        info!(path = %self.path, "session expired, returning to login");
                        self.redirect.redirect("/login");
                        break;
                    }
                    Ok(false) => {}
                    // Network errors stay quiet.
                    Err(_) => {}
                }
            }
        }))
    }
}
