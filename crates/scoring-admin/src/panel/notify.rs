use tracing::{info, warn};

/// Severity of a panel notification, mirroring the four alert styles the
/// page can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl NoticeLevel {
    pub const fn label(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Danger => "danger",
        }
    }
}

/// Where panel notifications go. The page shows dismissible alerts; tests
/// record them; headless runs log them.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Sink that forwards notifications to the log stream.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Warning | NoticeLevel::Danger => {
                warn!(level = level.label(), "{message}");
            }
            NoticeLevel::Info | NoticeLevel::Success => {
                info!(level = level.label(), "{message}");
            }
        }
    }
}
