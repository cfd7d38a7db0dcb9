use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::panel::mutators::ConfirmationPrompt;
use crate::panel::notify::{NoticeLevel, NotificationSink};
use crate::panel::store::DraftStore;
use crate::scoring::defaults::{
    panel_default_criteria, panel_default_tiers, server_default_factors,
};
use crate::scoring::domain::{CreditLineId, ScoringConfig};

pub(super) struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub(super) fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn last(&self) -> Option<(NoticeLevel, String)> {
        self.notices().last().cloned()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push((level, message.to_string()));
    }
}

/// Prompt that dismisses every dialog.
pub(super) struct DeclineAll;

impl ConfirmationPrompt for DeclineAll {
    fn request(&self, _question: &str) -> oneshot::Receiver<bool> {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(false);
        receiver
    }
}

/// Prompt that records each question and approves it.
pub(super) struct RecordingPrompt {
    questions: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub(super) fn new() -> Self {
        Self {
            questions: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn questions(&self) -> Vec<String> {
        self.questions.lock().expect("prompt mutex poisoned").clone()
    }
}

impl ConfirmationPrompt for RecordingPrompt {
    fn request(&self, question: &str) -> oneshot::Receiver<bool> {
        self.questions
            .lock()
            .expect("prompt mutex poisoned")
            .push(question.to_string());
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(true);
        receiver
    }
}

/// Store preloaded with the stock catalogs for line 1, as if the panel
/// had just fetched a configured line.
pub(super) fn seeded_store() -> DraftStore {
    let store = DraftStore::new();
    let config = ScoringConfig {
        risk_tiers: panel_default_tiers(),
        rejection_factors: server_default_factors("Crédito Personal"),
        criteria: panel_default_criteria(),
        ..ScoringConfig::default()
    };
    store.install_config(CreditLineId(1), config);
    store
}
