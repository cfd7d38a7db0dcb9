use tokio::sync::watch;

use crate::scoring::domain::{CreditLineId, CreditLineSummary, ScoringConfig};

/// Everything the panel shows for one page load: the selector rows, which
/// line is active, and the editable configuration draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelDraft {
    pub lines: Vec<CreditLineSummary>,
    pub selected_line: Option<CreditLineId>,
    pub config: ScoringConfig,
}

/// Holder for the panel draft. One store per panel instance, nothing is
/// process-global, so two open panels never share edits.
///
/// Readers either take a `snapshot` or `subscribe` and re-render when the
/// draft changes. Every write goes through `update`; `send_modify` wakes
/// subscribers even when the closure stores an identical value.
pub struct DraftStore {
    draft: watch::Sender<PanelDraft>,
}

impl DraftStore {
    pub fn new() -> Self {
        let (draft, _) = watch::channel(PanelDraft::default());
        Self { draft }
    }

    pub fn snapshot(&self) -> PanelDraft {
        self.draft.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelDraft> {
        self.draft.subscribe()
    }

    pub fn update(&self, apply: impl FnOnce(&mut PanelDraft)) {
        self.draft.send_modify(apply);
    }

    pub fn set_lines(&self, lines: Vec<CreditLineSummary>) {
        self.update(|draft| draft.lines = lines);
    }

    /// Installs a freshly fetched configuration, replacing the whole draft
    /// for that line. Unsaved edits to the previous line are dropped.
    pub fn install_config(&self, line: CreditLineId, config: ScoringConfig) {
        self.update(|draft| {
            draft.selected_line = Some(line);
            draft.config = config;
        });
    }
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}
