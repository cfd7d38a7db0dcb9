use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::scoring::domain::{CreditLineId, ScoringConfig};

use super::store::DraftStore;

/// Orders line-selection requests so only the newest one may touch the
/// draft. Each fetch takes a generation ticket up front; by the time its
/// response arrives, a later click may have taken a newer ticket, and the
/// stale response is dropped instead of overwriting the draft.
#[derive(Debug, Default)]
pub struct SelectionController {
    generation: AtomicU64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    /// Claims a generation ticket for a selection that is about to fetch.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Installs a fetched configuration unless a newer selection has
    /// started since `generation` was claimed. Returns whether the draft
    /// was replaced.
    pub fn install_if_current(
        &self,
        generation: u64,
        store: &DraftStore,
        line: CreditLineId,
        config: ScoringConfig,
    ) -> bool {
        if !self.is_current(generation) {
            info!(%line, generation, "discarding stale configuration response");
            return false;
        }
        store.install_config(line, config);
        true
    }
}
