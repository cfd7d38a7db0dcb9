//! Browser-side admin panel for per-line scoring configuration.
//!
//! The panel is a thin client over the scoring API. A draft store holds
//! one line's fetched configuration, mutators edit it in place, renderers
//! build whole section views from it, and the actions submit one slice at
//! a time. Selection is ordered by a generation counter so a slow fetch
//! can never clobber a newer one.

pub mod actions;
pub mod client;
pub mod mutators;
pub mod notify;
pub mod render;
pub mod selection;
pub mod store;

#[cfg(test)]
mod tests;

pub use actions::PanelActions;
pub use client::{ApiError, CsrfTokenSources, ScoringApiClient};
pub use mutators::{
    AutoConfirm, ConfirmationPrompt, CriterionField, FactorField, GeneralField, RangeField,
    TierField,
};
pub use notify::{NoticeLevel, NotificationSink, TracingNotifier};
pub use render::{approval_section, criteria_section, line_selector, tier_section};
pub use selection::SelectionController;
pub use store::{DraftStore, PanelDraft};
