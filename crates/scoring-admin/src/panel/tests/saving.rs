use std::sync::Arc;

use super::common::{seeded_store, RecordingNotifier};
use crate::panel::actions::PanelActions;
use crate::panel::client::ScoringApiClient;
use crate::panel::mutators::{update_criterion, CriterionField};
use crate::panel::notify::NoticeLevel;
use crate::panel::store::DraftStore;
use crate::scoring::domain::CreditLineId;

/// Actions wired to a port nothing listens on. The gating tests return
/// before any request is sent; the transport test relies on the refused
/// connection.
fn offline_actions(
    store: DraftStore,
) -> (PanelActions<RecordingNotifier>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let actions = PanelActions::new(
        Arc::new(ScoringApiClient::new("http://127.0.0.1:9")),
        Arc::new(store),
        Arc::clone(&notifier),
    );
    (actions, notifier)
}

#[tokio::test]
async fn saves_require_a_selected_line() {
    let (actions, notifier) = offline_actions(DraftStore::new());

    assert!(!actions.save_tiers().await);

    let (level, message) = notifier.last().expect("a warning was recorded");
    assert_eq!(level, NoticeLevel::Warning);
    assert_eq!(message, "No hay línea seleccionada");
}

#[tokio::test]
async fn unbalanced_weights_block_the_criteria_save() {
    let (actions, notifier) = offline_actions(seeded_store());
    update_criterion(actions.store(), 0, CriterionField::Weight, "15");

    assert!(!actions.save_criteria().await);

    let (level, message) = notifier.last().expect("a notice was recorded");
    assert_eq!(level, NoticeLevel::Danger);
    assert_eq!(
        message,
        "Los pesos deben sumar 100%. Actualmente suman 105.0%"
    );
    // The draft keeps the rejected edit for the operator to fix.
    assert_eq!(actions.store().snapshot().config.criteria[0].weight, 15.0);
}

#[tokio::test]
async fn copy_without_a_selection_asks_for_lines() {
    let (actions, notifier) = offline_actions(DraftStore::new());

    assert!(!actions.copy_config(CreditLineId(2), true).await);

    let (level, message) = notifier.last().expect("a warning was recorded");
    assert_eq!(level, NoticeLevel::Warning);
    assert_eq!(message, "Seleccione las líneas");
}

#[tokio::test]
async fn transport_failures_surface_the_connection_notice() {
    let (actions, notifier) = offline_actions(seeded_store());

    assert!(!actions.save_tiers().await);

    let (level, message) = notifier.last().expect("a notice was recorded");
    assert_eq!(level, NoticeLevel::Danger);
    assert_eq!(message, "Error de conexión");
}
