//! Save, load, and copy flows.
//!
//! Each save serializes exactly the slice it owns and reports through the
//! notification sink; nothing retries on its own, the operator saves again
//! by hand. The combined approval save submits the general thresholds and
//! the rejection factors back to back and only claims success when both
//! responses do.

use std::sync::Arc;

use crate::scoring::domain::CreditLineId;
use crate::scoring::validation::check_weight_sum;

use super::client::{ApiError, ScoringApiClient};
use super::notify::{NoticeLevel, NotificationSink};
use super::selection::SelectionController;
use super::store::DraftStore;

/// The panel's network-facing half: owns the client, the draft store, and
/// the selection ordering. Mutators edit the store directly; everything
/// that talks to the API goes through here.
pub struct PanelActions<N> {
    client: Arc<ScoringApiClient>,
    store: Arc<DraftStore>,
    selection: SelectionController,
    notifier: Arc<N>,
}

impl<N> PanelActions<N>
where
    N: NotificationSink,
{
    pub fn new(client: Arc<ScoringApiClient>, store: Arc<DraftStore>, notifier: Arc<N>) -> Self {
        Self {
            client,
            store,
            selection: SelectionController::new(),
            notifier,
        }
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    /// Loads the selector rows and selects the first line when one exists.
    pub async fn load_lines(&self) -> bool {
        match self.client.lines().await {
            Ok(lines) => {
                let first = lines.first().map(|line| line.id);
                self.store.set_lines(lines);
                match first {
                    Some(line) => self.select_line(line).await,
                    None => true,
                }
            }
            Err(ApiError::Api(_)) => {
                self.notify(NoticeLevel::Danger, "Error al cargar líneas de crédito");
                false
            }
            Err(_) => {
                self.notify(NoticeLevel::Danger, "Error de conexión");
                false
            }
        }
    }

    /// Fetches a line's configuration and installs it, replacing the draft
    /// wholesale. Unsaved edits are dropped without asking. A response
    /// that lost the race to a newer selection is discarded, and so are
    /// its errors.
    pub async fn select_line(&self, line: CreditLineId) -> bool {
        let generation = self.selection.begin();
        match self.client.fetch_config(line).await {
            Ok(config) => self
                .selection
                .install_if_current(generation, &self.store, line, config),
            Err(error) => {
                if self.selection.is_current(generation) {
                    match error {
                        ApiError::Api(message) => self.notify(
                            NoticeLevel::Danger,
                            &format!("Error al cargar configuración: {message}"),
                        ),
                        _ => self.notify(NoticeLevel::Danger, "Error de conexión"),
                    }
                }
                false
            }
        }
    }

    /// Refetches the selected line, discarding local edits.
    pub async fn refresh(&self) -> bool {
        match self.store.snapshot().selected_line {
            Some(line) => self.select_line(line).await,
            None => false,
        }
    }

    pub async fn save_tiers(&self) -> bool {
        let Some(line) = self.require_selection() else {
            return false;
        };
        let tiers = self.store.snapshot().config.risk_tiers;
        let result = self.client.save_tiers(line, &tiers).await;
        self.report(result, "Niveles de riesgo guardados exitosamente")
    }

    pub async fn save_factors(&self) -> bool {
        let Some(line) = self.require_selection() else {
            return false;
        };
        let factors = self.store.snapshot().config.rejection_factors;
        let result = self.client.save_factors(line, &factors).await;
        self.report(result, "Factores de rechazo guardados exitosamente")
    }

    /// Saves the criteria after the client-side weight gate. An unbalanced
    /// sum blocks the submission but leaves every edit in place.
    pub async fn save_criteria(&self) -> bool {
        let Some(line) = self.require_selection() else {
            return false;
        };
        let criteria = self.store.snapshot().config.criteria;
        if let Err(gate) = check_weight_sum(&criteria) {
            self.notify(NoticeLevel::Danger, &gate.to_string());
            return false;
        }
        let result = self.client.save_criteria(line, &criteria).await;
        self.report(result, "Criterios guardados exitosamente")
    }

    /// Combined approval save: general thresholds first, then rejection
    /// factors. The factors are submitted even when the thresholds come
    /// back with an application error; only a transport failure on the
    /// first request stops the second from going out.
    pub async fn save_approval(&self) -> bool {
        let Some(line) = self.require_selection() else {
            return false;
        };
        let config = self.store.snapshot().config;

        let general_result = self.client.save_general(line, &config.general).await;
        if matches!(general_result, Err(ApiError::Transport(_))) {
            self.notify(NoticeLevel::Danger, "Error de conexión");
            return false;
        }
        let factors_result = self
            .client
            .save_factors(line, &config.rejection_factors)
            .await;

        if general_result.is_ok() && factors_result.is_ok() {
            self.notify(
                NoticeLevel::Success,
                "Configuración de aprobación guardada exitosamente",
            );
            return true;
        }

        let message = match (&general_result, &factors_result) {
            (Err(ApiError::Api(error)), _) | (_, Err(ApiError::Api(error))) => {
                format!("Error: {error}")
            }
            _ => "Error de conexión".to_string(),
        };
        self.notify(NoticeLevel::Danger, &message);
        false
    }

    /// Copies another line's configuration onto the selected one, then
    /// refetches the destination so the draft shows what was written.
    pub async fn copy_config(&self, source: CreditLineId, include_criteria: bool) -> bool {
        let Some(destination) = self.store.snapshot().selected_line else {
            self.notify(NoticeLevel::Warning, "Seleccione las líneas");
            return false;
        };

        match self
            .client
            .copy_config(source, destination, include_criteria)
            .await
        {
            Ok(()) => {
                self.notify(NoticeLevel::Success, "Configuración copiada exitosamente");
                self.select_line(destination).await
            }
            Err(ApiError::Api(message)) => {
                self.notify(NoticeLevel::Danger, &format!("Error: {message}"));
                false
            }
            Err(_) => {
                self.notify(NoticeLevel::Danger, "Error de conexión");
                false
            }
        }
    }

    fn require_selection(&self) -> Option<CreditLineId> {
        let line = self.store.snapshot().selected_line;
        if line.is_none() {
            self.notify(NoticeLevel::Warning, "No hay línea seleccionada");
        }
        line
    }

    fn report(&self, result: Result<(), ApiError>, success_message: &str) -> bool {
        match result {
            Ok(()) => {
                self.notify(NoticeLevel::Success, success_message);
                true
            }
            Err(ApiError::Api(message)) => {
                self.notify(NoticeLevel::Danger, &format!("Error: {message}"));
                false
            }
            Err(_) => {
                self.notify(NoticeLevel::Danger, "Error de conexión");
                false
            }
        }
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notifier.notify(level, message);
    }
}
