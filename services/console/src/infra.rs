use metrics_exporter_prometheus::PrometheusHandle;
use rand::Rng;
use scoring_admin::error::AppError;
use scoring_admin::panel::{NoticeLevel, NotificationSink};
use scoring_admin::scoring::{
    AuditError, AuditSink, ConfigChangeEvent, CreditLineId, CreditLineRecord, CreditLineSummary,
    Criterion, GeneralConfig, NewCreditLine, RejectionFactor, RepositoryError, RiskTier,
    ScoringAdminService, ScoringConfig, ScoringRepository,
};
use scoring_admin::site::{PreferenceError, PreferenceStore};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-lifetime line store. Survives until the server stops, which is
/// enough for demos and manual API exploration.
#[derive(Default, Clone)]
pub(crate) struct InMemoryScoringRepository {
    lines: Arc<Mutex<Vec<CreditLineRecord>>>,
}

impl ScoringRepository for InMemoryScoringRepository {
    fn line_summaries(&self) -> Result<Vec<CreditLineSummary>, RepositoryError> {
        let guard = self.lines.lock().expect("repository mutex poisoned");
        Ok(guard.iter().map(CreditLineRecord::summary).collect())
    }

    fn register_line(&self, line: NewCreditLine) -> Result<CreditLineRecord, RepositoryError> {
        let mut guard = self.lines.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.name == line.name) {
            return Err(RepositoryError::Conflict);
        }

        let record = CreditLineRecord {
            id: CreditLineId(guard.len() as i64 + 1),
            name: line.name,
            description: line.description,
            base_annual_rate: line.base_annual_rate,
            active: true,
            config: None,
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch_line(&self, id: CreditLineId) -> Result<Option<CreditLineRecord>, RepositoryError> {
        let guard = self.lines.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| record.id == id).cloned())
    }

    fn store_general(&self, id: CreditLineId, general: GeneralConfig) -> Result<(), RepositoryError> {
        let mut guard = self.lines.lock().expect("repository mutex poisoned");
        let record = find_line(&mut guard, id)?;
        record.config.get_or_insert_with(ScoringConfig::default).general = general;
        Ok(())
    }

    fn store_tiers(&self, id: CreditLineId, tiers: Vec<RiskTier>) -> Result<(), RepositoryError> {
        let mut guard = self.lines.lock().expect("repository mutex poisoned");
        let record = find_line(&mut guard, id)?;
        record.config.get_or_insert_with(ScoringConfig::default).risk_tiers = tiers;
        Ok(())
    }

    fn store_factors(
        &self,
        id: CreditLineId,
        factors: Vec<RejectionFactor>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lines.lock().expect("repository mutex poisoned");
        let record = find_line(&mut guard, id)?;
        record
            .config
            .get_or_insert_with(ScoringConfig::default)
            .rejection_factors = factors;
        Ok(())
    }

    fn store_criteria(
        &self,
        id: CreditLineId,
        criteria: Vec<Criterion>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lines.lock().expect("repository mutex poisoned");
        let record = find_line(&mut guard, id)?;
        record.config.get_or_insert_with(ScoringConfig::default).criteria = criteria;
        Ok(())
    }

    fn copy_config(
        &self,
        source: CreditLineId,
        destination: CreditLineId,
        include_criteria: bool,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lines.lock().expect("repository mutex poisoned");
        let source_config = guard
            .iter()
            .find(|record| record.id == source)
            .ok_or(RepositoryError::NotFound)?
            .config
            .clone();

        let target = find_line(&mut guard, destination)?;
        let target_config = target.config.get_or_insert_with(ScoringConfig::default);
        match source_config {
            Some(source_config) => {
                target_config.general = source_config.general;
                target_config.risk_tiers = source_config.risk_tiers;
                target_config.rejection_factors = source_config.rejection_factors;
                if include_criteria {
                    target_config.criteria = source_config.criteria;
                }
            }
            None => {
                target_config.risk_tiers.clear();
                target_config.rejection_factors.clear();
                if include_criteria {
                    target_config.criteria.clear();
                }
            }
        }
        Ok(())
    }
}

fn find_line(
    guard: &mut [CreditLineRecord],
    id: CreditLineId,
) -> Result<&mut CreditLineRecord, RepositoryError> {
    guard
        .iter_mut()
        .find(|record| record.id == id)
        .ok_or(RepositoryError::NotFound)
}

/// Audit sink for the long-running server: every persisted change lands in
/// the log stream.
pub(crate) struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: ConfigChangeEvent) -> Result<(), AuditError> {
        info!(
            line_id = event.line_id.0,
            section = event.section.label(),
            detail = %event.detail,
            "configuration change recorded"
        );
        Ok(())
    }
}

/// Audit sink for CLI demos, replayed as a trail once the run finishes.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditTrail {
    events: Arc<Mutex<Vec<ConfigChangeEvent>>>,
}

impl InMemoryAuditTrail {
    pub(crate) fn events(&self) -> Vec<ConfigChangeEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for InMemoryAuditTrail {
    fn record(&self, event: ConfigChangeEvent) -> Result<(), AuditError> {
        let mut guard = self.events.lock().expect("audit mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

/// Panel notifications rendered as terminal lines instead of page alerts.
pub(crate) struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        println!("[{}] {message}", level.label());
    }
}

/// Preference store backed by a `key=value` file next to the binary, so the
/// theme subcommand remembers its answer between invocations.
pub(crate) struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self, key: &str) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let prefix = format!("{key}=");
        contents
            .lines()
            .find_map(|line| line.strip_prefix(&prefix).map(str::to_string))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let prefix = format!("{key}=");
        let mut lines: Vec<String> = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents
                .lines()
                .filter(|line| !line.starts_with(&prefix))
                .map(str::to_string)
                .collect(),
            Err(_) => Vec::new(),
        };
        lines.push(format!("{key}={value}"));
        std::fs::write(&self.path, lines.join("\n") + "\n")
            .map_err(|err| PreferenceError(err.to_string()))
    }
}

/// Per-boot token the panel must echo on mutating requests.
pub(crate) fn csrf_token() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}

/// Registers the starter credit lines the server boots with. Registration
/// seeds each line's stock configuration, so the API is browsable
/// immediately.
pub(crate) fn seed_demo_lines<R, A>(service: &ScoringAdminService<R, A>) -> Result<(), AppError>
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    for (name, description, base_annual_rate) in [
        ("Crédito Personal", "Crédito de libre inversión", 26.0),
        ("Microcrédito", "Capital de trabajo para microempresarios", 30.0),
        ("Crédito Educativo", "Financiación de matrículas y estudios", 22.0),
    ] {
        service.register_line(NewCreditLine {
            name: name.to_string(),
            description: description.to_string(),
            base_annual_rate,
        })?;
    }
    Ok(())
}
