use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::scoring::domain::{
    ComparisonOp, CreditLineId, CreditLineSummary, Criterion, CriterionFieldType, GeneralConfig,
    RejectionFactor, RiskTier, ScoringConfig,
};
use crate::scoring::repository::{
    AuditError, AuditSink, ConfigChangeEvent, CreditLineRecord, NewCreditLine, RepositoryError,
    ScoringRepository,
};
use crate::scoring::router::{scoring_router, ScoringApiState, SessionIdentity};
use crate::scoring::service::ScoringAdminService;

pub(super) const TEST_CSRF: &str = "test-csrf-token";

pub(super) fn new_line(name: &str, base_annual_rate: f64) -> NewCreditLine {
    NewCreditLine {
        name: name.to_string(),
        description: format!("Línea {name}"),
        base_annual_rate,
    }
}

pub(super) fn session_identity() -> SessionIdentity {
    SessionIdentity {
        username: "laura".to_string(),
        role: "gerencia".to_string(),
        full_name: "Laura Pérez".to_string(),
    }
}

pub(super) fn build_service() -> (
    ScoringAdminService<MemoryRepository, MemoryAudit>,
    Arc<MemoryRepository>,
    Arc<MemoryAudit>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = ScoringAdminService::new(repository.clone(), audit.clone());
    (service, repository, audit)
}

pub(super) fn tier(name: &str, code: &str, score_min: f64, score_max: f64) -> RiskTier {
    RiskTier {
        id: None,
        name: name.to_string(),
        code: code.to_string(),
        score_min,
        score_max,
        annual_effective_rate: 24.0,
        monthly_nominal_rate: 1.8088,
        guarantee_fee: 0.10,
        color: "#ffc107".to_string(),
        order: None,
        active: true,
    }
}

pub(super) fn factor(key: &str, threshold: f64) -> RejectionFactor {
    RejectionFactor {
        id: None,
        criterion_key: key.to_string(),
        label: format!("Factor {key}"),
        operator: ComparisonOp::Greater,
        threshold,
        message: format!("Rechazado por {key}"),
        active: true,
        order: None,
    }
}

pub(super) fn criterion(code: &str, weight: f64) -> Criterion {
    Criterion {
        code: code.to_string(),
        name: format!("Criterio {code}"),
        description: String::new(),
        weight,
        field_type: CriterionFieldType::Numeric,
        ranges: Vec::new(),
        active: true,
        order: None,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) lines: Arc<Mutex<Vec<CreditLineRecord>>>,
}

impl ScoringRepository for MemoryRepository {
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

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    events: Arc<Mutex<Vec<ConfigChangeEvent>>>,
}

impl MemoryAudit {
    pub(super) fn events(&self) -> Vec<ConfigChangeEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, event: ConfigChangeEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .expect("audit mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl ScoringRepository for UnavailableRepository {
    fn line_summaries(&self) -> Result<Vec<CreditLineSummary>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn register_line(&self, _line: NewCreditLine) -> Result<CreditLineRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_line(&self, _id: CreditLineId) -> Result<Option<CreditLineRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_general(
        &self,
        _id: CreditLineId,
        _general: GeneralConfig,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_tiers(&self, _id: CreditLineId, _tiers: Vec<RiskTier>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_factors(
        &self,
        _id: CreditLineId,
        _factors: Vec<RejectionFactor>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn store_criteria(
        &self,
        _id: CreditLineId,
        _criteria: Vec<Criterion>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn copy_config(
        &self,
        _source: CreditLineId,
        _destination: CreditLineId,
        _include_criteria: bool,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn scoring_router_with_service(
    service: ScoringAdminService<MemoryRepository, MemoryAudit>,
) -> axum::Router {
    scoring_router(Arc::new(ScoringApiState {
        service,
        csrf_token: TEST_CSRF.to_string(),
        session: Some(session_identity()),
    }))
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
