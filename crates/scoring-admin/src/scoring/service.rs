use std::cmp::Ordering;
use std::sync::Arc;

use tracing::info;

use super::defaults;
use super::domain::{
    CreditLineId, CreditLineSummary, Criterion, GeneralConfig, RejectionFactor, RiskTier,
    ScoringConfig,
};
use super::repository::{
    AuditError, AuditSink, ConfigChangeEvent, ConfigSection, CreditLineRecord, NewCreditLine,
    RepositoryError, ScoringRepository,
};
use super::validation::{check_tier_list, LastTierError};

/// Service composing the repository and the audit sink. All persistence
/// semantics live here: section saves replace the whole section, tier saves
/// fill positional defaults, and fetches assemble the view the panel edits.
pub struct ScoringAdminService<R, A> {
    repository: Arc<R>,
    audit: Arc<A>,
}

impl<R, A> ScoringAdminService<R, A>
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    pub fn new(repository: Arc<R>, audit: Arc<A>) -> Self {
        Self { repository, audit }
    }

    /// Selector list for the panel, ordered by line name.
    pub fn lines(&self) -> Result<Vec<CreditLineSummary>, ScoringServiceError> {
        let mut summaries = self.repository.line_summaries()?;
        summaries.retain(|line| line.active);
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    /// Registers a line and seeds its default configuration: stock general
    /// thresholds, three tiers derived from the line's base annual rate,
    /// and the stock rejection factors. Criteria stay unconfigured so the
    /// catalog view applies until the first save.
    pub fn register_line(
        &self,
        line: NewCreditLine,
    ) -> Result<CreditLineRecord, ScoringServiceError> {
        let record = self.repository.register_line(line)?;

        self.repository
            .store_general(record.id, defaults::server_default_general())?;
        self.repository.store_tiers(
            record.id,
            defaults::server_default_tiers(record.base_annual_rate),
        )?;
        self.repository
            .store_factors(record.id, defaults::server_default_factors(&record.name))?;

        self.record_change(record.id, ConfigSection::Seed, record.name.clone())?;

        self.repository
            .fetch_line(record.id)?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    /// Full configuration view for one line: active tiers ordered for
    /// display, active factors, and the criteria catalog when the line has
    /// never saved criteria of its own.
    pub fn fetch_config(&self, id: CreditLineId) -> Result<ScoringConfig, ScoringServiceError> {
        let record = self
            .repository
            .fetch_line(id)?
            .ok_or(RepositoryError::NotFound)?;

        let mut config = record.config.unwrap_or_default();
        config.line_id = Some(id);
        config.general.line_name = Some(record.name);

        config.risk_tiers.retain(|tier| tier.active);
        config.risk_tiers.sort_by(compare_tiers);

        config.rejection_factors.retain(|factor| factor.active);
        config
            .rejection_factors
            .sort_by_key(|factor| factor.order.unwrap_or(0));

        if config.criteria.is_empty() {
            config.criteria = defaults::master_criteria_catalog();
        }

        Ok(config)
    }

    /// Replaces the line's approval thresholds.
    pub fn save_general(
        &self,
        id: CreditLineId,
        mut general: GeneralConfig,
    ) -> Result<(), ScoringServiceError> {
        general.line_name = None;
        self.repository.store_general(id, general)?;
        self.record_change(id, ConfigSection::General, "umbrales actualizados")
    }

    /// Replaces the line's tier list. Missing names, codes, and orders are
    /// filled positionally; rates are stored exactly as submitted.
    pub fn save_tiers(
        &self,
        id: CreditLineId,
        mut tiers: Vec<RiskTier>,
    ) -> Result<(), ScoringServiceError> {
        check_tier_list(tiers.len())?;

        for (i, tier) in tiers.iter_mut().enumerate() {
            if tier.name.is_empty() {
                tier.name = format!("Nivel {}", i + 1);
            }
            if tier.code.is_empty() {
                tier.code = format!("N{}", i + 1);
            }
            if tier.order.is_none() {
                tier.order = Some(i as i64);
            }
            tier.active = true;
        }

        let count = tiers.len();
        self.repository.store_tiers(id, tiers)?;
        self.record_change(id, ConfigSection::RiskTiers, format!("{count} niveles"))
    }

    /// Replaces the line's rejection factors.
    pub fn save_factors(
        &self,
        id: CreditLineId,
        mut factors: Vec<RejectionFactor>,
    ) -> Result<(), ScoringServiceError> {
        for (i, factor) in factors.iter_mut().enumerate() {
            if factor.order.is_none() {
                factor.order = Some(i as i64);
            }
        }

        let count = factors.len();
        self.repository.store_factors(id, factors)?;
        self.record_change(
            id,
            ConfigSection::RejectionFactors,
            format!("{count} factores"),
        )
    }

    /// Replaces the line's criteria. Weight balance is the panel's gate;
    /// the stored list is whatever the caller submitted.
    pub fn save_criteria(
        &self,
        id: CreditLineId,
        criteria: Vec<Criterion>,
    ) -> Result<(), ScoringServiceError> {
        let count = criteria.len();
        self.repository.store_criteria(id, criteria)?;
        self.record_change(id, ConfigSection::Criteria, format!("{count} criterios"))
    }

    /// Copies one line's configuration onto another. Criteria come along
    /// only when `include_criteria`; otherwise the destination keeps its
    /// own.
    pub fn copy_config(
        &self,
        source: CreditLineId,
        destination: CreditLineId,
        include_criteria: bool,
    ) -> Result<(), ScoringServiceError> {
        self.repository
            .copy_config(source, destination, include_criteria)?;
        self.record_change(
            destination,
            ConfigSection::Copy,
            format!("desde línea {source}, criterios: {include_criteria}"),
        )
    }

    fn record_change(
        &self,
        line_id: CreditLineId,
        section: ConfigSection,
        detail: impl Into<String>,
    ) -> Result<(), ScoringServiceError> {
        let event = ConfigChangeEvent::now(line_id, section, detail);
        info!(line = %event.line_id, section = event.section.label(), detail = %event.detail, "scoring config change");
        self.audit.record(event)?;
        Ok(())
    }
}

fn compare_tiers(a: &RiskTier, b: &RiskTier) -> Ordering {
    let by_order = a.order.unwrap_or(0).cmp(&b.order.unwrap_or(0));
    by_order.then_with(|| {
        b.score_min
            .partial_cmp(&a.score_min)
            .unwrap_or(Ordering::Equal)
    })
}

/// Error raised by the admin service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    TierRule(#[from] LastTierError),
}
