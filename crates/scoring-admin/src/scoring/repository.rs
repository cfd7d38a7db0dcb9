use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    CreditLineId, CreditLineSummary, Criterion, GeneralConfig, RejectionFactor, RiskTier,
    ScoringConfig,
};

/// Stored credit line together with its scoring configuration, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLineRecord {
    pub id: CreditLineId,
    pub name: String,
    pub description: String,
    pub base_annual_rate: f64,
    pub active: bool,
    pub config: Option<ScoringConfig>,
}

impl CreditLineRecord {
    /// Selector-list projection. Threshold fields fall back to the stock
    /// values when the line has no general configuration yet, and a line
    /// counts as configured once it has at least one tier.
    pub fn summary(&self) -> CreditLineSummary {
        let general = self.config.as_ref().map(|c| &c.general);
        let tier_count = self
            .config
            .as_ref()
            .map(|c| c.risk_tiers.len())
            .unwrap_or(0);
        let factor_count = self
            .config
            .as_ref()
            .map(|c| c.rejection_factors.len())
            .unwrap_or(0);

        CreditLineSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            active: self.active,
            min_approval_score: general.map(|g| g.min_approval_score).unwrap_or(17.0),
            min_bureau_score: general.map(|g| g.min_bureau_score).unwrap_or(400.0),
            tier_count,
            factor_count,
            has_config: tier_count > 0,
        }
    }
}

/// Request payload for registering a new credit line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCreditLine {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_annual_rate: f64,
}

/// Storage abstraction so the service and router can be exercised against
/// memory-backed fakes.
pub trait ScoringRepository: Send + Sync {
    fn line_summaries(&self) -> Result<Vec<CreditLineSummary>, RepositoryError>;
    fn register_line(&self, line: NewCreditLine) -> Result<CreditLineRecord, RepositoryError>;
    fn fetch_line(&self, id: CreditLineId) -> Result<Option<CreditLineRecord>, RepositoryError>;
    fn store_general(&self, id: CreditLineId, general: GeneralConfig)
        -> Result<(), RepositoryError>;
    fn store_tiers(&self, id: CreditLineId, tiers: Vec<RiskTier>) -> Result<(), RepositoryError>;
    fn store_factors(
        &self,
        id: CreditLineId,
        factors: Vec<RejectionFactor>,
    ) -> Result<(), RepositoryError>;
    fn store_criteria(
        &self,
        id: CreditLineId,
        criteria: Vec<Criterion>,
    ) -> Result<(), RepositoryError>;
    /// Overwrites the destination's general config, tiers, and factors with
    /// the source's; criteria only when `include_criteria`.
    fn copy_config(
        &self,
        source: CreditLineId,
        destination: CreditLineId,
        include_criteria: bool,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound audit hook. The API server traces these; tests capture them.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: ConfigChangeEvent) -> Result<(), AuditError>;
}

/// One persisted change, for the configuration audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigChangeEvent {
    pub line_id: CreditLineId,
    pub section: ConfigSection,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl ConfigChangeEvent {
    pub fn now(line_id: CreditLineId, section: ConfigSection, detail: impl Into<String>) -> Self {
        Self {
            line_id,
            section,
            detail: detail.into(),
            at: Utc::now(),
        }
    }
}

/// Configuration slice a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSection {
    General,
    RiskTiers,
    RejectionFactors,
    Criteria,
    Copy,
    Seed,
}

impl ConfigSection {
    pub const fn label(self) -> &'static str {
        match self {
            ConfigSection::General => "config_general",
            ConfigSection::RiskTiers => "niveles_riesgo",
            ConfigSection::RejectionFactors => "factores_rechazo",
            ConfigSection::Criteria => "criterios",
            ConfigSection::Copy => "copiar_config",
            ConfigSection::Seed => "config_defecto",
        }
    }
}

/// Audit dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}
