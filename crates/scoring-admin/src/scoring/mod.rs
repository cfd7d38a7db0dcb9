//! Credit line scoring administration: the data model the panel edits, the
//! persistence and audit seams, and the HTTP surface that serves them.
//!
//! Each credit line carries one scoring configuration with four sections:
//! general approval thresholds, risk tiers (the rate sheet), rejection
//! factors, and weighted evaluation criteria. Sections are always saved
//! whole, so the stored state matches whatever the panel last submitted.

pub mod defaults;
pub mod domain;
pub mod export;
pub mod rates;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ComparisonOp, CreditLineId, CreditLineSummary, Criterion, CriterionFieldType, GeneralConfig,
    RejectionFactor, RiskTier, ScoreRange, ScoringConfig,
};
pub use export::{ScoringConfigExportError, ScoringConfigExporter};
pub use rates::monthly_nominal_rate;
pub use repository::{
    AuditError, AuditSink, ConfigChangeEvent, ConfigSection, CreditLineRecord, NewCreditLine,
    RepositoryError, ScoringRepository,
};
pub use router::{scoring_router, ScoringApiState, SessionIdentity};
pub use service::{ScoringAdminService, ScoringServiceError};
pub use validation::{
    check_tier_list, check_tier_removal, check_weight_sum, displayed_weight_sum, weight_sum,
    LastTierError, WeightSumError, WEIGHT_SUM_TARGET, WEIGHT_SUM_TOLERANCE,
};
