//! Section views built from the draft.
//!
//! Renderers are pure: hand them a slice of the draft and they return the
//! complete view for that section. Nothing here remembers a previous
//! render; subscribers rebuild whole sections whenever the store notifies
//! them, which is what keeps derived fields (the monthly rate column, the
//! color swatch, the weight-sum badge) in step with edits.

use serde::Serialize;

use crate::scoring::domain::{
    ComparisonOp, CreditLineId, CreditLineSummary, Criterion, GeneralConfig, RejectionFactor,
    RiskTier,
};
use crate::scoring::rates::round_to;
use crate::scoring::validation::{displayed_weight_sum, weight_sum, WEIGHT_SUM_TARGET};

#[derive(Debug, Clone, Serialize)]
pub struct LineOptionView {
    pub id: CreditLineId,
    pub name: String,
    pub description: String,
    pub tier_count: usize,
    pub factor_count: usize,
    pub has_config: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineSelectorView {
    pub options: Vec<LineOptionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_line: Option<CreditLineId>,
}

pub fn line_selector(
    lines: &[CreditLineSummary],
    selected: Option<CreditLineId>,
) -> LineSelectorView {
    let options = lines
        .iter()
        .map(|line| LineOptionView {
            id: line.id,
            name: line.name.clone(),
            description: line.description.clone(),
            tier_count: line.tier_count,
            factor_count: line.factor_count,
            has_config: line.has_config,
            selected: selected == Some(line.id),
        })
        .collect();

    LineSelectorView {
        options,
        selected_line: selected,
    }
}

/// One tier card. The guarantee fee is stored as a fraction but edited and
/// shown as a percentage at two decimals.
#[derive(Debug, Clone, Serialize)]
pub struct TierRowView {
    pub name: String,
    pub code: String,
    pub score_min: f64,
    pub score_max: f64,
    pub annual_effective_rate: f64,
    pub monthly_nominal_rate: f64,
    pub guarantee_fee_pct: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierSectionView {
    pub count: usize,
    pub rows: Vec<TierRowView>,
}

pub fn tier_section(tiers: &[RiskTier]) -> TierSectionView {
    let rows = tiers
        .iter()
        .map(|tier| TierRowView {
            name: tier.name.clone(),
            code: tier.code.clone(),
            score_min: tier.score_min,
            score_max: tier.score_max,
            annual_effective_rate: tier.annual_effective_rate,
            monthly_nominal_rate: tier.monthly_nominal_rate,
            guarantee_fee_pct: round_to(tier.guarantee_fee * 100.0, 2),
            color: tier.color.clone(),
        })
        .collect();

    TierSectionView {
        count: tiers.len(),
        rows,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorOptionView {
    pub symbol: &'static str,
    pub description: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactorRowView {
    pub display_name: String,
    pub criterion_key: String,
    pub operators: Vec<OperatorOptionView>,
    pub threshold: f64,
    pub message: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneralThresholdsView {
    pub min_approval_score: f64,
    pub manual_review_score: f64,
    pub telco_arrears_ceiling: f64,
    pub min_age: f64,
    pub max_age: f64,
    pub max_dti: f64,
    pub min_bureau_score: f64,
    pub max_recent_inquiries: f64,
    pub score_scale: f64,
}

/// Approval tab: the general thresholds form plus the rejection-factor
/// table, saved together by the combined save.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalSectionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
    pub thresholds: GeneralThresholdsView,
    pub factor_count: usize,
    pub factors: Vec<FactorRowView>,
}

pub fn approval_section(
    general: &GeneralConfig,
    factors: &[RejectionFactor],
) -> ApprovalSectionView {
    let rows = factors
        .iter()
        .map(|factor| {
            let display_name = if factor.label.is_empty() {
                factor.criterion_key.clone()
            } else {
                factor.label.clone()
            };
            let operators = ComparisonOp::all()
                .into_iter()
                .map(|operator| OperatorOptionView {
                    symbol: operator.symbol(),
                    description: operator.description(),
                    selected: operator == factor.operator,
                })
                .collect();
            FactorRowView {
                display_name,
                criterion_key: factor.criterion_key.clone(),
                operators,
                threshold: factor.threshold,
                message: factor.message.clone(),
                active: factor.active,
            }
        })
        .collect();

    ApprovalSectionView {
        line_name: general.line_name.clone(),
        thresholds: GeneralThresholdsView {
            min_approval_score: general.min_approval_score,
            manual_review_score: general.manual_review_score,
            telco_arrears_ceiling: general.telco_arrears_ceiling,
            min_age: general.min_age,
            max_age: general.max_age,
            max_dti: general.max_dti,
            min_bureau_score: general.min_bureau_score,
            max_recent_inquiries: general.max_recent_inquiries,
            score_scale: general.score_scale,
        },
        factor_count: factors.len(),
        factors: rows,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeRowView {
    pub min: f64,
    pub max: f64,
    pub points: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriterionCardView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub weight: f64,
    pub field_type_label: &'static str,
    pub active: bool,
    pub range_count: usize,
    pub ranges: Vec<RangeRowView>,
}

/// Criteria tab with the weight-sum badge. The badge only turns green on
/// an exact 100; the save gate is looser and allows the 0.1 tolerance.
#[derive(Debug, Clone, Serialize)]
pub struct CriteriaSectionView {
    pub count: usize,
    pub weight_sum: f64,
    pub weights_balanced: bool,
    pub cards: Vec<CriterionCardView>,
}

pub fn criteria_section(criteria: &[Criterion]) -> CriteriaSectionView {
    let cards = criteria
        .iter()
        .map(|criterion| CriterionCardView {
            code: criterion.code.clone(),
            name: criterion.name.clone(),
            description: criterion.description.clone(),
            weight: criterion.weight,
            field_type_label: criterion.field_type.label(),
            active: criterion.active,
            range_count: criterion.ranges.len(),
            ranges: criterion
                .ranges
                .iter()
                .map(|range| RangeRowView {
                    min: range.min,
                    max: range.max,
                    points: range.points,
                    description: range.description.clone(),
                })
                .collect(),
        })
        .collect();

    CriteriaSectionView {
        count: criteria.len(),
        weight_sum: displayed_weight_sum(criteria),
        weights_balanced: weight_sum(criteria) == WEIGHT_SUM_TARGET,
        cards,
    }
}
