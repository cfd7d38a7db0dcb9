//! In-place edits to the configuration draft.
//!
//! Every function here touches the draft and nothing else; persisting is a
//! separate step. Numeric fields coerce raw input, and a garbled value
//! lands in the draft as NaN instead of being rejected. Removals go
//! through a non-blocking confirmation prompt and the warnings the page
//! shows for guarded edits come out of the notification sink.

use chrono::Utc;
use tokio::sync::oneshot;

use crate::scoring::defaults::{
    new_criterion_template, new_factor_template, new_tier_template, panel_default_criteria,
    panel_default_tiers,
};
use crate::scoring::domain::{ComparisonOp, CriterionFieldType, ScoreRange};
use crate::scoring::rates::monthly_nominal_rate;
use crate::scoring::validation::check_tier_removal;

use super::notify::{NoticeLevel, NotificationSink};
use super::store::DraftStore;

/// Seam for the "are you sure" dialogs shown before destructive edits.
/// The receiver resolves to `false` when the dialog is dismissed; dropping
/// the sender counts as a dismissal.
pub trait ConfirmationPrompt: Send + Sync {
    fn request(&self, question: &str) -> oneshot::Receiver<bool>;
}

/// Prompt that approves everything immediately.
#[derive(Debug, Default)]
pub struct AutoConfirm;

impl ConfirmationPrompt for AutoConfirm {
    fn request(&self, _question: &str) -> oneshot::Receiver<bool> {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(true);
        receiver
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralField {
    MinApprovalScore,
    ManualReviewScore,
    TelcoArrearsCeiling,
    MinAge,
    MaxAge,
    MaxDti,
    MinBureauScore,
    MaxRecentInquiries,
    ScoreScale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierField {
    Name,
    Code,
    ScoreMin,
    ScoreMax,
    AnnualEffectiveRate,
    MonthlyNominalRate,
    GuaranteeFee,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorField {
    CriterionKey,
    Label,
    Operator,
    Threshold,
    Message,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionField {
    Name,
    Description,
    Weight,
    FieldType,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Min,
    Max,
    Points,
    Description,
}

pub fn update_general(store: &DraftStore, field: GeneralField, raw: &str) {
    let value = coerce_number(raw);
    store.update(|draft| {
        let general = &mut draft.config.general;
        match field {
            GeneralField::MinApprovalScore => general.min_approval_score = value,
            GeneralField::ManualReviewScore => general.manual_review_score = value,
            GeneralField::TelcoArrearsCeiling => general.telco_arrears_ceiling = value,
            GeneralField::MinAge => general.min_age = value,
            GeneralField::MaxAge => general.max_age = value,
            GeneralField::MaxDti => general.max_dti = value,
            GeneralField::MinBureauScore => general.min_bureau_score = value,
            GeneralField::MaxRecentInquiries => general.max_recent_inquiries = value,
            GeneralField::ScoreScale => general.score_scale = value,
        }
    });
}

pub fn update_tier(store: &DraftStore, index: usize, field: TierField, raw: &str) {
    store.update(|draft| {
        let Some(tier) = draft.config.risk_tiers.get_mut(index) else {
            return;
        };
        match field {
            TierField::Name => tier.name = raw.to_string(),
            TierField::Code => tier.code = raw.to_string(),
            TierField::ScoreMin => tier.score_min = coerce_number(raw),
            TierField::ScoreMax => tier.score_max = coerce_number(raw),
            TierField::AnnualEffectiveRate => {
                // The monthly rate always tracks the annual rate, the page
                // shows it as a read-only derived field.
                tier.annual_effective_rate = coerce_number(raw);
                tier.monthly_nominal_rate = monthly_nominal_rate(tier.annual_effective_rate);
            }
            TierField::MonthlyNominalRate => tier.monthly_nominal_rate = coerce_number(raw),
            TierField::GuaranteeFee => tier.guarantee_fee = coerce_number(raw),
            TierField::Color => tier.color = raw.to_string(),
        }
    });
}

pub fn add_tier(store: &DraftStore, notifier: &dyn NotificationSink) {
    store.update(|draft| {
        let position = draft.config.risk_tiers.len();
        draft.config.risk_tiers.push(new_tier_template(position));
    });
    notifier.notify(
        NoticeLevel::Info,
        "Nuevo nivel agregado. No olvide guardar los cambios.",
    );
}

/// Removes a tier after confirmation. Refuses to drop the last one so a
/// line always keeps at least one score band.
pub async fn remove_tier(
    store: &DraftStore,
    prompt: &dyn ConfirmationPrompt,
    notifier: &dyn NotificationSink,
    index: usize,
) -> bool {
    let tiers = store.snapshot().config.risk_tiers;
    if let Err(rule) = check_tier_removal(tiers.len()) {
        notifier.notify(NoticeLevel::Warning, &rule.to_string());
        return false;
    }
    let Some(tier) = tiers.get(index) else {
        return false;
    };

    let question = format!("¿Está seguro de eliminar el nivel \"{}\"?", tier.name);
    if !confirmed(prompt, &question).await {
        return false;
    }

    let mut removed = false;
    store.update(|draft| {
        let tiers = &mut draft.config.risk_tiers;
        if tiers.len() > 1 && index < tiers.len() {
            tiers.remove(index);
            removed = true;
        }
    });
    if removed {
        notifier.notify(
            NoticeLevel::Info,
            "Nivel eliminado. No olvide guardar los cambios.",
        );
    }
    removed
}

pub fn install_default_tiers(store: &DraftStore, notifier: &dyn NotificationSink) {
    store.update(|draft| draft.config.risk_tiers = panel_default_tiers());
    notifier.notify(
        NoticeLevel::Info,
        "Niveles por defecto creados. Recuerde guardar los cambios.",
    );
}

pub fn update_factor(store: &DraftStore, index: usize, field: FactorField, raw: &str) {
    store.update(|draft| {
        let Some(factor) = draft.config.rejection_factors.get_mut(index) else {
            return;
        };
        match field {
            FactorField::CriterionKey => factor.criterion_key = raw.to_string(),
            FactorField::Label => factor.label = raw.to_string(),
            FactorField::Operator => {
                // An unknown symbol leaves the previous operator in place.
                if let Some(operator) = ComparisonOp::parse(raw) {
                    factor.operator = operator;
                }
            }
            FactorField::Threshold => factor.threshold = coerce_number(raw),
            FactorField::Message => factor.message = raw.to_string(),
            FactorField::Active => factor.active = coerce_flag(raw),
        }
    });
}

pub fn add_factor(store: &DraftStore) {
    store.update(|draft| draft.config.rejection_factors.push(new_factor_template()));
}

pub async fn remove_factor(
    store: &DraftStore,
    prompt: &dyn ConfirmationPrompt,
    index: usize,
) -> bool {
    if index >= store.snapshot().config.rejection_factors.len() {
        return false;
    }
    if !confirmed(prompt, "¿Está seguro de eliminar este factor de rechazo?").await {
        return false;
    }

    let mut removed = false;
    store.update(|draft| {
        if index < draft.config.rejection_factors.len() {
            draft.config.rejection_factors.remove(index);
            removed = true;
        }
    });
    removed
}

pub fn update_criterion(store: &DraftStore, index: usize, field: CriterionField, raw: &str) {
    store.update(|draft| {
        let Some(criterion) = draft.config.criteria.get_mut(index) else {
            return;
        };
        match field {
            CriterionField::Name => criterion.name = raw.to_string(),
            CriterionField::Description => criterion.description = raw.to_string(),
            CriterionField::Weight => criterion.weight = coerce_number(raw),
            CriterionField::FieldType => {
                if let Some(field_type) = CriterionFieldType::parse(raw) {
                    criterion.field_type = field_type;
                }
            }
            CriterionField::Active => criterion.active = coerce_flag(raw),
        }
    });
}

pub fn add_criterion(store: &DraftStore, notifier: &dyn NotificationSink) {
    let stamp = Utc::now().timestamp_millis();
    store.update(|draft| {
        let position = draft.config.criteria.len();
        draft
            .config
            .criteria
            .push(new_criterion_template(position, stamp));
    });
    notifier.notify(
        NoticeLevel::Info,
        "Criterio agregado. Recuerde guardar los cambios.",
    );
}

pub async fn remove_criterion(
    store: &DraftStore,
    prompt: &dyn ConfirmationPrompt,
    notifier: &dyn NotificationSink,
    index: usize,
) -> bool {
    let Some(criterion) = store.snapshot().config.criteria.get(index).cloned() else {
        return false;
    };

    let question = format!("¿Está seguro de eliminar el criterio \"{}\"?", criterion.name);
    if !confirmed(prompt, &question).await {
        return false;
    }

    let mut removed = false;
    store.update(|draft| {
        if index < draft.config.criteria.len() {
            draft.config.criteria.remove(index);
            removed = true;
        }
    });
    if removed {
        notifier.notify(
            NoticeLevel::Info,
            "Criterio eliminado. Recuerde guardar los cambios.",
        );
    }
    removed
}

pub fn install_default_criteria(store: &DraftStore, notifier: &dyn NotificationSink) {
    store.update(|draft| draft.config.criteria = panel_default_criteria());
    notifier.notify(
        NoticeLevel::Success,
        "Criterios por defecto creados. Recuerde guardar los cambios.",
    );
}

pub fn add_range(store: &DraftStore, criterion_index: usize) {
    store.update(|draft| {
        let Some(criterion) = draft.config.criteria.get_mut(criterion_index) else {
            return;
        };
        criterion.ranges.push(ScoreRange {
            min: 0.0,
            max: 100.0,
            points: 10.0,
            description: "Nuevo rango".to_string(),
        });
    });
}

pub fn update_range(
    store: &DraftStore,
    criterion_index: usize,
    range_index: usize,
    field: RangeField,
    raw: &str,
) {
    store.update(|draft| {
        let Some(range) = draft
            .config
            .criteria
            .get_mut(criterion_index)
            .and_then(|criterion| criterion.ranges.get_mut(range_index))
        else {
            return;
        };
        match field {
            RangeField::Min => range.min = coerce_number(raw),
            RangeField::Max => range.max = coerce_number(raw),
            RangeField::Points => range.points = coerce_number(raw),
            RangeField::Description => range.description = raw.to_string(),
        }
    });
}

pub async fn remove_range(
    store: &DraftStore,
    prompt: &dyn ConfirmationPrompt,
    criterion_index: usize,
    range_index: usize,
) -> bool {
    if !confirmed(prompt, "¿Está seguro de eliminar este rango?").await {
        return false;
    }

    let mut removed = false;
    store.update(|draft| {
        let Some(criterion) = draft.config.criteria.get_mut(criterion_index) else {
            return;
        };
        if range_index < criterion.ranges.len() {
            criterion.ranges.remove(range_index);
            removed = true;
        }
    });
    removed
}

async fn confirmed(prompt: &dyn ConfirmationPrompt, question: &str) -> bool {
    prompt.request(question).await.unwrap_or(false)
}

fn coerce_number(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

fn coerce_flag(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1" | "on")
}
