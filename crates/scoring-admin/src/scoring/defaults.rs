//! Stock configuration catalogs.
//!
//! Two families live here. The `panel_*` and `new_*` functions are what the
//! admin panel offers when a section is empty or a row is added by hand.
//! The `server_*` functions are what the service seeds when a credit line
//! is registered; their score bands and guarantee fees differ from the
//! panel catalog on purpose (the seeded bands follow the underwriting
//! sheet, the panel catalog follows the older three-band layout).

use super::domain::{
    ComparisonOp, Criterion, CriterionFieldType, GeneralConfig, RejectionFactor, RiskTier,
    ScoreRange,
};
use super::rates::monthly_nominal_rate;

const NEW_TIER_NAMES: [&str; 4] = ["Bajo Riesgo", "Moderado", "Alto Riesgo", "Muy Alto Riesgo"];
const NEW_TIER_COLORS: [&str; 5] = ["#28a745", "#ffc107", "#fd7e14", "#dc3545", "#6c757d"];

/// Three-band tier catalog the panel installs when a fetched line has no
/// tiers and the operator asks for defaults.
pub fn panel_default_tiers() -> Vec<RiskTier> {
    vec![
        tier("Bajo riesgo", "BAJO", 70.1, 100.0, 22.0, 1.67, 0.05, "#2ECC40", 1),
        tier("Riesgo moderado", "MODERADO", 40.1, 70.0, 24.0, 1.81, 0.1, "#FFDC00", 2),
        tier("Alto riesgo", "ALTO", 0.0, 40.0, 30.0, 2.21, 0.15, "#FF4136", 3),
    ]
}

/// Fresh tier appended by the panel's add button. Name and color are
/// positional; code and order stay unset until the list is saved.
pub fn new_tier_template(position: usize) -> RiskTier {
    let fallback = format!("Nivel {}", position + 1);
    let name = NEW_TIER_NAMES
        .get(position)
        .map(|s| s.to_string())
        .unwrap_or(fallback);
    let color = NEW_TIER_COLORS.get(position).copied().unwrap_or("#6c757d");

    RiskTier {
        id: None,
        name,
        code: String::new(),
        score_min: 0.0,
        score_max: 100.0,
        annual_effective_rate: 30.0,
        monthly_nominal_rate: 2.21,
        guarantee_fee: 0.10,
        color: color.to_string(),
        order: None,
        active: true,
    }
}

/// Fresh rejection factor appended by the panel's add button.
pub fn new_factor_template() -> RejectionFactor {
    RejectionFactor {
        id: None,
        criterion_key: "nuevo_criterio".to_string(),
        label: "Nuevo criterio".to_string(),
        operator: ComparisonOp::Less,
        threshold: 0.0,
        message: "Mensaje de rechazo".to_string(),
        active: true,
        order: None,
    }
}

/// Fresh criterion appended by the panel's add button. The code embeds a
/// millisecond timestamp so repeated adds never collide.
pub fn new_criterion_template(position: usize, stamp_millis: i64) -> Criterion {
    Criterion {
        code: format!("criterio_{stamp_millis}"),
        name: format!("Nuevo Criterio {}", position + 1),
        description: String::new(),
        weight: 10.0,
        field_type: CriterionFieldType::Numeric,
        ranges: Vec::new(),
        active: true,
        order: None,
    }
}

/// Full six-criterion catalog the panel installs on request. Weights sum
/// to 100 so the catalog is saveable as-is.
pub fn panel_default_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            code: "edad".to_string(),
            name: "Edad del Cliente".to_string(),
            description: "Rango de edad del solicitante".to_string(),
            weight: 10.0,
            field_type: CriterionFieldType::Numeric,
            ranges: vec![
                range(18.0, 25.0, 15.0, "Joven"),
                range(26.0, 40.0, 25.0, "Adulto joven"),
                range(41.0, 60.0, 20.0, "Adulto"),
                range(61.0, 84.0, 10.0, "Adulto mayor"),
            ],
            active: true,
            order: None,
        },
        Criterion {
            code: "score_datacredito".to_string(),
            name: "Score DataCrédito".to_string(),
            description: "Puntaje de buró de crédito".to_string(),
            weight: 25.0,
            field_type: CriterionFieldType::Numeric,
            ranges: vec![
                range(700.0, 950.0, 25.0, "Excelente"),
                range(600.0, 699.0, 20.0, "Bueno"),
                range(500.0, 599.0, 15.0, "Regular"),
                range(400.0, 499.0, 10.0, "Bajo"),
            ],
            active: true,
            order: None,
        },
        Criterion {
            code: "ingresos".to_string(),
            name: "Nivel de Ingresos".to_string(),
            description: "Ingresos mensuales del solicitante".to_string(),
            weight: 20.0,
            field_type: CriterionFieldType::Numeric,
            ranges: vec![
                range(5_000_000.0, 999_999_999.0, 25.0, "Muy alto"),
                range(3_000_000.0, 4_999_999.0, 20.0, "Alto"),
                range(1_500_000.0, 2_999_999.0, 15.0, "Medio"),
                range(1_000_000.0, 1_499_999.0, 10.0, "Bajo"),
            ],
            active: true,
            order: None,
        },
        Criterion {
            code: "antiguedad_laboral".to_string(),
            name: "Antigüedad Laboral".to_string(),
            description: "Tiempo en el empleo actual (meses)".to_string(),
            weight: 15.0,
            field_type: CriterionFieldType::Numeric,
            ranges: vec![
                range(36.0, 999.0, 25.0, "3+ años"),
                range(24.0, 35.0, 20.0, "2-3 años"),
                range(12.0, 23.0, 15.0, "1-2 años"),
                range(6.0, 11.0, 10.0, "6-12 meses"),
            ],
            active: true,
            order: None,
        },
        Criterion {
            code: "tipo_contrato".to_string(),
            name: "Tipo de Contrato".to_string(),
            description: "Estabilidad laboral".to_string(),
            weight: 15.0,
            field_type: CriterionFieldType::Selection,
            ranges: vec![
                range(0.0, 0.0, 25.0, "Indefinido"),
                range(1.0, 1.0, 15.0, "Fijo"),
                range(2.0, 2.0, 10.0, "Prestación de servicios"),
            ],
            active: true,
            order: None,
        },
        Criterion {
            code: "nivel_endeudamiento".to_string(),
            name: "Nivel de Endeudamiento".to_string(),
            description: "DTI - Relación deuda/ingreso".to_string(),
            weight: 15.0,
            field_type: CriterionFieldType::Numeric,
            ranges: vec![
                range(0.0, 20.0, 25.0, "Muy bajo"),
                range(21.0, 35.0, 20.0, "Bajo"),
                range(36.0, 50.0, 15.0, "Moderado"),
                range(51.0, 70.0, 5.0, "Alto"),
            ],
            active: true,
            order: None,
        },
    ]
}

/// Catalog view served for a line that has never saved criteria: the same
/// six dimensions, at the fallback weight and with no ranges configured.
pub fn master_criteria_catalog() -> Vec<Criterion> {
    panel_default_criteria()
        .into_iter()
        .map(|c| Criterion {
            weight: 5.0,
            ranges: Vec::new(),
            ..c
        })
        .collect()
}

/// General thresholds seeded when a line is registered. The age ceiling is
/// 65 here, matching the stock `edad > 65` factor, while the fallback view
/// for unconfigured lines uses the wider 84 bound.
pub fn server_default_general() -> GeneralConfig {
    GeneralConfig {
        max_age: 65.0,
        ..GeneralConfig::default()
    }
}

/// Tier seed derived from the line's base annual rate: the base rate for
/// the low band, +3 points for the middle, +8 for the high band.
pub fn server_default_tiers(base_annual_rate: f64) -> Vec<RiskTier> {
    let bands = [
        ("Bajo Riesgo", "bajo_riesgo", 70.1, 100.0, base_annual_rate, 0.065, "#28a745"),
        ("Moderado", "moderado", 55.1, 70.0, base_annual_rate + 3.0, 0.10, "#ffc107"),
        ("Alto Riesgo", "alto_riesgo", 0.0, 55.0, base_annual_rate + 8.0, 0.15, "#dc3545"),
    ];

    bands
        .iter()
        .enumerate()
        .map(|(i, (name, code, min, max, annual, fee, color))| {
            tier(
                name,
                code,
                *min,
                *max,
                *annual,
                monthly_nominal_rate(*annual),
                *fee,
                color,
                i as i64 + 1,
            )
        })
        .collect()
}

/// The eight stock rejection factors every new line starts with. The age
/// messages carry the line's display name.
pub fn server_default_factors(line_name: &str) -> Vec<RejectionFactor> {
    let stock: [(&str, &str, ComparisonOp, f64, String); 8] = [
        (
            "score_datacredito",
            "Score DataCrédito",
            ComparisonOp::Less,
            400.0,
            "Score DataCrédito inferior al mínimo requerido".to_string(),
        ),
        (
            "mora_sector_financiero",
            "Mora activa sector financiero",
            ComparisonOp::Greater,
            30.0,
            "Presenta mora activa en el sector financiero".to_string(),
        ),
        (
            "mora_telcos",
            "Mora en telecomunicaciones",
            ComparisonOp::Greater,
            200_000.0,
            "Mora en telecomunicaciones superior al umbral".to_string(),
        ),
        (
            "mora_telcos_dias",
            "Mora telcos (días)",
            ComparisonOp::Greater,
            90.0,
            "Mora en telecomunicaciones mayor a 90 días".to_string(),
        ),
        (
            "dti",
            "Relación deuda/ingreso (DTI)",
            ComparisonOp::Greater,
            50.0,
            "Nivel de endeudamiento superior al 50%".to_string(),
        ),
        (
            "consultas_3meses",
            "Consultas últimos 3 meses",
            ComparisonOp::Greater,
            8.0,
            "Exceso de consultas crediticias".to_string(),
        ),
        (
            "edad",
            "Edad del solicitante",
            ComparisonOp::Less,
            18.0,
            format!("Edad mínima 18 años para {line_name}"),
        ),
        (
            "edad",
            "Edad del solicitante",
            ComparisonOp::Greater,
            65.0,
            format!("Edad máxima 65 años para {line_name}"),
        ),
    ];

    stock
        .into_iter()
        .enumerate()
        .map(|(i, (key, label, operator, threshold, message))| RejectionFactor {
            id: None,
            criterion_key: key.to_string(),
            label: label.to_string(),
            operator,
            threshold,
            message,
            active: true,
            order: Some(i as i64 + 1),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn tier(
    name: &str,
    code: &str,
    score_min: f64,
    score_max: f64,
    annual: f64,
    monthly: f64,
    fee: f64,
    color: &str,
    order: i64,
) -> RiskTier {
    RiskTier {
        id: None,
        name: name.to_string(),
        code: code.to_string(),
        score_min,
        score_max,
        annual_effective_rate: annual,
        monthly_nominal_rate: monthly,
        guarantee_fee: fee,
        color: color.to_string(),
        order: Some(order),
        active: true,
    }
}

fn range(min: f64, max: f64, points: f64, description: &str) -> ScoreRange {
    ScoreRange {
        min,
        max,
        points,
        description: description.to_string(),
    }
}
