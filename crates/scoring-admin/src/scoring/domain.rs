use serde::{Deserialize, Serialize};

/// Identifier wrapper for credit lines.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct CreditLineId(pub i64);

impl std::fmt::Display for CreditLineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row shown in the line selector. Carries enough to pick a line and show
/// whether it has scoring set up, not the full configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLineSummary {
    pub id: CreditLineId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "puntaje_minimo")]
    pub min_approval_score: f64,
    #[serde(rename = "score_datacredito_minimo")]
    pub min_bureau_score: f64,
    #[serde(rename = "num_niveles_riesgo")]
    pub tier_count: usize,
    #[serde(rename = "num_factores_rechazo")]
    pub factor_count: usize,
    #[serde(rename = "tiene_config_scoring")]
    pub has_config: bool,
}

/// Full per-line configuration as fetched by the panel and saved slice by
/// slice through the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(rename = "linea_id", default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<CreditLineId>,
    #[serde(rename = "config_general", default)]
    pub general: GeneralConfig,
    #[serde(rename = "niveles_riesgo", default)]
    pub risk_tiers: Vec<RiskTier>,
    #[serde(rename = "factores_rechazo", default)]
    pub rejection_factors: Vec<RejectionFactor>,
    #[serde(rename = "criterios", default)]
    pub criteria: Vec<Criterion>,
}

/// Approval thresholds and automatic-rejection bounds for one line.
///
/// Everything is `f64` because the panel coerces every edited field through
/// the same numeric path; whole numbers round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    #[serde(rename = "linea_nombre", skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
    #[serde(rename = "puntaje_minimo_aprobacion")]
    pub min_approval_score: f64,
    #[serde(rename = "puntaje_revision_manual")]
    pub manual_review_score: f64,
    #[serde(rename = "umbral_mora_telcos")]
    pub telco_arrears_ceiling: f64,
    #[serde(rename = "edad_minima")]
    pub min_age: f64,
    #[serde(rename = "edad_maxima")]
    pub max_age: f64,
    #[serde(rename = "dti_maximo")]
    pub max_dti: f64,
    #[serde(rename = "score_datacredito_minimo")]
    pub min_bureau_score: f64,
    #[serde(rename = "consultas_max_3meses")]
    pub max_recent_inquiries: f64,
    #[serde(rename = "escala_max")]
    pub score_scale: f64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            line_name: None,
            min_approval_score: 17.0,
            manual_review_score: 10.0,
            telco_arrears_ceiling: 200_000.0,
            min_age: 18.0,
            max_age: 84.0,
            max_dti: 50.0,
            min_bureau_score: 400.0,
            max_recent_inquiries: 8.0,
            score_scale: 100.0,
        }
    }
}

/// One score band with its rates, guarantee fee, and presentation metadata.
///
/// A tier freshly added in the panel has no code or order yet; the service
/// assigns both when the list is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "codigo", default)]
    pub code: String,
    #[serde(rename = "min", default)]
    pub score_min: f64,
    #[serde(rename = "max", default = "default_score_max")]
    pub score_max: f64,
    #[serde(rename = "tasa_ea", default = "default_annual_rate")]
    pub annual_effective_rate: f64,
    #[serde(rename = "tasa_nominal_mensual", default = "default_monthly_rate")]
    pub monthly_nominal_rate: f64,
    #[serde(rename = "aval_porcentaje", default = "default_guarantee_fee")]
    pub guarantee_fee: f64,
    #[serde(default = "default_tier_color")]
    pub color: String,
    #[serde(rename = "orden", default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
}

/// Automatic-rejection rule: "if field OP threshold then reject" plus the
/// borrower-facing message shown when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionFactor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "criterio", default)]
    pub criterion_key: String,
    #[serde(rename = "criterio_nombre", default)]
    pub label: String,
    #[serde(rename = "operador", default)]
    pub operator: ComparisonOp,
    #[serde(rename = "valor", default)]
    pub threshold: f64,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "orden", default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Comparison operator applied by a rejection factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[default]
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "=")]
    Equal,
}

impl ComparisonOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Less => "<",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::Equal => "=",
        }
    }

    /// Reading shown next to the symbol in the operator picker.
    pub const fn description(self) -> &'static str {
        match self {
            ComparisonOp::Less => "menor que",
            ComparisonOp::LessOrEqual => "menor o igual",
            ComparisonOp::Greater => "mayor que",
            ComparisonOp::GreaterOrEqual => "mayor o igual",
            ComparisonOp::Equal => "igual a",
        }
    }

    pub const fn all() -> [ComparisonOp; 5] {
        [
            ComparisonOp::Less,
            ComparisonOp::LessOrEqual,
            ComparisonOp::Greater,
            ComparisonOp::GreaterOrEqual,
            ComparisonOp::Equal,
        ]
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessOrEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterOrEqual),
            "=" => Some(Self::Equal),
            _ => None,
        }
    }
}

/// Weighted evaluation dimension awarding points by the range a borrower's
/// value falls into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "peso", default = "default_weight")]
    pub weight: f64,
    #[serde(rename = "tipo_campo", default)]
    pub field_type: CriterionFieldType,
    #[serde(rename = "rangos", default)]
    pub ranges: Vec<ScoreRange>,
    #[serde(rename = "activo", default = "default_true")]
    pub active: bool,
    #[serde(rename = "orden", default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Input widget the panel renders for a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CriterionFieldType {
    #[default]
    #[serde(rename = "numerico")]
    Numeric,
    #[serde(rename = "seleccion")]
    Selection,
}

impl CriterionFieldType {
    pub const fn label(self) -> &'static str {
        match self {
            CriterionFieldType::Numeric => "numerico",
            CriterionFieldType::Selection => "seleccion",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "numerico" => Some(Self::Numeric),
            "seleccion" => Some(Self::Selection),
            _ => None,
        }
    }
}

/// Scoring band inside a criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(rename = "puntos", default)]
    pub points: f64,
    #[serde(rename = "descripcion", default)]
    pub description: String,
}

fn default_true() -> bool {
    true
}

fn default_score_max() -> f64 {
    100.0
}

fn default_annual_rate() -> f64 {
    24.0
}

fn default_monthly_rate() -> f64 {
    1.81
}

fn default_guarantee_fee() -> f64 {
    0.10
}

fn default_tier_color() -> String {
    "#FF4136".to_string()
}

fn default_weight() -> f64 {
    5.0
}
