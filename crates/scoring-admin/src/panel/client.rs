use serde_json::{json, Value};
use tracing::warn;

use crate::scoring::domain::{
    CreditLineId, CreditLineSummary, Criterion, GeneralConfig, RejectionFactor, RiskTier,
    ScoringConfig,
};
use crate::scoring::router::CSRF_HEADER;

/// Error raised by the panel's HTTP client. `Api` carries the server's own
/// error string from a `success: false` payload.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Where the page exposes the CSRF token. Resolution order is fixed: the
/// hidden form field wins, then the meta tag, then the first token found in
/// any other form.
#[derive(Debug, Clone, Default)]
pub struct CsrfTokenSources {
    pub hidden_field: Option<String>,
    pub meta_tag: Option<String>,
    pub form_fields: Vec<String>,
}

impl CsrfTokenSources {
    pub fn resolve(&self) -> Option<String> {
        if let Some(token) = &self.hidden_field {
            return Some(token.clone());
        }
        if let Some(token) = &self.meta_tag {
            return Some(token.clone());
        }
        self.form_fields.first().cloned()
    }
}

/// HTTP client for the scoring admin API. Mutating calls resolve a CSRF
/// token from the page sources, falling back to the token endpoint when the
/// page exposes none.
pub struct ScoringApiClient {
    http: reqwest::Client,
    base_url: String,
    csrf_sources: CsrfTokenSources,
}

impl ScoringApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_csrf_sources(base_url, CsrfTokenSources::default())
    }

    pub fn with_csrf_sources(base_url: impl Into<String>, csrf_sources: CsrfTokenSources) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            csrf_sources,
        }
    }

    pub async fn lines(&self) -> Result<Vec<CreditLineSummary>, ApiError> {
        let response = self
            .http
            .get(self.url("/api/scoring/lineas-credito"))
            .send()
            .await?;
        let payload = read_json(response).await?;
        expect_success(&payload)?;

        let lines = payload
            .get("lineas")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(lines).map_err(|err| ApiError::Decode(err.to_string()))
    }

    pub async fn fetch_config(&self, line: CreditLineId) -> Result<ScoringConfig, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/scoring/linea/{line}/config")))
            .send()
            .await?;
        let payload = read_json(response).await?;
        expect_success(&payload)?;

        let config = payload
            .get("config")
            .cloned()
            .ok_or_else(|| ApiError::Decode("payload lacks a config object".to_string()))?;
        serde_json::from_value(config).map_err(|err| ApiError::Decode(err.to_string()))
    }

    pub async fn save_general(
        &self,
        line: CreditLineId,
        general: &GeneralConfig,
    ) -> Result<(), ApiError> {
        self.post_json(
            &format!("/api/scoring/linea/{line}/config"),
            &json!({ "config_general": general }),
        )
        .await
    }

    pub async fn save_tiers(&self, line: CreditLineId, tiers: &[RiskTier]) -> Result<(), ApiError> {
        self.post_json(
            &format!("/api/scoring/linea/{line}/niveles-riesgo"),
            &json!({ "niveles": tiers }),
        )
        .await
    }

    pub async fn save_factors(
        &self,
        line: CreditLineId,
        factors: &[RejectionFactor],
    ) -> Result<(), ApiError> {
        self.post_json(
            &format!("/api/scoring/linea/{line}/factores-rechazo"),
            &json!({ "factores": factors }),
        )
        .await
    }

    pub async fn save_criteria(
        &self,
        line: CreditLineId,
        criteria: &[Criterion],
    ) -> Result<(), ApiError> {
        self.post_json(
            &format!("/api/scoring/linea/{line}/criterios"),
            &json!({ "criterios": criteria }),
        )
        .await
    }

    pub async fn copy_config(
        &self,
        source: CreditLineId,
        destination: CreditLineId,
        include_criteria: bool,
    ) -> Result<(), ApiError> {
        self.post_json(
            "/api/scoring/copiar-config",
            &json!({
                "linea_origen_id": source,
                "linea_destino_id": destination,
                "incluir_criterios": include_criteria,
            }),
        )
        .await
    }

    /// Probes the session endpoint. `true` means the server no longer
    /// recognizes the session and the page should bounce to login.
    pub async fn session_expired(&self) -> Result<bool, ApiError> {
        let response = self.http.get(self.url("/api/session-status")).send().await?;
        let status = response.status();
        Ok(status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<(), ApiError> {
        let token = self.csrf_token().await?;
        let response = self
            .http
            .post(self.url(path))
            .header(CSRF_HEADER, token)
            .json(body)
            .send()
            .await?;
        let payload = read_json(response).await?;
        expect_success(&payload)
    }

    async fn csrf_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.csrf_sources.resolve() {
            return Ok(token);
        }

        warn!("no CSRF token on the page, requesting one");
        let response = self.http.get(self.url("/api/csrf-token")).send().await?;
        let payload = read_json(response).await?;
        payload
            .get("csrf_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("payload lacks a csrf_token".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn expect_success(payload: &Value) -> Result<(), ApiError> {
    if payload
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Ok(());
    }

    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("error desconocido")
        .to_string();
    Err(ApiError::Api(message))
}
