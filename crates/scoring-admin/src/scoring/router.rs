use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CreditLineId, Criterion, GeneralConfig, RejectionFactor, RiskTier};
use super::repository::{AuditSink, RepositoryError, ScoringRepository};
use super::service::{ScoringAdminService, ScoringServiceError};

/// Header the panel attaches to every mutating request.
pub const CSRF_HEADER: &str = "x-csrftoken";

/// Identity of the signed-in operator, echoed by the session endpoint.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub username: String,
    pub role: String,
    pub full_name: String,
}

/// Shared state behind the scoring API: the admin service, the CSRF token
/// mutating requests must present, and the session the server vouches for
/// (`None` renders every session probe unauthenticated).
pub struct ScoringApiState<R, A> {
    pub service: ScoringAdminService<R, A>,
    pub csrf_token: String,
    pub session: Option<SessionIdentity>,
}

/// Router builder exposing the scoring admin endpoints.
pub fn scoring_router<R, A>(state: Arc<ScoringApiState<R, A>>) -> Router
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route("/api/scoring/lineas-credito", get(lines_handler::<R, A>))
        .route(
            "/api/scoring/linea/:linea_id/config",
            get(config_handler::<R, A>).post(save_config_handler::<R, A>),
        )
        .route(
            "/api/scoring/linea/:linea_id/niveles-riesgo",
            post(save_tiers_handler::<R, A>),
        )
        .route(
            "/api/scoring/linea/:linea_id/factores-rechazo",
            post(save_factors_handler::<R, A>),
        )
        .route(
            "/api/scoring/linea/:linea_id/criterios",
            post(save_criteria_handler::<R, A>),
        )
        .route("/api/scoring/copiar-config", post(copy_handler::<R, A>))
        .route("/api/csrf-token", get(csrf_token_handler::<R, A>))
        .route("/api/session-status", get(session_status_handler::<R, A>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigSavePayload {
    #[serde(default)]
    config_general: Option<GeneralConfig>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TierSavePayload {
    #[serde(default)]
    niveles: Option<Vec<RiskTier>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FactorSavePayload {
    #[serde(default)]
    factores: Option<Vec<RejectionFactor>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CriteriaSavePayload {
    #[serde(default)]
    criterios: Option<Vec<Criterion>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CopyConfigPayload {
    linea_origen_id: CreditLineId,
    linea_destino_id: CreditLineId,
    #[serde(default = "default_include_criteria")]
    incluir_criterios: bool,
}

fn default_include_criteria() -> bool {
    true
}

pub(crate) async fn lines_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    match state.service.lines() {
        Ok(lines) => {
            let payload = json!({
                "success": true,
                "lineas": lines,
                "total": lines.len(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => failure_response(error),
    }
}

pub(crate) async fn config_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
    Path(linea_id): Path<i64>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    match state.service.fetch_config(CreditLineId(linea_id)) {
        Ok(config) => {
            let payload = json!({
                "success": true,
                "config": config,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => failure_response(error),
    }
}

pub(crate) async fn save_config_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
    Path(linea_id): Path<i64>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<ConfigSavePayload>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = verify_csrf(&state, &headers) {
        return rejection;
    }

    let Some(general) = payload.config_general else {
        return bad_request("No se recibieron datos");
    };

    match state.service.save_general(CreditLineId(linea_id), general) {
        Ok(()) => saved_response("Configuración guardada"),
        Err(error) => failure_response(error),
    }
}

pub(crate) async fn save_tiers_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
    Path(linea_id): Path<i64>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<TierSavePayload>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = verify_csrf(&state, &headers) {
        return rejection;
    }

    let Some(tiers) = payload.niveles else {
        return bad_request("Datos de niveles no especificados");
    };

    match state.service.save_tiers(CreditLineId(linea_id), tiers) {
        Ok(()) => saved_response("Niveles de riesgo guardados"),
        Err(error) => failure_response(error),
    }
}

pub(crate) async fn save_factors_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
    Path(linea_id): Path<i64>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<FactorSavePayload>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = verify_csrf(&state, &headers) {
        return rejection;
    }

    let Some(factors) = payload.factores else {
        return bad_request("Datos de factores no especificados");
    };

    match state.service.save_factors(CreditLineId(linea_id), factors) {
        Ok(()) => saved_response("Factores de rechazo guardados"),
        Err(error) => failure_response(error),
    }
}

pub(crate) async fn save_criteria_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
    Path(linea_id): Path<i64>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<CriteriaSavePayload>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = verify_csrf(&state, &headers) {
        return rejection;
    }

    let Some(criteria) = payload.criterios else {
        return bad_request("Datos de criterios no especificados");
    };

    match state.service.save_criteria(CreditLineId(linea_id), criteria) {
        Ok(()) => saved_response("Criterios guardados"),
        Err(error) => failure_response(error),
    }
}

pub(crate) async fn copy_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<CopyConfigPayload>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    if let Err(rejection) = verify_csrf(&state, &headers) {
        return rejection;
    }

    match state.service.copy_config(
        payload.linea_origen_id,
        payload.linea_destino_id,
        payload.incluir_criterios,
    ) {
        Ok(()) => saved_response("Configuración copiada"),
        Err(error) => failure_response(error),
    }
}

pub(crate) async fn csrf_token_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    let payload = json!({ "csrf_token": state.csrf_token });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn session_status_handler<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
) -> Response
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    match &state.session {
        Some(identity) => {
            let payload = json!({
                "authenticated": true,
                "username": identity.username,
                "rol": identity.role,
                "nombre_completo": identity.full_name,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        None => {
            let payload = json!({ "authenticated": false });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
    }
}

fn verify_csrf<R, A>(state: &ScoringApiState<R, A>, headers: &HeaderMap) -> Result<(), Response> {
    let provided = headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if provided == state.csrf_token {
        return Ok(());
    }

    let payload = json!({
        "success": false,
        "error": "Token CSRF inválido",
    });
    Err((StatusCode::FORBIDDEN, axum::Json(payload)).into_response())
}

fn bad_request(message: &str) -> Response {
    let payload = json!({
        "success": false,
        "error": message,
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn saved_response(message: &str) -> Response {
    let payload = json!({
        "success": true,
        "message": message,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn failure_response(error: ScoringServiceError) -> Response {
    let (status, message) = match &error {
        ScoringServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Línea no encontrada".to_string())
        }
        ScoringServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, error.to_string())
        }
        ScoringServiceError::TierRule(rule) => (StatusCode::BAD_REQUEST, rule.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    };

    let payload = json!({
        "success": false,
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}
