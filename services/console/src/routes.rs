use crate::infra::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use scoring_admin::error::AppError;
use scoring_admin::scoring::{
    scoring_router, AuditSink, CreditLineId, ScoringApiState, ScoringConfigExporter,
    ScoringRepository,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_console_routes<R, A>(state: Arc<ScoringApiState<R, A>>) -> axum::Router
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    let export_routes = axum::Router::new()
        .route(
            "/api/scoring/linea/:linea_id/export.csv",
            axum::routing::get(export_endpoint::<R, A>),
        )
        .with_state(state.clone());

    scoring_router(state)
        .merge(export_routes)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Downloadable rendition of one line's configuration, same sheet the CLI
/// `config --csv` command writes.
pub(crate) async fn export_endpoint<R, A>(
    State(state): State<Arc<ScoringApiState<R, A>>>,
    Path(linea_id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    R: ScoringRepository + 'static,
    A: AuditSink + 'static,
{
    let config = state.service.fetch_config(CreditLineId(linea_id))?;

    let mut sheet = Vec::new();
    ScoringConfigExporter::to_writer(&mut sheet, &config)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"scoring_linea_{linea_id}.csv\""),
            ),
        ],
        sheet,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{seed_demo_lines, InMemoryAuditTrail, InMemoryScoringRepository};
    use axum_prometheus::PrometheusMetricLayer;
    use scoring_admin::scoring::ScoringAdminService;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn seeded_state() -> Arc<ScoringApiState<InMemoryScoringRepository, InMemoryAuditTrail>> {
        let repository = Arc::new(InMemoryScoringRepository::default());
        let audit = Arc::new(InMemoryAuditTrail::default());
        let service = ScoringAdminService::new(repository, audit);
        seed_demo_lines(&service).expect("lines seed");

        Arc::new(ScoringApiState {
            service,
            csrf_token: "routes-csrf-token".to_string(),
            session: None,
        })
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_startup_flag() {
        let (_layer, handle) = PrometheusMetricLayer::pair();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(handle),
        };

        let response = readiness_endpoint(Extension(state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn export_endpoint_renders_the_sectioned_sheet() {
        let state = seeded_state();

        let response = export_endpoint(State(state), Path(1))
            .await
            .expect("export renders")
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"scoring_linea_1.csv\""
        );

        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        let sheet = String::from_utf8(body.to_vec()).expect("utf-8 sheet");
        assert!(sheet.starts_with("linea,Crédito Personal\n"));
        assert!(sheet.contains("seccion,niveles_riesgo"));
        assert!(sheet.contains("seccion,factores_rechazo"));
        assert!(sheet.contains("seccion,criterios"));
    }

    #[tokio::test]
    async fn export_of_an_unknown_line_is_not_found() {
        let state = seeded_state();

        match export_endpoint(State(state), Path(99)).await {
            Ok(_) => panic!("unknown line should not export"),
            Err(err) => {
                let response = err.into_response();
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
            }
        }
    }
}
