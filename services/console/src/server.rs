use crate::cli::ServeArgs;
use crate::infra::{
    csrf_token, seed_demo_lines, AppState, InMemoryScoringRepository, TracingAuditSink,
};
use crate::routes::with_console_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scoring_admin::config::AppConfig;
use scoring_admin::error::AppError;
use scoring_admin::scoring::{ScoringAdminService, ScoringApiState, SessionIdentity};
use scoring_admin::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryScoringRepository::default());
    let audit = Arc::new(TracingAuditSink);
    let service = ScoringAdminService::new(repository, audit);
    seed_demo_lines(&service)?;

    // Single-operator deployment: the server vouches for the session, the
    // panel still has to echo the per-boot token on every mutation.
    let api_state = Arc::new(ScoringApiState {
        service,
        csrf_token: csrf_token(),
        session: Some(SessionIdentity {
            username: "admin".to_string(),
            role: "gerencia".to_string(),
            full_name: "Administración de Crédito".to_string(),
        }),
    });

    let app = with_console_routes(api_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scoring admin console ready");

    axum::serve(listener, app).await?;
    Ok(())
}
