//! Integration specifications for the scoring administration service and its
//! HTTP surface.
//!
//! Scenarios run against the public facade and the router with an in-memory
//! repository, covering line registration, section saves, configuration
//! copies, and the JSON envelopes the panel consumes.

mod common {
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use scoring_admin::scoring::domain::{
        ComparisonOp, CreditLineId, CreditLineSummary, Criterion, CriterionFieldType,
        GeneralConfig, RejectionFactor, RiskTier, ScoringConfig,
    };
    use scoring_admin::scoring::repository::{
        AuditError, AuditSink, ConfigChangeEvent, CreditLineRecord, NewCreditLine,
        RepositoryError, ScoringRepository,
    };
    use scoring_admin::scoring::router::{scoring_router, ScoringApiState, SessionIdentity};
    use scoring_admin::scoring::service::ScoringAdminService;

    pub(super) const TEST_CSRF: &str = "workflow-csrf-token";

    pub(super) fn new_line(name: &str, base_annual_rate: f64) -> NewCreditLine {
        NewCreditLine {
            name: name.to_string(),
            description: format!("Línea {name}"),
            base_annual_rate,
        }
    }

    pub(super) fn tier(name: &str, score_min: f64, score_max: f64) -> RiskTier {
        RiskTier {
            id: None,
            name: name.to_string(),
            code: String::new(),
            score_min,
            score_max,
            annual_effective_rate: 24.0,
            monthly_nominal_rate: 1.8088,
            guarantee_fee: 0.10,
            color: "#ffc107".to_string(),
            order: None,
            active: true,
        }
    }

    pub(super) fn factor(key: &str, threshold: f64) -> RejectionFactor {
        RejectionFactor {
            id: None,
            criterion_key: key.to_string(),
            label: format!("Factor {key}"),
            operator: ComparisonOp::Greater,
            threshold,
            message: format!("Rechazado por {key}"),
            active: true,
            order: None,
        }
    }

    pub(super) fn criterion(code: &str, weight: f64) -> Criterion {
        Criterion {
            code: code.to_string(),
            name: format!("Criterio {code}"),
            description: String::new(),
            weight,
            field_type: CriterionFieldType::Numeric,
            ranges: Vec::new(),
            active: true,
            order: None,
        }
    }

    pub(super) fn build_service() -> (
        ScoringAdminService<MemoryRepository, RecordingAudit>,
        Arc<MemoryRepository>,
        Arc<RecordingAudit>,
    ) {
        let repository = Arc::new(MemoryRepository::default());
        let audit = Arc::new(RecordingAudit::default());
        let service = ScoringAdminService::new(repository.clone(), audit.clone());
        (service, repository, audit)
    }

    pub(super) fn build_router(
        service: ScoringAdminService<MemoryRepository, RecordingAudit>,
        session: Option<SessionIdentity>,
    ) -> axum::Router {
        scoring_router(Arc::new(ScoringApiState {
            service,
            csrf_token: TEST_CSRF.to_string(),
            session,
        }))
    }

    pub(super) fn operator() -> SessionIdentity {
        SessionIdentity {
            username: "laura".to_string(),
            role: "gerencia".to_string(),
            full_name: "Laura Pérez".to_string(),
        }
    }

    pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        pub(super) lines: Arc<Mutex<Vec<CreditLineRecord>>>,
    }

    impl ScoringRepository for MemoryRepository {
        fn line_summaries(&self) -> Result<Vec<CreditLineSummary>, RepositoryError> {
            let guard = self.lines.lock().expect("repository mutex poisoned");
            Ok(guard.iter().map(CreditLineRecord::summary).collect())
        }

        fn register_line(&self, line: NewCreditLine) -> Result<CreditLineRecord, RepositoryError> {
            let mut guard = self.lines.lock().expect("repository mutex poisoned");
            if guard.iter().any(|existing| existing.name == line.name) {
                return Err(RepositoryError::Conflict);
            }
            let record = CreditLineRecord {
                id: CreditLineId(guard.len() as i64 + 1),
                name: line.name,
                description: line.description,
                base_annual_rate: line.base_annual_rate,
                active: true,
                config: None,
            };
            guard.push(record.clone());
            Ok(record)
        }

        fn fetch_line(
            &self,
            id: CreditLineId,
        ) -> Result<Option<CreditLineRecord>, RepositoryError> {
            let guard = self.lines.lock().expect("repository mutex poisoned");
            Ok(guard.iter().find(|record| record.id == id).cloned())
        }

        fn store_general(
            &self,
            id: CreditLineId,
            general: GeneralConfig,
        ) -> Result<(), RepositoryError> {
            self.with_config(id, |config| config.general = general)
        }

        fn store_tiers(
            &self,
            id: CreditLineId,
            tiers: Vec<RiskTier>,
        ) -> Result<(), RepositoryError> {
            self.with_config(id, |config| config.risk_tiers = tiers)
        }

        fn store_factors(
            &self,
            id: CreditLineId,
            factors: Vec<RejectionFactor>,
        ) -> Result<(), RepositoryError> {
            self.with_config(id, |config| config.rejection_factors = factors)
        }

        fn store_criteria(
            &self,
            id: CreditLineId,
            criteria: Vec<Criterion>,
        ) -> Result<(), RepositoryError> {
            self.with_config(id, |config| config.criteria = criteria)
        }

        fn copy_config(
            &self,
            source: CreditLineId,
            destination: CreditLineId,
            include_criteria: bool,
        ) -> Result<(), RepositoryError> {
            let mut guard = self.lines.lock().expect("repository mutex poisoned");
            let source_config = guard
                .iter()
                .find(|record| record.id == source)
                .ok_or(RepositoryError::NotFound)?
                .config
                .clone()
                .unwrap_or_default();

            let target = guard
                .iter_mut()
                .find(|record| record.id == destination)
                .ok_or(RepositoryError::NotFound)?;
            let target_config = target.config.get_or_insert_with(ScoringConfig::default);
            target_config.general = source_config.general;
            target_config.risk_tiers = source_config.risk_tiers;
            target_config.rejection_factors = source_config.rejection_factors;
            if include_criteria {
                target_config.criteria = source_config.criteria;
            }
            Ok(())
        }
    }

    impl MemoryRepository {
        fn with_config(
            &self,
            id: CreditLineId,
            apply: impl FnOnce(&mut ScoringConfig),
        ) -> Result<(), RepositoryError> {
            let mut guard = self.lines.lock().expect("repository mutex poisoned");
            let record = guard
                .iter_mut()
                .find(|record| record.id == id)
                .ok_or(RepositoryError::NotFound)?;
            apply(record.config.get_or_insert_with(ScoringConfig::default));
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct RecordingAudit {
        events: Arc<Mutex<Vec<ConfigChangeEvent>>>,
    }

    impl RecordingAudit {
        pub(super) fn events(&self) -> Vec<ConfigChangeEvent> {
            self.events.lock().expect("audit mutex poisoned").clone()
        }
    }

    impl AuditSink for RecordingAudit {
        fn record(&self, event: ConfigChangeEvent) -> Result<(), AuditError> {
            self.events
                .lock()
                .expect("audit mutex poisoned")
                .push(event);
            Ok(())
        }
    }
}

mod admin {
    use super::common::*;
    use scoring_admin::scoring::domain::CreditLineId;
    use scoring_admin::scoring::repository::ConfigSection;
    use scoring_admin::scoring::service::ScoringServiceError;
    use scoring_admin::scoring::validation::weight_sum;

    #[test]
    fn registering_a_line_seeds_its_starter_configuration() {
        let (service, _, audit) = build_service();

        let record = service
            .register_line(new_line("Crédito Personal", 26.0))
            .expect("line registers");
        let config = record.config.expect("seeded configuration present");

        assert_eq!(config.general.min_approval_score, 17.0);
        assert_eq!(config.general.max_age, 65.0);
        assert_eq!(config.risk_tiers.len(), 3);
        assert_eq!(config.risk_tiers[0].annual_effective_rate, 26.0);
        assert_eq!(config.risk_tiers[2].annual_effective_rate, 34.0);
        assert_eq!(config.rejection_factors.len(), 8);
        assert!(
            config.criteria.is_empty(),
            "criteria stay unconfigured until the first save"
        );

        assert!(audit
            .events()
            .iter()
            .any(|event| event.section == ConfigSection::Seed));
    }

    #[test]
    fn fetching_assembles_the_panel_view_with_the_catalog_fallback() {
        let (service, _, _) = build_service();
        let record = service
            .register_line(new_line("Microcrédito", 30.0))
            .expect("line registers");

        let config = service.fetch_config(record.id).expect("config fetches");

        assert_eq!(config.line_id, Some(record.id));
        assert_eq!(config.general.line_name.as_deref(), Some("Microcrédito"));
        assert_eq!(config.criteria.len(), 6);
        assert!(config.criteria.iter().all(|c| c.weight == 5.0));
        assert!(config
            .risk_tiers
            .windows(2)
            .all(|pair| pair[0].order <= pair[1].order));
    }

    #[test]
    fn tier_saves_fill_names_codes_and_order_positionally() {
        let (service, _, _) = build_service();
        let record = service
            .register_line(new_line("Crédito Personal", 26.0))
            .expect("line registers");

        let mut submitted = vec![tier("", 70.1, 100.0), tier("Especial", 0.0, 70.0)];
        submitted[1].code = "ESPECIAL".to_string();
        service
            .save_tiers(record.id, submitted)
            .expect("tiers save");

        let config = service.fetch_config(record.id).expect("config fetches");
        assert_eq!(config.risk_tiers.len(), 2);
        assert_eq!(config.risk_tiers[0].name, "Nivel 1");
        assert_eq!(config.risk_tiers[0].code, "N1");
        assert_eq!(config.risk_tiers[0].order, Some(0));
        assert_eq!(config.risk_tiers[1].code, "ESPECIAL");
        assert_eq!(config.risk_tiers[1].order, Some(1));
    }

    #[test]
    fn the_last_tier_cannot_be_deleted() {
        let (service, _, _) = build_service();
        let record = service
            .register_line(new_line("Crédito Personal", 26.0))
            .expect("line registers");

        let result = service.save_tiers(record.id, Vec::new());
        assert!(matches!(result, Err(ScoringServiceError::TierRule(_))));

        let config = service.fetch_config(record.id).expect("config fetches");
        assert_eq!(config.risk_tiers.len(), 3, "seeded tiers stay in place");
    }

    #[test]
    fn copying_overwrites_the_destination_but_can_keep_its_criteria() {
        let (service, _, audit) = build_service();
        let source = service
            .register_line(new_line("Crédito Personal", 26.0))
            .expect("source registers");
        let destination = service
            .register_line(new_line("Microcrédito", 30.0))
            .expect("destination registers");

        let source_criteria = vec![criterion("edad", 40.0), criterion("ingresos", 60.0)];
        service
            .save_criteria(source.id, source_criteria)
            .expect("source criteria save");
        let own_criteria = vec![criterion("score_datacredito", 100.0)];
        service
            .save_criteria(destination.id, own_criteria)
            .expect("destination criteria save");

        service
            .copy_config(source.id, destination.id, false)
            .expect("copy succeeds");

        let copied = service.fetch_config(destination.id).expect("config fetches");
        assert_eq!(copied.risk_tiers[0].annual_effective_rate, 26.0);
        assert_eq!(copied.criteria.len(), 1, "destination keeps its criteria");
        assert_eq!(copied.criteria[0].code, "score_datacredito");
        assert_eq!(weight_sum(&copied.criteria), 100.0);

        assert!(audit.events().iter().any(|event| {
            event.section == ConfigSection::Copy && event.detail.contains("desde línea 1")
        }));

        service
            .copy_config(source.id, destination.id, true)
            .expect("copy with criteria succeeds");
        let copied = service.fetch_config(destination.id).expect("config fetches");
        assert_eq!(copied.criteria.len(), 2);
    }

    #[test]
    fn the_selector_lists_active_lines_sorted_by_name() {
        let (service, repository, _) = build_service();
        service
            .register_line(new_line("Microcrédito", 30.0))
            .expect("line registers");
        service
            .register_line(new_line("Crédito Personal", 26.0))
            .expect("line registers");
        let retired = service
            .register_line(new_line("Línea Piloto", 28.0))
            .expect("line registers");

        {
            let mut guard = repository.lines.lock().expect("repository mutex poisoned");
            let record = guard
                .iter_mut()
                .find(|record| record.id == retired.id)
                .expect("retired line present");
            record.active = false;
        }

        let lines = service.lines().expect("selector lists");
        let names: Vec<&str> = lines.iter().map(|line| line.name.as_str()).collect();
        assert_eq!(names, vec!["Crédito Personal", "Microcrédito"]);
        assert!(lines.iter().all(|line| line.has_config));
    }

    #[test]
    fn missing_lines_surface_not_found() {
        let (service, _, _) = build_service();
        let result = service.fetch_config(CreditLineId(99));
        assert!(matches!(
            result,
            Err(ScoringServiceError::Repository(
                scoring_admin::scoring::repository::RepositoryError::NotFound
            ))
        ));
    }
}

mod http {
    use super::common::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use scoring_admin::scoring::repository::ConfigSection;
    use scoring_admin::scoring::router::CSRF_HEADER;
    use serde_json::json;
    use tower::ServiceExt;

    fn seeded_router() -> (axum::Router, super::common::RecordingAudit) {
        let (service, _, audit) = build_service();
        service
            .register_line(new_line("Crédito Personal", 26.0))
            .expect("line registers");
        let audit_handle = (*audit).clone();
        (build_router(service, Some(operator())), audit_handle)
    }

    fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header(CSRF_HEADER, token);
        }
        builder
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn the_selector_payload_wraps_lines_in_the_success_envelope() {
        let (router, _) = seeded_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/scoring/lineas-credito")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["success"], json!(true));
        assert_eq!(payload["total"], json!(1));
        assert_eq!(payload["lineas"][0]["nombre"], json!("Crédito Personal"));
        assert_eq!(payload["lineas"][0]["tiene_config_scoring"], json!(true));
    }

    #[tokio::test]
    async fn unknown_lines_return_404_with_the_spanish_error() {
        let (router, _) = seeded_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/scoring/linea/99/config")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload = read_json_body(response).await;
        assert_eq!(payload["success"], json!(false));
        assert_eq!(payload["error"], json!("Línea no encontrada"));
    }

    #[tokio::test]
    async fn mutations_without_the_token_are_rejected() {
        let (router, audit) = seeded_router();
        let tiers = json!({ "niveles": [tier("Único", 0.0, 100.0)] });

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/scoring/linea/1/niveles-riesgo",
                None,
                tiers.clone(),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let payload = read_json_body(response).await;
        assert_eq!(payload["error"], json!("Token CSRF inválido"));
        assert!(audit
            .events()
            .iter()
            .all(|event| event.section != ConfigSection::RiskTiers));

        let response = router
            .oneshot(post_json(
                "/api/scoring/linea/1/niveles-riesgo",
                Some(TEST_CSRF),
                tiers,
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["success"], json!(true));
        assert!(audit
            .events()
            .iter()
            .any(|event| event.section == ConfigSection::RiskTiers));
    }

    #[tokio::test]
    async fn config_saves_require_the_general_payload() {
        let (router, _) = seeded_router();

        let response = router
            .oneshot(post_json(
                "/api/scoring/linea/1/config",
                Some(TEST_CSRF),
                json!({}),
            ))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json_body(response).await;
        assert_eq!(payload["error"], json!("No se recibieron datos"));
    }

    #[tokio::test]
    async fn session_status_reports_the_signed_in_operator() {
        let (router, _) = seeded_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/session-status")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["authenticated"], json!(true));
        assert_eq!(payload["username"], json!("laura"));
        assert_eq!(payload["rol"], json!("gerencia"));
    }

    #[tokio::test]
    async fn anonymous_session_probes_get_401() {
        let (service, _, _) = build_service();
        let router = build_router(service, None);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/session-status")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let payload = read_json_body(response).await;
        assert_eq!(payload["authenticated"], json!(false));
    }

    #[tokio::test]
    async fn the_token_endpoint_hands_out_the_server_token() {
        let (router, _) = seeded_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/csrf-token")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["csrf_token"], json!(TEST_CSRF));
    }
}
