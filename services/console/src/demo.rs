use crate::infra::{
    csrf_token, seed_demo_lines, InMemoryAuditTrail, InMemoryScoringRepository, TerminalNotifier,
};
use clap::Args;
use scoring_admin::error::AppError;
use scoring_admin::panel::render::TierSectionView;
use scoring_admin::panel::{
    criteria_section, line_selector, mutators, tier_section, CriterionField, CsrfTokenSources,
    DraftStore, GeneralField, PanelActions, ScoringApiClient, TierField,
};
use scoring_admin::scoring::{
    scoring_router, ScoringAdminService, ScoringApiState, ScoringConfigExporter, SessionIdentity,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Include each criterion's score ranges in the catalog listing.
    #[arg(long)]
    pub(crate) list_ranges: bool,
    /// Skip the copy-configuration portion of the demo.
    #[arg(long)]
    pub(crate) skip_copy: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        list_ranges,
        skip_copy,
    } = args;

    println!("Scoring admin panel demo");

    // Same wiring as `serve`, minus telemetry, on an ephemeral port.
    let repository = Arc::new(InMemoryScoringRepository::default());
    let audit = Arc::new(InMemoryAuditTrail::default());
    let service = ScoringAdminService::new(repository, audit.clone());
    seed_demo_lines(&service)?;

    let token = csrf_token();
    let state = Arc::new(ScoringApiState {
        service,
        csrf_token: token.clone(),
        session: Some(SessionIdentity {
            username: "admin".to_string(),
            role: "gerencia".to_string(),
            full_name: "Administración de Crédito".to_string(),
        }),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = scoring_router(state);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            eprintln!("demo server error: {err}");
        }
    });
    println!("Local API listening on http://{addr}");

    let client = Arc::new(ScoringApiClient::with_csrf_sources(
        format!("http://{addr}"),
        CsrfTokenSources {
            hidden_field: Some(token),
            meta_tag: None,
            form_fields: Vec::new(),
        },
    ));
    let store = Arc::new(DraftStore::new());
    let notifier = Arc::new(TerminalNotifier);
    let actions = PanelActions::new(client, store, notifier);

    println!("\nLoading the panel");
    if !actions.load_lines().await {
        println!("  Panel could not load any lines");
        return Ok(());
    }

    let draft = actions.store().snapshot();
    let selected = match draft.selected_line {
        Some(line) => line,
        None => {
            println!("  No line selected after load");
            return Ok(());
        }
    };

    println!("Credit lines");
    let selector = line_selector(&draft.lines, draft.selected_line);
    for option in &selector.options {
        let marker = if option.selected { "*" } else { "-" };
        println!(
            "{marker} [{}] {} ({} tiers, {} factors)",
            option.id, option.name, option.tier_count, option.factor_count
        );
    }

    let line_name = draft
        .config
        .general
        .line_name
        .clone()
        .unwrap_or_else(|| format!("line {selected}"));
    println!("\nRate sheet for {line_name}");
    print_tiers(&tier_section(&draft.config.risk_tiers));

    println!("\nRepricing tier 1 to 28% EA");
    mutators::update_tier(actions.store(), 0, TierField::AnnualEffectiveRate, "28");
    if let Some(tier) = actions.store().snapshot().config.risk_tiers.first() {
        println!(
            "- EA {:.2}% now carries NM {:.4}% monthly",
            tier.annual_effective_rate, tier.monthly_nominal_rate
        );
    }
    if !actions.save_tiers().await {
        return Ok(());
    }

    println!("\nTightening approval");
    mutators::update_general(actions.store(), GeneralField::MinApprovalScore, "20");
    if !actions.save_approval().await {
        return Ok(());
    }

    if !skip_copy {
        if let Some(source) = draft.lines.iter().find(|line| line.id != selected) {
            println!("\nCopying {}'s configuration onto {line_name}", source.name);
            if actions.copy_config(source.id, true).await {
                print_tiers(&tier_section(&actions.store().snapshot().config.risk_tiers));
            }
        }
    }

    println!("\nAdopting the criteria catalog");
    let catalog = criteria_section(&actions.store().snapshot().config.criteria);
    println!("- catalog weights sum {}%", catalog.weight_sum);
    if actions.save_criteria().await {
        println!("  (unbalanced weights were accepted; check the weight gate)");
    }

    println!("Rebalancing to 100%");
    for (index, weight) in ["25", "25", "20", "10", "10", "10"].iter().enumerate() {
        mutators::update_criterion(actions.store(), index, CriterionField::Weight, weight);
    }
    if !actions.save_criteria().await {
        return Ok(());
    }

    let final_draft = actions.store().snapshot();
    let criteria = criteria_section(&final_draft.config.criteria);
    println!(
        "\nCriteria in effect ({}, weights {}%)",
        criteria.count, criteria.weight_sum
    );
    for card in &criteria.cards {
        println!(
            "- {} [{}] {}% ({} ranges)",
            card.name, card.code, card.weight, card.range_count
        );
        if list_ranges {
            for range in &card.ranges {
                println!(
                    "    {:.0}-{:.0}: {:.0} pts {}",
                    range.min, range.max, range.points, range.description
                );
            }
        }
    }

    match serde_json::to_string_pretty(&tier_section(&final_draft.config.risk_tiers)) {
        Ok(json) => println!("\nRate sheet payload:\n{json}"),
        Err(err) => println!("\nRate sheet payload unavailable: {err}"),
    }

    let mut sheet = Vec::new();
    match ScoringConfigExporter::to_writer(&mut sheet, &final_draft.config) {
        Ok(()) => println!("\nCSV export preview\n{}", String::from_utf8_lossy(&sheet)),
        Err(err) => println!("\nCSV export unavailable: {err}"),
    }

    let events = audit.events();
    if events.is_empty() {
        println!("\nAudit trail: empty");
    } else {
        println!("\nAudit trail");
        for event in events {
            println!(
                "- {} linea {} [{}] {}",
                event.at.format("%H:%M:%S"),
                event.line_id,
                event.section.label(),
                event.detail
            );
        }
    }

    Ok(())
}

fn print_tiers(section: &TierSectionView) {
    println!("Risk tiers ({})", section.count);
    for row in &section.rows {
        println!(
            "- {} [{}] {:.0}-{:.0} pts | EA {:.2}% | NM {:.4}% | aval {:.1}%",
            row.name,
            row.code,
            row.score_min,
            row.score_max,
            row.annual_effective_rate,
            row.monthly_nominal_rate,
            row.guarantee_fee_pct
        );
    }
}
