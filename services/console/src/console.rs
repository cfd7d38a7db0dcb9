use crate::infra::FilePreferenceStore;
use clap::{Args, Subcommand};
use scoring_admin::config::AppConfig;
use scoring_admin::error::AppError;
use scoring_admin::panel::{
    approval_section, criteria_section, line_selector, tier_section, ScoringApiClient,
};
use scoring_admin::scoring::{CreditLineId, ScoringConfig, ScoringConfigExporter};
use scoring_admin::site::ThemeManager;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct LinesArgs {
    /// Base URL of a running server (defaults to the configured API URL)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ConfigArgs {
    /// Identifier of the credit line to inspect
    #[arg(long)]
    pub(crate) line: i64,
    /// Write the configuration to this CSV file as well
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Base URL of a running server (defaults to the configured API URL)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct CopyArgs {
    /// Line to copy the configuration from
    #[arg(long)]
    pub(crate) from: i64,
    /// Line whose configuration is overwritten
    #[arg(long)]
    pub(crate) to: i64,
    /// Copy the evaluation criteria as well
    #[arg(long)]
    pub(crate) include_criteria: bool,
    /// Base URL of a running server (defaults to the configured API URL)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ThemeCommand {
    /// Print the stored theme preference
    Show(ThemeArgs),
    /// Flip the stored theme and print what pages would apply
    Toggle(ThemeArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ThemeArgs {
    /// File the preference is kept in
    #[arg(long, default_value = "scoring-theme.conf")]
    pub(crate) file: PathBuf,
}

pub(crate) async fn run_lines(args: LinesArgs) -> Result<(), AppError> {
    let client = client_for(args.base_url)?;
    let lines = client.lines().await?;
    let selector = line_selector(&lines, None);

    println!("Credit lines ({})", selector.options.len());
    for option in &selector.options {
        let configured = if option.has_config {
            "configured"
        } else {
            "unconfigured"
        };
        println!(
            "- [{}] {} ({} tiers, {} factors, {configured})",
            option.id, option.name, option.tier_count, option.factor_count
        );
    }
    Ok(())
}

pub(crate) async fn run_config(args: ConfigArgs) -> Result<(), AppError> {
    let client = client_for(args.base_url)?;
    let config = client.fetch_config(CreditLineId(args.line)).await?;

    print_config(&config);

    if let Some(path) = args.csv {
        ScoringConfigExporter::to_path(&path, &config)?;
        println!();
        println!("Sheet written to {}", path.display());
    }
    Ok(())
}

pub(crate) async fn run_copy(args: CopyArgs) -> Result<(), AppError> {
    let client = client_for(args.base_url)?;
    client
        .copy_config(
            CreditLineId(args.from),
            CreditLineId(args.to),
            args.include_criteria,
        )
        .await?;

    let criteria = if args.include_criteria {
        "including criteria"
    } else {
        "keeping the destination's criteria"
    };
    println!(
        "Configuration copied from line {} to line {}, {criteria}",
        args.from, args.to
    );
    Ok(())
}

pub(crate) fn run_theme(command: ThemeCommand) -> Result<(), AppError> {
    match command {
        ThemeCommand::Show(args) => {
            let manager = theme_manager(args.file);
            let mode = manager.current();
            println!("Stored theme: {mode}");
            println!("- background {}", mode.background());
            println!("- text {}", mode.text());
        }
        ThemeCommand::Toggle(args) => {
            let manager = theme_manager(args.file);
            let applied = manager.toggle();
            println!("Theme switched to {}", applied.mode);
            println!("- background {}", applied.background);
            println!("- text {}", applied.text);
            println!("- cookie {}", applied.cookie);
        }
    }
    Ok(())
}

fn theme_manager(file: PathBuf) -> ThemeManager {
    ThemeManager::new(Arc::new(FilePreferenceStore::new(file)), None)
}

fn client_for(base_url: Option<String>) -> Result<ScoringApiClient, AppError> {
    let base_url = match base_url {
        Some(url) => url,
        None => AppConfig::load()?.api.base_url,
    };
    Ok(ScoringApiClient::new(base_url))
}

fn print_config(config: &ScoringConfig) {
    let name = config
        .general
        .line_name
        .as_deref()
        .unwrap_or("(sin nombre)");
    println!("Configuration for {name}");

    let tiers = tier_section(&config.risk_tiers);
    println!();
    println!("Risk tiers ({})", tiers.count);
    for row in &tiers.rows {
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

    let approval = approval_section(&config.general, &config.rejection_factors);
    println!();
    println!("Approval thresholds");
    println!(
        "- approval score {} and manual review below {}",
        approval.thresholds.min_approval_score, approval.thresholds.manual_review_score
    );
    println!(
        "- ages {}-{}, bureau floor {}, DTI cap {}%",
        approval.thresholds.min_age,
        approval.thresholds.max_age,
        approval.thresholds.min_bureau_score,
        approval.thresholds.max_dti
    );

    println!();
    println!("Rejection factors ({})", approval.factor_count);
    for factor in &approval.factors {
        let symbol = factor
            .operators
            .iter()
            .find(|operator| operator.selected)
            .map(|operator| operator.symbol)
            .unwrap_or("?");
        println!(
            "- {} {symbol} {}: {}",
            factor.display_name, factor.threshold, factor.message
        );
    }

    let criteria = criteria_section(&config.criteria);
    let balance = if criteria.weights_balanced {
        "balanced"
    } else {
        "unbalanced"
    };
    println!();
    println!(
        "Criteria ({}), weights sum {}% ({balance})",
        criteria.count, criteria.weight_sum
    );
    for card in &criteria.cards {
        println!(
            "- {} [{}] {}% ({}, {} ranges)",
            card.name, card.code, card.weight, card.field_type_label, card.range_count
        );
    }
}
