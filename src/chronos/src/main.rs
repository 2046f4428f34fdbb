//! Chronos — attribution, campaign automation, and bot screening for the
//! marketing dashboard.
//!
//! Command-line entry point that runs one refresh-cycle step over a JSON
//! snapshot and prints the result as JSON on stdout. Logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chronos_automation::RulesEngine;
use chronos_core::types::roas;
use chronos_core::{AppConfig, AttributionModel, Campaign, DashboardSnapshot};
use chronos_fraud::{FraudRiskScorer, ReportedEnvironment, SessionProbe};
use chronos_reporting::{compare_models, summarize, AttributionModeler};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "chronos")]
#[command(about = "Multi-touch attribution, campaign rules, and bot screening")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "CHRONOS_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute tracked sales for every campaign
    Attribute {
        /// Snapshot JSON with `campaigns` and `journeys`
        #[arg(long)]
        input: PathBuf,
        /// Attribution model (overrides config)
        #[arg(long)]
        model: Option<AttributionModel>,
    },
    /// Attribute, then run the automation rules
    Evaluate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        model: Option<AttributionModel>,
    },
    /// Dashboard totals and a comparison of every attribution model
    Summary {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        model: Option<AttributionModel>,
    },
    /// Score a reported client environment for bot risk
    Score {
        /// Reported environment JSON
        #[arg(long)]
        environment: PathBuf,
        /// Interaction observation window in milliseconds (overrides config)
        #[arg(long)]
        window_ms: Option<u64>,
    },
}

#[derive(Serialize)]
struct CampaignReport {
    #[serde(flatten)]
    campaign: Campaign,
    roas: f64,
}

#[derive(Serialize)]
struct SummaryReport {
    model: AttributionModel,
    summary: chronos_reporting::DashboardSummary,
    comparison: Vec<chronos_reporting::ModelComparison>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chronos=info,chronos_reporting=info,chronos_automation=info,chronos_fraud=info"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        default_model = %config.attribution.default_model,
        disabled_rules = config.automation.disabled_rules.len(),
        observation_window_ms = config.fraud.observation_window_ms,
        "Configuration loaded"
    );

    match cli.command {
        Command::Attribute { input, model } => {
            let model = model.unwrap_or(config.attribution.default_model);
            let campaigns = attribute(&input, model)?;
            let reports: Vec<CampaignReport> = campaigns
                .into_iter()
                .map(|campaign| CampaignReport {
                    roas: roas(campaign.chronos_tracked_sales, campaign.spend),
                    campaign,
                })
                .collect();
            print_json(&reports)?;
        }
        Command::Evaluate { input, model } => {
            let model = model.unwrap_or(config.attribution.default_model);
            let campaigns = attribute(&input, model)?;

            let mut engine = RulesEngine::with_default_rules();
            for id in &config.automation.disabled_rules {
                if !engine.toggle_rule(id, false) {
                    warn!(rule_id = %id, "Configured rule id not found");
                }
            }

            let results = engine.evaluate(&campaigns).await;
            for (action, count) in RulesEngine::summarize(&results) {
                info!(action = ?action, count, "Recommended actions");
            }
            print_json(&results)?;
        }
        Command::Summary { input, model } => {
            let model = model.unwrap_or(config.attribution.default_model);
            let snapshot = load_snapshot(&input)?;
            let campaigns =
                AttributionModeler::new().attribute(&snapshot.campaigns, &snapshot.journeys, model);
            print_json(&SummaryReport {
                model,
                summary: summarize(&campaigns),
                comparison: compare_models(&snapshot.campaigns, &snapshot.journeys),
            })?;
        }
        Command::Score {
            environment,
            window_ms,
        } => {
            let contents = std::fs::read_to_string(&environment)
                .with_context(|| format!("reading {}", environment.display()))?;
            let reported: ReportedEnvironment =
                serde_json::from_str(&contents).context("parsing reported environment")?;

            let probe = Arc::new(SessionProbe::new(reported));
            let mut scorer = FraudRiskScorer::from_config(probe, &config.fraud);
            if let Some(ms) = window_ms {
                scorer = scorer.with_observation_window(Duration::from_millis(ms));
            }

            let result = scorer.analyze().await;
            print_json(&result)?;
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> anyhow::Result<DashboardSnapshot> {
    DashboardSnapshot::from_path(path).with_context(|| format!("loading {}", path.display()))
}

fn attribute(path: &Path, model: AttributionModel) -> anyhow::Result<Vec<Campaign>> {
    let snapshot = load_snapshot(path)?;
    Ok(AttributionModeler::new().attribute(&snapshot.campaigns, &snapshot.journeys, model))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
