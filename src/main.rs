//! Scenario ROI CLI
//!
//! Command-line interface for comparing projection scenarios, running
//! sensitivity sweeps and scoring the competitive index.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use scenario_roi::{
    assumptions::load_projection_set, CompetitiveIndexRecord, CompetitiveMetrics, EngineConfig,
    ProjectionSet, ScenarioComparator, ScenarioRoiResult, SensitivityGrid, SensitivityRow, SweepSpec,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenario_roi", version, about = "Scenario ROI engine")]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare the preferred scenario against the baseline
    Compare(ProjectionArgs),
    /// Compare every present scenario against the baseline
    CompareAll(ProjectionArgs),
    /// Sweep the comparison over a parameter grid
    Sweep(SweepArgs),
    /// Score the competitive index
    Score(ScoreArgs),
}

#[derive(Args)]
struct ProjectionArgs {
    /// Projection set file (.json or .csv)
    input: PathBuf,

    /// Forecast horizon in years
    #[arg(long)]
    horizon: Option<u32>,

    /// Override the set's discount rate (fraction, e.g. 0.10)
    #[arg(long, allow_negative_numbers = true)]
    discount_rate: Option<f64>,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    projection: ProjectionArgs,

    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    discount_rates: Vec<f64>,

    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    growth_rates: Vec<f64>,

    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    terminal_multiples: Vec<f64>,

    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    capex_pcts: Vec<f64>,

    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    nwc_pcts: Vec<f64>,
}

#[derive(Args)]
struct ScoreArgs {
    #[arg(long)]
    market_share: f64,
    #[arg(long)]
    nps: f64,
    #[arg(long)]
    win_loss: f64,
    #[arg(long)]
    benchmark: f64,
}

impl ProjectionArgs {
    fn load(&self, config: &EngineConfig) -> Result<(ProjectionSet, EngineConfig)> {
        let mut set = load_projection_set(&self.input)
            .with_context(|| format!("loading projections from {}", self.input.display()))?;
        if let Some(rate) = self.discount_rate {
            set.discount_rate = Some(rate);
        }
        let config = match self.horizon {
            Some(years) => config.with_horizon(years),
            None => config.clone(),
        };
        Ok((set, config))
    }
}

fn non_empty(values: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() { None } else { Some(values.to_vec()) }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_comparison(result: &ScenarioRoiResult) {
    println!(
        "Scenario: {} vs baseline  (discount rate {:.2}%, {} years)",
        result.scenario_kind,
        result.discount_rate * 100.0,
        result.horizon_years
    );
    println!("{:>5} {:>16} {:>16}", "Year", "Baseline CF", "Scenario CF");
    println!("{}", "-".repeat(39));
    let years = result.baseline.cashflows.len().max(result.scenario.cashflows.len());
    for t in 0..years {
        let base = result.baseline.cashflows.as_slice().get(t).copied().unwrap_or(0.0);
        let scen = result.scenario.cashflows.as_slice().get(t).copied().unwrap_or(0.0);
        println!("{:>5} {:>16.2} {:>16.2}", t, base, scen);
    }
    println!();
    println!("  Baseline NPV:  {:>16.2}", result.baseline.npv);
    println!("  Scenario NPV:  {:>16.2}", result.scenario.npv);
    println!("  Delta NPV:     {:>16.2}", result.delta_npv);
    println!("  Scenario ROI:  {:>15.2}%", result.scenario_roi_percent);
    println!(
        "  Scenario IRR:  {:>15.2}%  ({:?} after {} iterations)",
        result.scenario.irr * 100.0,
        result.scenario.irr_status,
        result.scenario.irr_iterations
    );
    println!();
}

fn print_sweep(rows: &[SensitivityRow]) {
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>8} {:>14} {:>14} {:>14} {:>9}",
        "Disc", "Growth", "Mult", "Capex", "NWC", "Baseline NPV", "Scenario NPV", "Delta NPV", "IRR"
    );
    println!("{}", "-".repeat(101));
    for row in rows {
        println!(
            "{:>7.2}% {:>7.2}% {:>8.2} {:>7.2}% {:>7.2}% {:>14.2} {:>14.2} {:>14.2} {:>8.2}%",
            row.discount_rate * 100.0,
            row.growth_rate * 100.0,
            row.terminal_multiple,
            row.capex_pct * 100.0,
            row.nwc_pct * 100.0,
            row.baseline_npv,
            row.scenario_npv,
            row.delta_npv,
            row.scenario_irr * 100.0,
        );
    }
    println!("\n{} grid points", rows.len());
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env();

    match cli.command {
        Command::Compare(args) => {
            let (set, config) = args.load(&config)?;
            let result = ScenarioComparator::with_config(config).compare(&set)?;
            if cli.json {
                print_json(&result)?;
            } else {
                print_comparison(&result);
            }
        }
        Command::CompareAll(args) => {
            let (set, config) = args.load(&config)?;
            let results = ScenarioComparator::with_config(config).compare_all(&set)?;
            if cli.json {
                print_json(&results)?;
            } else {
                results.iter().for_each(print_comparison);
            }
        }
        Command::Sweep(args) => {
            let (set, config) = args.projection.load(&config)?;
            let spec = SweepSpec {
                discount_rates: non_empty(&args.discount_rates),
                growth_rates: non_empty(&args.growth_rates),
                terminal_multiples: non_empty(&args.terminal_multiples),
                capex_pcts: non_empty(&args.capex_pcts),
                nwc_pcts: non_empty(&args.nwc_pcts),
            };
            let rows = SensitivityGrid::with_config(config).run(&set, &spec)?;
            if cli.json {
                print_json(&rows)?;
            } else {
                print_sweep(&rows);
            }
        }
        Command::Score(args) => {
            let metrics = CompetitiveMetrics {
                market_share: args.market_share,
                nps_score: args.nps,
                win_loss_ratio: args.win_loss,
                competitor_benchmark: args.benchmark,
            };
            let record = CompetitiveIndexRecord::new(metrics, Utc::now());
            if cli.json {
                print_json(&record)?;
            } else {
                println!("Competitive index: {}", record.score.value());
            }
        }
    }

    Ok(())
}
