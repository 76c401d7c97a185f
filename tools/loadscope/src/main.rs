//! Loadscope - Zone Load Explorer
//!
//! Loads a zone load export, applies a time window, zone selection and
//! resample rule, and prints the dashboard figures as tables or JSON.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use common::{DashboardConfig, LogConfig};
use gridload_model::{
    build_view, parse_timestamp, Dataset, DatasetCache, ResampleRule, TimeWindow, TopN,
    ViewDefaults, ViewParams, ZoneSelection,
};
use serde_json::json;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "loadscope")]
#[command(about = "Zone load explorer for PJM-style load exports")]
#[command(long_about = "Zone load explorer for PJM-style load exports

Commands:
  zones      List the dataset's time column and zones
  summary    KPIs for the current window and selection
  trend      Resampled series for the selected zones
  ranking    Top and bottom zones by average load
  daily      Daily averages of the target zone
  hourly     Hour-of-day profile of the target zone
  view       Everything above in one report
  config     Print the effective configuration

Examples:
  loadscope --data load.csv zones
  loadscope --data load.csv --zones pjm_rto,dom --rule 15T trend
  loadscope --data load.csv --start 2024-07-01 --end 2024-07-07 summary
  loadscope --data load.csv --json view")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Dataset file (CSV with a header row)
    #[arg(short = 'd', long, global = true)]
    data: Option<PathBuf>,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Window start, e.g. 2024-07-01 or "2024-07-01 06:00" (default: 3 days before the last record)
    #[arg(long, global = true)]
    start: Option<String>,

    /// Window end (default: last record)
    #[arg(long, global = true)]
    end: Option<String>,

    /// Comma-separated zone selection
    #[arg(short = 'z', long, global = true)]
    zones: Option<ZoneSelection>,

    /// Resample rule: 5T, 15T, 30T, 1H, 6H or 1D
    #[arg(short = 'r', long, global = true)]
    rule: Option<ResampleRule>,

    /// Number of zones in the top/bottom rankings (3-10)
    #[arg(short = 'n', long = "top-n", global = true)]
    top_n: Option<TopN>,

    /// Use this column as the timestamp instead of detecting one
    #[arg(long, global = true)]
    timestamp_column: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// List the dataset's time column and zones
    Zones,
    /// KPIs for the current window and selection
    Summary,
    /// Resampled series for the selected zones
    Trend,
    /// Top and bottom zones by average load
    Ranking,
    /// Daily averages of the target zone
    Daily,
    /// Hour-of-day profile of the target zone
    Hourly,
    /// Full dashboard report
    View,
    /// Print the effective configuration
    Config,
}

/// Parameter overrides taken from the command line
#[derive(Debug, Clone, Default)]
struct ViewOverrides {
    start: Option<String>,
    end: Option<String>,
    zones: Option<ZoneSelection>,
    rule: Option<ResampleRule>,
    top_n: Option<TopN>,
}

impl From<&Cli> for ViewOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            start: cli.start.clone(),
            end: cli.end.clone(),
            zones: cli.zones.clone(),
            rule: cli.rule,
            top_n: cli.top_n,
        }
    }
}

fn parse_bound(label: &str, text: &str) -> Result<chrono::NaiveDateTime> {
    parse_timestamp(text).with_context(|| format!("Invalid --{} timestamp: '{}'", label, text))
}

/// Dataset defaults with command-line overrides applied
///
/// A lone `--start` or `--end` keeps the other bound at the dataset edge.
fn resolve_params(
    dataset: &Dataset,
    defaults: &ViewDefaults,
    overrides: &ViewOverrides,
) -> Result<ViewParams> {
    let mut params = ViewParams::defaults_for(dataset, defaults);

    if overrides.start.is_some() || overrides.end.is_some() {
        let (first, last) = dataset
            .time_bounds()
            .context("Dataset has no records")?;
        let start = match &overrides.start {
            Some(text) => parse_bound("start", text)?,
            None => first,
        };
        let end = match &overrides.end {
            Some(text) => parse_bound("end", text)?,
            None => last,
        };
        params.window = Some(TimeWindow::new(start, end)?);
    }

    if let Some(zones) = &overrides.zones {
        params.selection = zones.clone();
    }
    if let Some(rule) = overrides.rule {
        params.rule = rule;
    }
    if let Some(top_n) = overrides.top_n {
        params.top_n = top_n;
    }

    Ok(params)
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(column) = &cli.timestamp_column {
        config.timestamp_column = Some(column.clone());
    }
    if let Some(data) = &cli.data {
        config.data_path = Some(data.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = load_config(&cli)?;

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    };
    common::logging::init_with_config(LogConfig {
        app_name: "loadscope".to_string(),
        level,
        log_dir: config.log_dir.clone(),
        ansi: !cli.no_color,
    })?;

    if cli.command == Commands::Config {
        if cli.json {
            render::print_json(&config)?;
        } else {
            print!("{}", config.to_yaml()?);
        }
        return Ok(());
    }

    let data_path = config
        .data_path
        .clone()
        .context("No dataset given: pass --data or set data_path in the configuration")?;

    let cache = DatasetCache::csv(config.timestamp_resolver());
    let dataset = cache
        .get_or_load(&data_path)
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;

    if cli.command == Commands::Zones {
        if cli.json {
            render::print_json(&json!({
                "time_column": dataset.time_column(),
                "records": dataset.len(),
                "range": dataset.time_bounds(),
                "zones": dataset.zones(),
            }))?;
        } else {
            render::print_zones(&dataset);
        }
        return Ok(());
    }

    let params = resolve_params(&dataset, &config.view_defaults()?, &ViewOverrides::from(&cli))?;
    debug!("View parameters: {:?}", params);
    let view = build_view(&dataset, &params, &config.target_selector());

    if view.record_count == 0 && !cli.json {
        eprintln!("{} The selected window contains no records", "WARN".yellow());
    }

    match cli.command {
        Commands::Summary => {
            if cli.json {
                render::print_json(&json!({
                    "params": view.params,
                    "kpi_target": view.kpi_target,
                    "kpis": view.kpis,
                }))?;
            } else {
                render::print_summary(&view);
            }
        },
        Commands::Trend => {
            if cli.json {
                render::print_json(&view.trend)?;
            } else {
                render::print_trend(&view);
            }
        },
        Commands::Ranking => {
            if cli.json {
                render::print_json(&json!({
                    "top": view.top_zones,
                    "bottom": view.bottom_zones,
                }))?;
            } else {
                render::print_ranking(&view);
            }
        },
        Commands::Daily => {
            if cli.json {
                render::print_json(&view.daily)?;
            } else {
                render::print_daily(view.daily.as_ref());
            }
        },
        Commands::Hourly => {
            if cli.json {
                render::print_json(&view.hourly)?;
            } else {
                render::print_hourly(view.hourly.as_ref());
            }
        },
        Commands::View => {
            if cli.json {
                render::print_json(&view)?;
            } else {
                render::print_view(&view);
            }
        },
        Commands::Zones | Commands::Config => {},
    }

    Ok(())
}
