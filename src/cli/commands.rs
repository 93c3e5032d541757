use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use crate::cli::error::{user_error, validate_environment_names, validate_month_count};
use crate::cli::output::{
    cell_width_for, format_day, format_environments, format_inline_month, format_legend, format_month_layout,
    format_non_working, get_terminal_width, is_tty, TextSizer,
};
use crate::config::ScheduleConfig;
use crate::error::{LayoutDiagnostic, LoadWarning};
use crate::filter::parse_filter_names;
use crate::layout::grid::displayed_months;
use crate::layout::{GridLayoutEngine, MonthView};
use crate::models::{RawTask, Status};
use crate::schedule::Schedule;
use crate::utils::{parse_date_expr, parse_month_spec};

#[derive(Parser)]
#[command(name = "envcal")]
#[command(about = "Environment schedule calendar - month-grid view of environment schedules")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render month calendars
    Render {
        /// JSON file holding an array of schedule records
        file: PathBuf,
        /// First month to show (YYYY-MM); defaults to the earliest scheduled month
        #[arg(long)]
        month: Option<String>,
        /// Number of consecutive months to show (1-12)
        #[arg(long)]
        months: Option<u32>,
        /// Per-day blocks instead of multi-day bars
        #[arg(long)]
        inline: bool,
        /// Only show these environments (repeatable)
        #[arg(long = "env")]
        environments: Vec<String>,
        /// Maximum bars (or blocks) per day; 0 disables the cap
        #[arg(long = "max-display")]
        max_display: Option<usize>,
        /// Inline mode: maximum tasks per block; 0 disables the cap
        #[arg(long = "max-block")]
        max_block: Option<usize>,
        /// Disable all display caps
        #[arg(long = "no-limits")]
        no_limits: bool,
        /// Output the layout as JSON
        #[arg(long)]
        json: bool,
    },
    /// List environments with their purpose and color
    Environments {
        /// JSON file holding an array of schedule records
        file: PathBuf,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show batch and status colors
    Legend {
        /// JSON file holding an array of schedule records
        file: PathBuf,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the work scheduled on one day
    Day {
        /// JSON file holding an array of schedule records
        file: PathBuf,
        /// Date (YYYY-MM-DD, today, tomorrow, yesterday)
        date: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            if e.use_stderr() {
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            file,
            month,
            months,
            inline,
            environments,
            max_display,
            max_block,
            no_limits,
            json,
        } => {
            let options = RenderOptions {
                month,
                months,
                inline,
                environments,
                max_display,
                max_block,
                no_limits,
                json,
            };
            handle_render(&file, options)
        }
        Commands::Environments { file, json } => handle_environments(&file, json),
        Commands::Legend { file, json } => handle_legend(&file, json),
        Commands::Day { file, date, json } => handle_day(&file, &date, json),
    }
}

/// Defaults overlaid with the rc file
fn load_config() -> Result<ScheduleConfig> {
    let path = ScheduleConfig::config_path();
    debug!("Loading configuration from {}", path.display());
    ScheduleConfig::load().with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Read and aggregate a JSON record file
fn load_schedule(path: &Path, config: &ScheduleConfig) -> Result<Schedule> {
    if !path.exists() {
        user_error(&format!("Schedule file not found: {}", path.display()));
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schedule file {}", path.display()))?;
    let records: Vec<RawTask> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid schedule records in {}", path.display()))?;
    let schedule = Schedule::load(records, config)
        .with_context(|| format!("Cannot build a calendar from {}", path.display()))?;

    for warning in schedule.warnings() {
        eprintln!("Warning: {}", warning);
    }
    Ok(schedule)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

struct RenderOptions {
    month: Option<String>,
    months: Option<u32>,
    inline: bool,
    environments: Vec<String>,
    max_display: Option<usize>,
    max_block: Option<usize>,
    no_limits: bool,
    json: bool,
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    months: Vec<MonthView>,
    warnings: &'a [LoadWarning],
}

fn handle_render(file: &Path, options: RenderOptions) -> Result<()> {
    let mut config = load_config()?;

    // Command-line flags override rc values
    if let Some(months) = options.months {
        config.display.months_to_display = validate_month_count(months).unwrap_or_else(|e| user_error(&e));
    }
    if options.inline {
        config.display.spanning = false;
    }
    if let Some(cap) = options.max_display {
        config.display.max_display_tasks = Some(cap);
    }
    if let Some(cap) = options.max_block {
        config.display.max_tasks_in_block = Some(cap);
    }
    if options.no_limits {
        config.display.limits_enabled = false;
    }
    if let Err(e) = validate_environment_names(&options.environments) {
        user_error(&e);
    }
    if !options.json {
        // Terminal units: one line per bar line, no gap between stacked bars
        config.geometry.bar_height = 1.0;
        config.geometry.spacing = 0.0;
        config.geometry.grid_gap = crate::cli::output::GRID_GAP as f64;
    }

    let schedule = load_schedule(file, &config)?;
    let (year, month) = match options.month.as_deref() {
        Some(spec) => parse_month_spec(spec).unwrap_or_else(|e| user_error(&e.to_string())),
        None => match schedule.earliest_month() {
            Some(month) => month,
            None => user_error("No records with a start date; pass --month to choose a month"),
        },
    };
    let count = config.display.months_to_display;

    let filter = parse_filter_names(options.environments.iter().map(String::as_str));
    let engine = GridLayoutEngine::new(&config).with_filter(filter);
    let cell_width = cell_width_for(get_terminal_width());
    let views = if options.json {
        engine.render(schedule.ranges(), year, month, count, &engine.nominal_sizer())?
    } else {
        engine.render(schedule.ranges(), year, month, count, &TextSizer { cell_width })?
    };

    for view in &views {
        if let MonthView::Spanning(layout) = view {
            report_diagnostics(&layout.diagnostics);
        }
    }

    if options.json {
        return print_json(&RenderOutput {
            months: views,
            warnings: schedule.warnings(),
        });
    }

    let use_color = is_tty();
    let mut sections = Vec::with_capacity(views.len() + 1);
    for view in &views {
        sections.push(match view {
            MonthView::Spanning(layout) => format_month_layout(layout, schedule.ranges(), cell_width, use_color),
            MonthView::Inline(inline) => format_inline_month(inline, cell_width, use_color),
        });
    }
    let non_working = config.non_working.in_months(&displayed_months(year, month, count));
    if !non_working.is_empty() {
        sections.push(format_non_working(&non_working));
    }
    println!("{}", sections.join("\n"));
    Ok(())
}

fn report_diagnostics(diagnostics: &[LayoutDiagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("Warning: {}", diagnostic);
    }
}

fn handle_environments(file: &Path, json: bool) -> Result<()> {
    let config = load_config()?;
    let schedule = load_schedule(file, &config)?;
    if json {
        return print_json(&schedule.environments());
    }
    println!("{}", format_environments(schedule.environments(), is_tty()));
    Ok(())
}

#[derive(Serialize)]
struct LegendEntry<T: Serialize> {
    name: T,
    color: String,
}

#[derive(Serialize)]
struct LegendOutput {
    batches: Vec<LegendEntry<String>>,
    statuses: Vec<LegendEntry<Status>>,
}

fn handle_legend(file: &Path, json: bool) -> Result<()> {
    let config = load_config()?;
    let schedule = load_schedule(file, &config)?;
    let batches = schedule.batch_colors();
    let statuses = schedule.status_colors();
    if json {
        return print_json(&LegendOutput {
            batches: batches.into_iter().map(|(name, color)| LegendEntry { name, color }).collect(),
            statuses: statuses.into_iter().map(|(name, color)| LegendEntry { name, color }).collect(),
        });
    }
    println!("{}", format_legend(&batches, &statuses, is_tty()));
    Ok(())
}

fn handle_day(file: &Path, date: &str, json: bool) -> Result<()> {
    let date = parse_date_expr(date).unwrap_or_else(|e| user_error(&e.to_string()));
    let config = load_config()?;
    let schedule = load_schedule(file, &config)?;
    let ranges = schedule.ranges_on(date);
    if json {
        return print_json(&ranges);
    }
    println!("{}", format_day(date, &ranges, is_tty()));
    Ok(())
}
