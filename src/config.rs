//! Configuration
//!
//! `ScheduleConfig::default()` carries the stock palettes and display
//! limits. The CLI layers an rc file (`~/.envcal/rc`, `key=value` lines)
//! on top; library callers build the struct directly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use log::warn;
use crate::calendar::{CustomDay, NonWorkingDays};
use crate::error::{Result, ScheduleError};
use crate::layout::limits::AdmissionPolicy;
use crate::models::{normalize_status, Status};

/// What to do once a palette's colors have all been handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorStrategy {
    /// Wrap around and reuse palette entries
    Repeat,
    /// Synthesize new, evenly spread hues
    Generate,
}

#[derive(Debug, Clone)]
pub struct ColorConfig {
    /// Fixed colors for specific environments, checked before the palette
    pub environment_overrides: BTreeMap<String, String>,
    pub environment_palette: Vec<String>,
    pub batch_palette: Vec<String>,
    pub status_colors: BTreeMap<Status, String>,
    pub strategy: ColorStrategy,
    /// Same name always gets the same color
    pub consistent: bool,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let environment_overrides = [
            ("IT準備", "#16537e"),
            ("平測切轉環境", "#10b981"),
            ("資轉驗證環境", "#dc2626"),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color.to_string()))
        .collect();

        let status_colors = [
            (Status::NotStarted, "#9ca3af"),
            (Status::Preparing, "#3b82f6"),
            (Status::Verifying, "#ef4444"),
            (Status::Completed, "#10b981"),
        ]
        .into_iter()
        .map(|(status, color)| (status, color.to_string()))
        .collect();

        Self {
            environment_overrides,
            environment_palette: to_strings(&[
                "#dc2626", "#b91c1c", "#991b1b", "#7f1d1d",
                "#ef4444", "#f87171", "#fca5a5", "#fee2e2",
            ]),
            batch_palette: to_strings(&[
                "#dbeafe", "#93c5fd", "#3b82f6", "#1e40af", "#c4b5fd", "#7c3aed",
            ]),
            status_colors,
            strategy: ColorStrategy::Repeat,
            consistent: true,
        }
    }
}

/// Display limits and mode
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Per-day cap on bars (spanning) or blocks (inline); `None`/0 = no cap
    pub max_display_tasks: Option<usize>,
    /// Inline mode: cap on tasks listed inside one block
    pub max_tasks_in_block: Option<usize>,
    pub limits_enabled: bool,
    /// Multi-day bars when true, per-day blocks when false
    pub spanning: bool,
    pub months_to_display: u32,
    pub admission: AdmissionPolicy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_display_tasks: Some(3),
            max_tasks_in_block: Some(3),
            limits_enabled: true,
            spanning: true,
            months_to_display: 1,
            admission: AdmissionPolicy::FirstVisibleDay,
        }
    }
}

impl DisplayConfig {
    /// Effective per-day cap after the enable switch and the 0 = off rule
    pub fn day_cap(&self) -> Option<usize> {
        self.max_display_tasks.filter(|cap| self.limits_enabled && *cap > 0)
    }

    pub fn block_cap(&self) -> Option<usize> {
        self.max_tasks_in_block.filter(|cap| self.limits_enabled && *cap > 0)
    }
}

/// Bar geometry in renderer units (pixels for a browser, lines for a terminal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutGeometry {
    pub bar_height: f64,
    pub spacing: f64,
    pub grid_gap: f64,
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self {
            bar_height: 18.0,
            spacing: 4.0,
            grid_gap: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleConfig {
    pub colors: ColorConfig,
    pub display: DisplayConfig,
    pub geometry: LayoutGeometry,
    pub non_working: NonWorkingDays,
}

impl ScheduleConfig {
    /// Get the rc file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".envcal")
            .join("rc")
    }

    /// Defaults overlaid with the rc file, if one exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::from_rc_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_rc_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_rc_str(&contents)
    }

    /// Parse rc contents on top of the defaults
    pub fn from_rc_str(contents: &str) -> Result<Self> {
        let mut config = Self::default();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| ScheduleError::InvalidConfig {
                line: index + 1,
                message: format!("expected key=value, got '{}'", line),
            })?;
            config
                .apply(key.trim(), value.trim())
                .map_err(|message| ScheduleError::InvalidConfig { line: index + 1, message })?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        if let Some(name) = key.strip_prefix("colors.environment.") {
            self.colors.environment_overrides.insert(name.to_string(), parse_color(value)?);
            return Ok(());
        }
        if let Some(name) = key.strip_prefix("colors.status.") {
            self.colors.status_colors.insert(normalize_status(name), parse_color(value)?);
            return Ok(());
        }

        match key {
            "calendar.max_display_tasks" => self.display.max_display_tasks = Some(parse_usize(key, value)?),
            "calendar.max_tasks_in_block" => self.display.max_tasks_in_block = Some(parse_usize(key, value)?),
            "calendar.limits_enabled" => self.display.limits_enabled = parse_bool(key, value)?,
            "calendar.spanning" => self.display.spanning = parse_bool(key, value)?,
            "calendar.months" => {
                let months = parse_usize(key, value)?;
                if !(1..=12).contains(&months) {
                    return Err(format!("calendar.months must be between 1 and 12, got {}", months));
                }
                self.display.months_to_display = months as u32;
            }
            "calendar.admission" => {
                self.display.admission = AdmissionPolicy::from_str(value)
                    .ok_or_else(|| format!("calendar.admission must be 'first-day' or 'any-day', got '{}'", value))?;
            }
            "layout.bar_height" => self.geometry.bar_height = parse_f64(key, value)?,
            "layout.spacing" => self.geometry.spacing = parse_f64(key, value)?,
            "layout.grid_gap" => self.geometry.grid_gap = parse_f64(key, value)?,
            "colors.strategy" => {
                self.colors.strategy = match value {
                    "repeat" => ColorStrategy::Repeat,
                    "generate" => ColorStrategy::Generate,
                    other => return Err(format!("colors.strategy must be 'repeat' or 'generate', got '{}'", other)),
                };
            }
            "colors.consistent" => self.colors.consistent = parse_bool(key, value)?,
            "colors.environment_palette" => self.colors.environment_palette = parse_palette(value)?,
            "colors.batch_palette" => self.colors.batch_palette = parse_palette(value)?,
            "nonworking.enabled" => self.non_working.enabled = parse_bool(key, value)?,
            "nonworking.weekends" => self.non_working.include_weekends = parse_bool(key, value)?,
            "nonworking.day" => {
                let (date, description) = split_description(value);
                let date = parse_iso(date)?;
                self.non_working.custom.push(CustomDay::single(date, description));
            }
            "nonworking.range" => {
                let (span, description) = split_description(value);
                let (start, end) = span
                    .split_once("..")
                    .ok_or_else(|| format!("nonworking.range expects START..END, got '{}'", span))?;
                let start = parse_iso(start)?;
                let end = parse_iso(end)?;
                if end < start {
                    return Err(format!("nonworking.range ends before it starts: '{}'", span));
                }
                self.non_working.custom.push(CustomDay { start, end, description });
            }
            _ => warn!("Ignoring unknown configuration key '{}'", key),
        }
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn parse_usize(key: &str, value: &str) -> std::result::Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("{} must be a non-negative integer, got '{}'", key, value))
}

fn parse_f64(key: &str, value: &str) -> std::result::Result<f64, String> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() && number >= 0.0 => Ok(number),
        _ => Err(format!("{} must be a non-negative number, got '{}'", key, value)),
    }
}

fn parse_bool(key: &str, value: &str) -> std::result::Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("{} must be true or false, got '{}'", key, value)),
    }
}

/// Accepts `#rrggbb` only
fn parse_color(value: &str) -> std::result::Result<String, String> {
    if crate::color::parse_hex(value).is_some() {
        Ok(value.to_lowercase())
    } else {
        Err(format!("invalid color '{}': expected #rrggbb", value))
    }
}

fn parse_palette(value: &str) -> std::result::Result<Vec<String>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_color)
        .collect()
}

fn parse_iso(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", value.trim()))
}

/// `2026-01-01:New Year` -> ("2026-01-01", Some("New Year"))
fn split_description(value: &str) -> (&str, Option<String>) {
    match value.split_once(':') {
        Some((date, description)) if !description.trim().is_empty() => {
            (date.trim(), Some(description.trim().to_string()))
        }
        Some((date, _)) => (date.trim(), None),
        None => (value.trim(), None),
    }
}
