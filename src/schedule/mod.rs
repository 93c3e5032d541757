//! Schedule: the loaded registries plus the color allocator that built them
//!
//! `Schedule::load` runs a full rebuild; everything else is a read-only
//! query. Layout borrows the range registry and never mutates it.

pub mod aggregator;

use chrono::NaiveDate;
use log::info;
use crate::color::ColorAssigner;
use crate::config::ScheduleConfig;
use crate::error::{LoadWarning, Result};
use crate::models::{Environment, RawTask, Status, TaskRange};
use crate::utils::date::month_of;

pub use aggregator::{resolve_purposes, Aggregation, RangeAggregator};

#[derive(Debug, Clone)]
pub struct Schedule {
    environments: Vec<Environment>,
    ranges: Vec<TaskRange>,
    warnings: Vec<LoadWarning>,
    colors: ColorAssigner,
}

impl Schedule {
    /// Build registries from records; a fresh color allocator per load
    pub fn load(records: Vec<RawTask>, config: &ScheduleConfig) -> Result<Self> {
        let mut colors = ColorAssigner::new(config.colors.clone());
        let count = records.len();
        let Aggregation { environments, ranges, warnings } = RangeAggregator::new(&mut colors).aggregate(records)?;
        info!(
            "Loaded {} record(s): {} environment(s), {} range(s)",
            count,
            environments.len(),
            ranges.len()
        );
        Ok(Self {
            environments,
            ranges,
            warnings,
            colors,
        })
    }

    /// Load from a JSON array of records
    pub fn from_json(json: &str, config: &ScheduleConfig) -> Result<Self> {
        let records: Vec<RawTask> = serde_json::from_str(json)?;
        Self::load(records, config)
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|environment| environment.name == name)
    }

    pub fn ranges(&self) -> &[TaskRange] {
        &self.ranges
    }

    pub fn range(&self, id: &str) -> Option<&TaskRange> {
        self.ranges.iter().find(|range| range.id == id)
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Distinct batches in range creation order, with their colors
    pub fn batch_colors(&self) -> Vec<(String, String)> {
        let mut seen: Vec<(String, String)> = Vec::new();
        for range in &self.ranges {
            if !seen.iter().any(|(batch, _)| batch == range.batch()) {
                seen.push((range.batch().to_string(), range.batch_color.clone()));
            }
        }
        seen
    }

    pub fn batches(&self) -> Vec<String> {
        self.batch_colors().into_iter().map(|(batch, _)| batch).collect()
    }

    pub fn environment_colors(&self) -> Vec<(String, String)> {
        self.colors.environment_colors()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.colors.statuses()
    }

    pub fn status_colors(&self) -> Vec<(Status, String)> {
        self.colors.status_colors()
    }

    /// Color for any raw status string
    pub fn status_color(&self, raw: &str) -> String {
        self.colors.status_color(raw)
    }

    /// Ranges covering `date`: status priority, then environment, then content
    pub fn ranges_on(&self, date: NaiveDate) -> Vec<&TaskRange> {
        let mut active: Vec<&TaskRange> = self.ranges.iter().filter(|range| range.covers(date)).collect();
        active.sort_by(|a, b| {
            a.status()
                .priority()
                .cmp(&b.status().priority())
                .then_with(|| a.environment().cmp(b.environment()))
                .then_with(|| a.first_content().cmp(b.first_content()))
        });
        active
    }

    /// Month of the earliest day any range covers
    pub fn earliest_month(&self) -> Option<(i32, u32)> {
        self.ranges.iter().map(|range| range.min_date).min().map(month_of)
    }
}
