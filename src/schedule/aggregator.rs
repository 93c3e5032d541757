//! Record aggregation: raw records in, environments and ranges out.
//!
//! Records sharing (environment, batch, normalized status) merge into a
//! single `TaskRange` whose coverage is the union of their day intervals.
//! Gaps stay gaps in the coverage set.

use std::collections::HashMap;
use log::{debug, warn};
use crate::color::ColorAssigner;
use crate::error::{LoadWarning, Result, ScheduleError};
use crate::models::{normalize_status, Environment, RangeColors, RangeKey, RawTask, TaskRange, DEFAULT_PURPOSE};

/// Result of one aggregation pass, registries in creation order
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub environments: Vec<Environment>,
    pub ranges: Vec<TaskRange>,
    pub warnings: Vec<LoadWarning>,
}

/// Latest meaningful purpose per (environment, batch)
pub fn resolve_purposes(records: &[RawTask]) -> HashMap<(String, String), String> {
    let mut purposes = HashMap::new();
    for record in records {
        if let Some(purpose) = record.meaningful_purpose() {
            purposes.insert(
                (record.environment.clone(), record.batch_or_default().to_string()),
                purpose.to_string(),
            );
        }
    }
    purposes
}

pub struct RangeAggregator<'a> {
    colors: &'a mut ColorAssigner,
}

impl<'a> RangeAggregator<'a> {
    pub fn new(colors: &'a mut ColorAssigner) -> Self {
        Self { colors }
    }

    pub fn aggregate(&mut self, records: Vec<RawTask>) -> Result<Aggregation> {
        if records.is_empty() {
            return Err(ScheduleError::EmptyInput);
        }

        let purposes = resolve_purposes(&records);
        let mut output = Aggregation::default();
        let mut environment_index: HashMap<String, usize> = HashMap::new();
        let mut range_index: HashMap<RangeKey, usize> = HashMap::new();

        for (index, record) in records.into_iter().enumerate() {
            self.register_environment(&mut output.environments, &mut environment_index, &record);

            let Some(start) = record.start_date else {
                let warning = LoadWarning::MissingStartDate {
                    index,
                    environment: record.environment.clone(),
                };
                warn!("{}", warning);
                output.warnings.push(warning);
                continue;
            };

            let end = match record.end_date {
                Some(end) if end < start => {
                    let warning = LoadWarning::EndBeforeStart {
                        index,
                        environment: record.environment.clone(),
                        start,
                        end,
                    };
                    warn!("{}", warning);
                    output.warnings.push(warning);
                    start
                }
                Some(end) => end,
                None => start,
            };

            let key = RangeKey::new(
                record.environment.clone(),
                record.batch_or_default(),
                normalize_status(&record.status),
            );

            if let Some(existing) = range_index.get(&key) {
                output.ranges[*existing].merge(start, end, record);
                continue;
            }

            let colors = RangeColors {
                environment: self.colors.environment_color(&key.environment),
                batch: self.colors.batch_color(&key.batch),
                status: self.colors.color_of_status(key.status),
            };
            let purpose = purposes
                .get(&(key.environment.clone(), key.batch.clone()))
                .cloned()
                .unwrap_or_else(|| DEFAULT_PURPOSE.to_string());

            debug!("New range '{}' starting {}", key.id(), start);
            range_index.insert(key.clone(), output.ranges.len());
            output.ranges.push(TaskRange::new(key, start, end, record, colors, purpose));
        }

        debug!(
            "Aggregated {} environment(s) into {} range(s), {} warning(s)",
            output.environments.len(),
            output.ranges.len(),
            output.warnings.len()
        );
        Ok(output)
    }

    fn register_environment(
        &mut self,
        environments: &mut Vec<Environment>,
        index: &mut HashMap<String, usize>,
        record: &RawTask,
    ) {
        let position = match index.get(&record.environment) {
            Some(position) => *position,
            None => {
                let color = self.colors.environment_color(&record.environment);
                debug!("Registered environment '{}' with color {}", record.environment, color);
                index.insert(record.environment.clone(), environments.len());
                environments.push(Environment::new(record.environment.clone(), color));
                environments.len() - 1
            }
        };

        environments[position].tasks.push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use crate::config::ColorConfig;
    use crate::models::{Status, DEFAULT_BATCH};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn aggregate(records: Vec<RawTask>) -> Result<Aggregation> {
        let mut colors = ColorAssigner::new(ColorConfig::default());
        RangeAggregator::new(&mut colors).aggregate(records)
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(aggregate(Vec::new()), Err(ScheduleError::EmptyInput)));
    }

    #[test]
    fn test_single_day_range() {
        let records = vec![RawTask::new("A", "進行中").with_batch("1").with_dates(d(2024, 1, 10), None)];
        let output = aggregate(records).unwrap();
        assert_eq!(output.ranges.len(), 1);
        let range = &output.ranges[0];
        assert_eq!(range.status(), Status::Preparing);
        assert_eq!(range.coverage.iter().copied().collect::<Vec<_>>(), vec![d(2024, 1, 10)]);
        assert_eq!(range.id, "A_1_準備中");
    }

    #[test]
    fn test_disjoint_intervals_merge() {
        let records = vec![
            RawTask::new("A", "完成").with_batch("1").with_dates(d(2024, 1, 1), Some(d(2024, 1, 2))),
            RawTask::new("A", "已完成").with_batch("1").with_dates(d(2024, 1, 5), Some(d(2024, 1, 6))),
        ];
        let output = aggregate(records).unwrap();
        assert_eq!(output.ranges.len(), 1);
        let range = &output.ranges[0];
        let days: Vec<u32> = range.coverage.iter().map(|day| day.day()).collect();
        assert_eq!(days, vec![1, 2, 5, 6]);
        assert_eq!((range.min_date, range.max_date), (d(2024, 1, 1), d(2024, 1, 6)));
        assert_eq!(range.tasks.len(), 2);
    }

    #[test]
    fn test_different_status_splits_ranges() {
        let records = vec![
            RawTask::new("A", "準備中").with_dates(d(2024, 1, 1), None),
            RawTask::new("A", "測試中").with_dates(d(2024, 1, 1), None),
            RawTask::new("B", "準備中").with_dates(d(2024, 1, 1), None),
        ];
        let output = aggregate(records).unwrap();
        let ids: Vec<&str> = output.ranges.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                format!("A_{}_準備中", DEFAULT_BATCH),
                format!("A_{}_驗證中", DEFAULT_BATCH),
                format!("B_{}_準備中", DEFAULT_BATCH),
            ]
        );
    }

    #[test]
    fn test_missing_start_and_reversed_end() {
        let records = vec![
            RawTask::new("A", "完成"),
            RawTask::new("B", "完成").with_dates(d(2024, 1, 9), Some(d(2024, 1, 3))),
        ];
        let output = aggregate(records).unwrap();
        // environment without placeable records is still registered
        assert_eq!(output.environments.len(), 2);
        assert_eq!(output.environments[0].tasks.len(), 1);
        assert_eq!(output.ranges.len(), 1);
        assert_eq!(output.ranges[0].coverage.len(), 1);
        assert_eq!(
            output.warnings,
            vec![
                LoadWarning::MissingStartDate { index: 0, environment: "A".into() },
                LoadWarning::EndBeforeStart {
                    index: 1,
                    environment: "B".into(),
                    start: d(2024, 1, 9),
                    end: d(2024, 1, 3),
                },
            ]
        );
    }

    #[test]
    fn test_purpose_resolution() {
        let records = vec![
            RawTask::new("A", "完成").with_batch("1").with_purpose("first").with_dates(d(2024, 1, 1), None),
            RawTask::new("A", "完成").with_batch("1").with_purpose("").with_dates(d(2024, 1, 2), None),
            RawTask::new("A", "完成").with_batch("1").with_purpose("latest").with_dates(d(2024, 1, 3), None),
            RawTask::new("A", "完成").with_batch("1").with_purpose(DEFAULT_PURPOSE).with_dates(d(2024, 1, 4), None),
            RawTask::new("A", "完成").with_batch("2").with_dates(d(2024, 1, 4), None),
        ];
        let output = aggregate(records).unwrap();
        assert_eq!(output.ranges[0].purpose, "latest");
        assert_eq!(output.ranges[1].purpose, DEFAULT_PURPOSE);
        assert_eq!(output.environments[0].purpose, DEFAULT_PURPOSE);
    }

    #[test]
    fn test_environment_colors_assigned_in_first_appearance_order() {
        let records = vec![
            RawTask::new("X", "完成").with_dates(d(2024, 1, 1), None),
            RawTask::new("IT準備", "完成").with_dates(d(2024, 1, 1), None),
            RawTask::new("Y", "完成").with_dates(d(2024, 1, 1), None),
        ];
        let output = aggregate(records).unwrap();
        let colors: Vec<&str> = output.environments.iter().map(|e| e.color.as_str()).collect();
        // override does not consume a palette slot
        assert_eq!(colors, vec!["#dc2626", "#16537e", "#b91c1c"]);
        assert_eq!(output.ranges[2].environment_color, "#b91c1c");
    }
}
