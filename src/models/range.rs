use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use super::status::Status;
use super::task::RawTask;
use crate::utils::date::days_between;

/// Identity of a range: one bar per (environment, batch, status)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RangeKey {
    pub environment: String,
    pub batch: String,
    pub status: Status,
}

impl RangeKey {
    pub fn new(environment: impl Into<String>, batch: impl Into<String>, status: Status) -> Self {
        Self {
            environment: environment.into(),
            batch: batch.into(),
            status,
        }
    }

    /// Joined display id, e.g. `UAT_第一梯次_準備中`
    pub fn id(&self) -> String {
        format!("{}_{}_{}", self.environment, self.batch, self.status.label())
    }
}

/// Merged group of records sharing environment, batch and status
#[derive(Debug, Clone, Serialize)]
pub struct TaskRange {
    pub id: String,
    pub key: RangeKey,
    pub coverage: BTreeSet<NaiveDate>,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub environment_color: String,
    pub purpose: String,
    pub batch_color: String,
    pub status_color: String,
    pub tasks: Vec<RawTask>,
}

impl TaskRange {
    /// Start a range from its first record's closed day interval
    pub fn new(
        key: RangeKey,
        start: NaiveDate,
        end: NaiveDate,
        first: RawTask,
        colors: RangeColors,
        purpose: String,
    ) -> Self {
        Self {
            id: key.id(),
            key,
            coverage: days_between(start, end).collect(),
            min_date: start,
            max_date: end,
            environment_color: colors.environment,
            purpose,
            batch_color: colors.batch,
            status_color: colors.status,
            tasks: vec![first],
        }
    }

    /// Union another closed interval into this range and record the task
    pub fn merge(&mut self, start: NaiveDate, end: NaiveDate, task: RawTask) {
        self.coverage.extend(days_between(start, end));
        self.min_date = self.min_date.min(start);
        self.max_date = self.max_date.max(end);
        self.tasks.push(task);
    }

    pub fn environment(&self) -> &str {
        &self.key.environment
    }

    pub fn batch(&self) -> &str {
        &self.key.batch
    }

    pub fn status(&self) -> Status {
        self.key.status
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.coverage.contains(&date)
    }

    /// Coverage days falling inside the given calendar month, ascending
    pub fn days_in_month(&self, year: i32, month: u32) -> impl Iterator<Item = NaiveDate> + '_ {
        self.coverage
            .iter()
            .copied()
            .filter(move |day| day.year() == year && day.month() == month)
    }

    /// First and last coverage day inside a month; gaps are ignored
    pub fn visible_span(&self, year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
        let mut days = self.days_in_month(year, month);
        let first = days.next()?;
        let last = days.last().unwrap_or(first);
        Some((first, last))
    }

    /// Text of the first record, used as a sort tiebreaker
    pub fn first_content(&self) -> &str {
        self.tasks
            .first()
            .and_then(|task| task.content.as_deref())
            .unwrap_or("")
    }
}

/// Colors snapshotted onto a range when it is created
#[derive(Debug, Clone)]
pub struct RangeColors {
    pub environment: String,
    pub batch: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn colors() -> RangeColors {
        RangeColors {
            environment: "#dc2626".to_string(),
            batch: "#dbeafe".to_string(),
            status: "#3b82f6".to_string(),
        }
    }

    #[test]
    fn test_range_id() {
        let key = RangeKey::new("UAT", "1", Status::Preparing);
        assert_eq!(key.id(), "UAT_1_準備中");
    }

    #[test]
    fn test_merge_keeps_gaps() {
        let key = RangeKey::new("A", "1", Status::NotStarted);
        let mut range = TaskRange::new(key, d(2024, 1, 1), d(2024, 1, 2), RawTask::new("A", ""), colors(), "p".into());
        range.merge(d(2024, 1, 5), d(2024, 1, 6), RawTask::new("A", ""));

        let days: Vec<u32> = range.coverage.iter().map(|d| d.day()).collect();
        assert_eq!(days, vec![1, 2, 5, 6]);
        assert_eq!(range.min_date, d(2024, 1, 1));
        assert_eq!(range.max_date, d(2024, 1, 6));
        assert_eq!(range.tasks.len(), 2);
        assert!(!range.covers(d(2024, 1, 3)));
    }

    #[test]
    fn test_visible_span_clips_to_month() {
        let key = RangeKey::new("A", "1", Status::NotStarted);
        let range = TaskRange::new(key, d(2024, 1, 29), d(2024, 2, 3), RawTask::new("A", ""), colors(), "p".into());

        assert_eq!(range.visible_span(2024, 1), Some((d(2024, 1, 29), d(2024, 1, 31))));
        assert_eq!(range.visible_span(2024, 2), Some((d(2024, 2, 1), d(2024, 2, 3))));
        assert_eq!(range.visible_span(2024, 3), None);
    }
}
