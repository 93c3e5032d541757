//! Environment filter evaluator
//!
//! Anything that belongs to an environment implements `EnvironmentScoped`
//! and can be narrowed with `filter_by_environment`.

use std::collections::BTreeSet;
use crate::models::{Environment, RawTask, TaskRange};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvironmentFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl EnvironmentFilter {
    pub fn matches(&self, environment: &str) -> bool {
        match self {
            EnvironmentFilter::All => true,
            EnvironmentFilter::Only(names) => names.contains(environment),
        }
    }
}

pub trait EnvironmentScoped {
    fn environment_name(&self) -> &str;
}

impl EnvironmentScoped for TaskRange {
    fn environment_name(&self) -> &str {
        self.environment()
    }
}

impl EnvironmentScoped for RawTask {
    fn environment_name(&self) -> &str {
        &self.environment
    }
}

impl EnvironmentScoped for Environment {
    fn environment_name(&self) -> &str {
        &self.name
    }
}

impl<T: EnvironmentScoped> EnvironmentScoped for &T {
    fn environment_name(&self) -> &str {
        (*self).environment_name()
    }
}

/// Items whose environment passes the filter, order preserved
pub fn filter_by_environment<'a, T: EnvironmentScoped>(items: &'a [T], filter: &EnvironmentFilter) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| filter.matches(item.environment_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filter;

    #[test]
    fn test_matches() {
        assert!(EnvironmentFilter::All.matches("anything"));
        let filter = parse_filter("SIT,UAT");
        assert!(filter.matches("SIT"));
        assert!(!filter.matches("PROD"));
        assert!(!filter.matches("sit"));
    }

    #[test]
    fn test_filter_by_environment_keeps_order() {
        let tasks = vec![
            RawTask::new("UAT", "1"),
            RawTask::new("PROD", "2"),
            RawTask::new("SIT", "3"),
            RawTask::new("UAT", "4"),
        ];
        let kept = filter_by_environment(&tasks, &parse_filter("UAT,SIT"));
        let statuses: Vec<&str> = kept.iter().map(|t| t.status.as_str()).collect();
        assert_eq!(statuses, vec!["1", "3", "4"]);

        assert_eq!(filter_by_environment(&tasks, &EnvironmentFilter::All).len(), 4);
    }
}
