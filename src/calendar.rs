//! Non-working day calendar
//!
//! Weekends plus configured holidays. Grid cells carry the description so
//! renderers can shade them and show why the day is off.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// A configured holiday or closure, inclusive on both ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomDay {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: Option<String>,
}

impl CustomDay {
    pub fn single(date: NaiveDate, description: Option<String>) -> Self {
        Self { start: date, end: date, description }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NonWorkingDays {
    pub enabled: bool,
    pub include_weekends: bool,
    pub custom: Vec<CustomDay>,
}

impl Default for NonWorkingDays {
    fn default() -> Self {
        Self {
            enabled: true,
            include_weekends: true,
            custom: Vec::new(),
        }
    }
}

impl NonWorkingDays {
    fn weekend_name(&self, date: NaiveDate) -> Option<&'static str> {
        if !self.include_weekends {
            return None;
        }
        match date.weekday() {
            Weekday::Sat => Some("Saturday"),
            Weekday::Sun => Some("Sunday"),
            _ => None,
        }
    }

    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        self.enabled
            && (self.weekend_name(date).is_some() || self.custom.iter().any(|day| day.contains(date)))
    }

    /// Why a day is off: a custom description wins over the weekday name
    pub fn description(&self, date: NaiveDate) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let custom = self
            .custom
            .iter()
            .filter(|day| day.contains(date))
            .find_map(|day| day.description.clone());
        custom.or_else(|| self.weekend_name(date).map(str::to_string))
    }

    /// Configured holidays falling inside any of the given months, sorted.
    /// Plain weekends are left out; the grid already shows them.
    pub fn in_months(&self, months: &[(i32, u32)]) -> Vec<(NaiveDate, Option<String>)> {
        if !self.enabled {
            return Vec::new();
        }
        let mut days: Vec<(NaiveDate, Option<String>)> = Vec::new();
        for custom in &self.custom {
            for date in crate::utils::date::days_between(custom.start, custom.end) {
                let in_view = months.iter().any(|(y, m)| date.year() == *y && date.month() == *m);
                if in_view && !days.iter().any(|(seen, _)| *seen == date) {
                    days.push((date, custom.description.clone()));
                }
            }
        }
        days.sort_by_key(|(date, _)| *date);
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn calendar() -> NonWorkingDays {
        NonWorkingDays {
            enabled: true,
            include_weekends: true,
            custom: vec![
                CustomDay::single(d(2026, 1, 1), Some("New Year".to_string())),
                CustomDay { start: d(2026, 2, 13), end: d(2026, 2, 16), description: Some("Lunar New Year".to_string()) },
            ],
        }
    }

    #[test]
    fn test_weekends_and_holidays() {
        let cal = calendar();
        // 2026-01-03 is a Saturday
        assert!(cal.is_non_working(d(2026, 1, 3)));
        assert!(cal.is_non_working(d(2026, 1, 1)));
        assert!(cal.is_non_working(d(2026, 2, 16)));
        assert!(!cal.is_non_working(d(2026, 1, 2)));
    }

    #[test]
    fn test_description_prefers_custom() {
        let cal = calendar();
        // 2026-02-14 is a Saturday inside the holiday range
        assert_eq!(cal.description(d(2026, 2, 14)).as_deref(), Some("Lunar New Year"));
        assert_eq!(cal.description(d(2026, 1, 4)).as_deref(), Some("Sunday"));
        assert_eq!(cal.description(d(2026, 1, 5)), None);
    }

    #[test]
    fn test_disabled_calendar() {
        let mut cal = calendar();
        cal.enabled = false;
        assert!(!cal.is_non_working(d(2026, 1, 1)));
        assert_eq!(cal.description(d(2026, 1, 3)), None);
        assert!(cal.in_months(&[(2026, 1)]).is_empty());
    }

    #[test]
    fn test_in_months() {
        let cal = calendar();
        let days = cal.in_months(&[(2026, 2)]);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0].0, d(2026, 2, 13));
        assert_eq!(days[3].0, d(2026, 2, 16));
    }
}
