//! Display caps applied before layout
//!
//! All functions here are pure: they take the candidate list in input
//! order and return what survives. Input order decides who gets a slot.

use std::collections::{BTreeMap, HashSet};
use chrono::NaiveDate;

/// How the per-day cap turns into a yes/no for a whole bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPolicy {
    /// Admitted iff within the cap on its first visible day
    FirstVisibleDay,
    /// Admitted iff within the cap on at least one visible day
    AnyVisibleDay,
}

impl AdmissionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionPolicy::FirstVisibleDay => "first-day",
            AdmissionPolicy::AnyVisibleDay => "any-day",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "first-day" => Some(AdmissionPolicy::FirstVisibleDay),
            "any-day" => Some(AdmissionPolicy::AnyVisibleDay),
            _ => None,
        }
    }
}

/// For each day, the first `cap` items occupying it, in input order.
///
/// `occupancy[i]` lists the days item `i` occupies. Without a cap every
/// occupant is kept.
pub fn per_day_admission(occupancy: &[Vec<NaiveDate>], cap: Option<usize>) -> BTreeMap<NaiveDate, Vec<usize>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (index, days) in occupancy.iter().enumerate() {
        for day in days {
            let slot = by_day.entry(*day).or_default();
            if !slot.contains(&index) {
                slot.push(index);
            }
        }
    }
    if let Some(cap) = cap {
        for slot in by_day.values_mut() {
            slot.truncate(cap);
        }
    }
    by_day
}

/// Indices of admitted items, in input order
pub fn admit(occupancy: &[Vec<NaiveDate>], cap: Option<usize>, policy: AdmissionPolicy) -> Vec<usize> {
    if cap.is_none() {
        return (0..occupancy.len()).filter(|i| !occupancy[*i].is_empty()).collect();
    }

    let by_day = per_day_admission(occupancy, cap);
    let admitted_on = |day: &NaiveDate, index: usize| {
        by_day.get(day).is_some_and(|slot| slot.contains(&index))
    };

    match policy {
        AdmissionPolicy::FirstVisibleDay => (0..occupancy.len())
            .filter(|index| {
                occupancy[*index]
                    .iter()
                    .min()
                    .is_some_and(|first| admitted_on(first, *index))
            })
            .collect(),
        AdmissionPolicy::AnyVisibleDay => {
            let admitted: HashSet<usize> = by_day.values().flatten().copied().collect();
            (0..occupancy.len()).filter(|index| admitted.contains(index)).collect()
        }
    }
}

/// Keep the first `cap` items; returns the kept items and how many were cut
pub fn truncate_to_cap<T>(mut items: Vec<T>, cap: Option<usize>) -> (Vec<T>, usize) {
    match cap {
        Some(cap) if items.len() > cap => {
            let hidden = items.len() - cap;
            items.truncate(cap);
            (items, hidden)
        }
        _ => (items, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn span(from: u32, to: u32) -> Vec<NaiveDate> {
        (from..=to).map(d).collect()
    }

    #[test]
    fn test_same_day_cap_keeps_input_order() {
        let occupancy = vec![span(10, 10), span(10, 10), span(10, 10)];
        assert_eq!(admit(&occupancy, Some(2), AdmissionPolicy::FirstVisibleDay), vec![0, 1]);
        assert_eq!(admit(&occupancy, Some(2), AdmissionPolicy::AnyVisibleDay), vec![0, 1]);
        assert_eq!(admit(&occupancy, None, AdmissionPolicy::FirstVisibleDay), vec![0, 1, 2]);
    }

    #[test]
    fn test_policies_differ_on_late_room() {
        // item 2 is crowded out on day 1 but alone on day 3
        let occupancy = vec![span(1, 2), span(1, 2), span(1, 3)];
        assert_eq!(admit(&occupancy, Some(2), AdmissionPolicy::FirstVisibleDay), vec![0, 1]);
        assert_eq!(admit(&occupancy, Some(2), AdmissionPolicy::AnyVisibleDay), vec![0, 1, 2]);
    }

    #[test]
    fn test_per_day_table() {
        let occupancy = vec![span(1, 3), span(2, 2), span(2, 4)];
        let by_day = per_day_admission(&occupancy, Some(1));
        assert_eq!(by_day[&d(1)], vec![0]);
        assert_eq!(by_day[&d(2)], vec![0]);
        assert_eq!(by_day[&d(4)], vec![2]);
    }

    #[test]
    fn test_empty_occupancy_never_admitted() {
        let occupancy = vec![Vec::new(), span(5, 5)];
        assert_eq!(admit(&occupancy, None, AdmissionPolicy::AnyVisibleDay), vec![1]);
        assert_eq!(admit(&occupancy, Some(3), AdmissionPolicy::FirstVisibleDay), vec![1]);
    }

    #[test]
    fn test_truncate_to_cap() {
        assert_eq!(truncate_to_cap(vec![1, 2, 3, 4], Some(3)), (vec![1, 2, 3], 1));
        assert_eq!(truncate_to_cap(vec![1, 2], Some(3)), (vec![1, 2], 0));
        assert_eq!(truncate_to_cap(vec![1, 2], None), (vec![1, 2], 0));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(AdmissionPolicy::from_str("first-day"), Some(AdmissionPolicy::FirstVisibleDay));
        assert_eq!(AdmissionPolicy::AnyVisibleDay.as_str(), "any-day");
        assert_eq!(AdmissionPolicy::from_str("sometimes"), None);
    }
}
