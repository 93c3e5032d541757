//! Month grid: the day-cell sequence one month panel is drawn on
//!
//! Weeks start on Sunday. The grid begins on the Sunday on or before the
//! 1st and ends on the Saturday on or after the last day, so it holds
//! 4 to 6 rows of 7 cells, including days borrowed from adjacent months.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use crate::calendar::NonWorkingDays;
use crate::error::{Result, ScheduleError};
use crate::utils::date::{add_months, days_in_month, first_of_month};

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for leading/trailing days borrowed from adjacent months
    pub in_month: bool,
    pub non_working: bool,
    /// Holiday name or weekday name for non-working days
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn new(year: i32, month: u32, non_working: &NonWorkingDays) -> Result<Self> {
        let first = first_of_month(year, month)
            .ok_or_else(|| ScheduleError::InvalidDate(format!("{}-{:02}", year, month)))?;
        let leading = first.weekday().num_days_from_sunday() as usize;
        let total = (leading + days_in_month(year, month) as usize).div_ceil(DAYS_PER_WEEK) * DAYS_PER_WEEK;
        let grid_start = first - Duration::days(leading as i64);

        let cells = grid_start
            .iter_days()
            .take(total)
            .map(|date| DayCell {
                date,
                in_month: date.year() == year && date.month() == month,
                non_working: non_working.is_non_working(date),
                note: non_working.description(date),
            })
            .collect();

        Ok(Self { year, month, cells })
    }

    pub fn rows(&self) -> usize {
        self.cells.len() / DAYS_PER_WEEK
    }

    /// Index of the cell showing `date`, if the grid shows it
    pub fn cell_index(&self, date: NaiveDate) -> Option<usize> {
        let first = self.cells.first()?.date;
        let offset = (date - first).num_days();
        if offset < 0 || offset as usize >= self.cells.len() {
            return None;
        }
        Some(offset as usize)
    }

    /// Cells belonging to the month itself, with their indices
    pub fn month_cells(&self) -> impl Iterator<Item = (usize, &DayCell)> {
        self.cells.iter().enumerate().filter(|(_, cell)| cell.in_month)
    }

    pub fn contains_month_day(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// (row, column) of a cell index
pub fn cell_position(index: usize) -> (usize, usize) {
    (index / DAYS_PER_WEEK, index % DAYS_PER_WEEK)
}

/// `count` consecutive months starting at (year, month)
pub fn displayed_months(year: i32, month: u32, count: u32) -> Vec<(i32, u32)> {
    (0..count.max(1) as i32)
        .map(|delta| add_months(year, month, delta))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn plain() -> NonWorkingDays {
        NonWorkingDays { enabled: false, ..NonWorkingDays::default() }
    }

    #[test]
    fn test_grid_shape() {
        // January 2024 starts on a Monday: 1 leading day, 31 days -> 5 rows
        let grid = MonthGrid::new(2024, 1, &plain()).unwrap();
        assert_eq!(grid.cells.len(), 35);
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cells[0].date, d(2023, 12, 31));
        assert!(!grid.cells[0].in_month);
        assert_eq!(grid.cells[1].date, d(2024, 1, 1));
        assert_eq!(grid.cells[34].date, d(2024, 2, 3));
        assert_eq!(grid.month_cells().count(), 31);
    }

    #[test]
    fn test_six_row_and_four_row_months() {
        // March 2024 starts on a Friday: 5 + 31 = 36 -> 6 rows
        assert_eq!(MonthGrid::new(2024, 3, &plain()).unwrap().rows(), 6);
        // February 2015 starts on a Sunday and has 28 days -> 4 rows
        assert_eq!(MonthGrid::new(2015, 2, &plain()).unwrap().rows(), 4);
    }

    #[test]
    fn test_cell_index() {
        let grid = MonthGrid::new(2024, 1, &plain()).unwrap();
        assert_eq!(grid.cell_index(d(2024, 1, 1)), Some(1));
        assert_eq!(grid.cell_index(d(2024, 1, 10)), Some(10));
        assert_eq!(grid.cell_index(d(2023, 12, 31)), Some(0));
        assert_eq!(grid.cell_index(d(2023, 12, 30)), None);
        assert_eq!(grid.cell_index(d(2024, 2, 4)), None);
        assert_eq!(cell_position(10), (1, 3));
    }

    #[test]
    fn test_non_working_cells() {
        let grid = MonthGrid::new(2024, 1, &NonWorkingDays::default()).unwrap();
        // 2024-01-06 is a Saturday
        let saturday = &grid.cells[grid.cell_index(d(2024, 1, 6)).unwrap()];
        assert!(saturday.non_working);
        assert_eq!(saturday.note.as_deref(), Some("Saturday"));
        assert!(!grid.cells[grid.cell_index(d(2024, 1, 8)).unwrap()].non_working);
    }

    #[test]
    fn test_displayed_months() {
        assert_eq!(displayed_months(2024, 11, 3), vec![(2024, 11), (2024, 12), (2025, 1)]);
        assert_eq!(displayed_months(2024, 5, 0), vec![(2024, 5)]);
    }
}
