//! Spanning layout: bars across day cells, wrapped at week rows, stacked
//! with a skyline so bars sharing a cell never overlap vertically.
//!
//! # Per month
//!
//! 1. Candidates: ranges with coverage in the month whose environment
//!    passes the filter, in registry order.
//! 2. Admission: the per-day cap over each candidate's in-month coverage days.
//! 3. Visible span: first..last in-month coverage day, gaps bridged.
//! 4. Segments: one per grid row the span touches.
//! 5. Skyline: offset = max running height over every cell of every
//!    segment; afterwards all those cells rise to offset + height + spacing.
//!
//! Heights come from a `ContentSizer`. When real heights are only known
//! after drawing, `MonthLayout::apply_measured_heights` re-runs step 5
//! once with the measured values.

use std::collections::HashMap;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use crate::calendar::NonWorkingDays;
use crate::config::{DisplayConfig, LayoutGeometry, ScheduleConfig};
use crate::error::{LayoutDiagnostic, Result};
use crate::filter::EnvironmentFilter;
use crate::layout::grid::{cell_position, displayed_months, MonthGrid, DAYS_PER_WEEK};
use crate::layout::inline::InlineMonth;
use crate::layout::limits;
use crate::models::TaskRange;

/// One row-bounded piece of a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub row: usize,
    pub start_column: usize,
    pub column_span: usize,
}

impl Segment {
    pub fn end_column(&self) -> usize {
        self.start_column + self.column_span - 1
    }

    /// Grid cell indices covered by this segment
    pub fn cells(&self) -> std::ops::Range<usize> {
        let first = self.row * DAYS_PER_WEEK + self.start_column;
        first..first + self.column_span
    }

    /// Horizontal (left, width) inside a row, for cells of `cell_width`
    /// separated by `grid_gap`
    pub fn pixel_span(&self, cell_width: f64, grid_gap: f64) -> (f64, f64) {
        let left = self.start_column as f64 * (cell_width + grid_gap);
        let span = self.column_span as f64;
        let width = cell_width * span + grid_gap * (span - 1.0);
        (left, width)
    }
}

/// Split the cell interval [start, end] at week-row boundaries.
///
/// First row runs to column 6, rows in between are full, the last row
/// starts at column 0. `start` must not exceed `end`.
pub fn split_into_segments(start: usize, end: usize) -> Vec<Segment> {
    let (start_row, start_column) = cell_position(start);
    let (end_row, end_column) = cell_position(end);

    if start_row == end_row {
        return vec![Segment {
            row: start_row,
            start_column,
            column_span: end_column - start_column + 1,
        }];
    }

    let mut segments = Vec::with_capacity(end_row - start_row + 1);
    segments.push(Segment {
        row: start_row,
        start_column,
        column_span: DAYS_PER_WEEK - start_column,
    });
    for row in start_row + 1..end_row {
        segments.push(Segment { row, start_column: 0, column_span: DAYS_PER_WEEK });
    }
    segments.push(Segment {
        row: end_row,
        start_column: 0,
        column_span: end_column + 1,
    });
    segments
}

/// Running occupied height per grid cell for one layout pass
#[derive(Debug, Clone)]
pub struct Skyline {
    heights: Vec<f64>,
    spacing: f64,
}

impl Skyline {
    pub fn new(cells: usize, spacing: f64) -> Self {
        Self {
            heights: vec![0.0; cells],
            spacing,
        }
    }

    /// Lowest offset clear of everything already placed on `cells`
    pub fn offset_for(&self, cells: &[usize]) -> f64 {
        cells
            .iter()
            .filter_map(|cell| self.heights.get(*cell))
            .fold(0.0, |top, height| f64::max(top, *height))
    }

    /// Place an item of `height` on `cells`; returns its offset
    pub fn place(&mut self, cells: &[usize], height: f64) -> f64 {
        let offset = self.offset_for(cells);
        let top = offset + height + self.spacing;
        for cell in cells {
            if let Some(slot) = self.heights.get_mut(*cell) {
                *slot = top;
            }
        }
        offset
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }
}

/// Sizes bar content before placement
pub trait ContentSizer {
    /// Height `range`'s content needs when drawn inside `segment`
    fn segment_height(&self, range: &TaskRange, segment: &Segment) -> f64;
}

/// Every bar gets the same nominal height
#[derive(Debug, Clone, Copy)]
pub struct FixedHeight(pub f64);

impl ContentSizer for FixedHeight {
    fn segment_height(&self, _range: &TaskRange, _segment: &Segment) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    pub range_id: String,
    pub environment: String,
    /// First and last drawn day
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub segments: Vec<Segment>,
    pub vertical_offset: f64,
    pub height: f64,
}

impl Placement {
    /// Every grid cell under any segment
    pub fn occupied_cells(&self) -> Vec<usize> {
        self.segments.iter().flat_map(Segment::cells).collect()
    }

    pub fn bottom(&self) -> f64 {
        self.vertical_offset + self.height
    }

    /// True when the two bars share a cell and their vertical intervals meet
    pub fn collides_with(&self, other: &Placement) -> bool {
        let mine = self.occupied_cells();
        let shares_cell = other.occupied_cells().iter().any(|cell| mine.contains(cell));
        shares_cell && self.vertical_offset < other.bottom() && other.vertical_offset < self.bottom()
    }
}

/// Spanning layout of one month panel
#[derive(Debug, Clone, Serialize)]
pub struct MonthLayout {
    pub grid: MonthGrid,
    pub placements: Vec<Placement>,
    pub diagnostics: Vec<LayoutDiagnostic>,
    #[serde(skip)]
    spacing: f64,
    #[serde(skip)]
    corrected: bool,
}

impl MonthLayout {
    pub fn year(&self) -> i32 {
        self.grid.year
    }

    pub fn month(&self) -> u32 {
        self.grid.month
    }

    pub fn placement(&self, range_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.range_id == range_id)
    }

    /// Corrective pass: substitute measured heights and re-stack once.
    ///
    /// Placement order is kept; bars without a measurement keep their
    /// height. Only the first call has an effect; returns whether it ran.
    pub fn apply_measured_heights(&mut self, measured: &HashMap<String, f64>) -> bool {
        if self.corrected {
            warn!("Month {}-{:02} already corrected; ignoring further measurements", self.year(), self.month());
            return false;
        }
        self.corrected = true;

        let mut skyline = Skyline::new(self.grid.cells.len(), self.spacing);
        for placement in &mut self.placements {
            if let Some(height) = measured.get(&placement.range_id) {
                placement.height = height.max(0.0);
            }
            placement.vertical_offset = skyline.place(&placement.occupied_cells(), placement.height);
        }
        true
    }

    /// Height occupied by bars in each grid row
    pub fn row_heights(&self) -> Vec<f64> {
        let mut rows = vec![0.0_f64; self.grid.rows()];
        for placement in &self.placements {
            for segment in &placement.segments {
                if let Some(row) = rows.get_mut(segment.row) {
                    *row = row.max(placement.bottom());
                }
            }
        }
        rows
    }
}

/// Layout output for one displayed month
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MonthView {
    Spanning(MonthLayout),
    Inline(InlineMonth),
}

/// Lays ranges out on month grids.
///
/// Holds configuration only; every call builds its own grid, skyline and
/// placement list.
#[derive(Debug, Clone)]
pub struct GridLayoutEngine {
    pub(crate) display: DisplayConfig,
    pub(crate) geometry: LayoutGeometry,
    pub(crate) non_working: NonWorkingDays,
    pub(crate) filter: EnvironmentFilter,
}

impl GridLayoutEngine {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            display: config.display.clone(),
            geometry: config.geometry,
            non_working: config.non_working.clone(),
            filter: EnvironmentFilter::All,
        }
    }

    pub fn with_filter(mut self, filter: EnvironmentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn geometry(&self) -> LayoutGeometry {
        self.geometry
    }

    /// Nominal-height sizer from the configured bar height
    pub fn nominal_sizer(&self) -> FixedHeight {
        FixedHeight(self.geometry.bar_height)
    }

    /// Ranges with coverage in the month that pass the filter, registry order
    pub fn month_candidates<'a>(&self, ranges: &'a [TaskRange], year: i32, month: u32) -> Vec<&'a TaskRange> {
        ranges
            .iter()
            .filter(|range| self.filter.matches(range.environment()))
            .filter(|range| range.days_in_month(year, month).next().is_some())
            .collect()
    }

    pub fn layout_month(
        &self,
        ranges: &[TaskRange],
        year: i32,
        month: u32,
        sizer: &dyn ContentSizer,
    ) -> Result<MonthLayout> {
        let grid = MonthGrid::new(year, month, &self.non_working)?;
        let candidates = self.month_candidates(ranges, year, month);
        let spans: Vec<Option<(NaiveDate, NaiveDate)>> = candidates
            .iter()
            .map(|range| range.visible_span(year, month))
            .collect();
        let occupancy: Vec<Vec<NaiveDate>> = candidates
            .iter()
            .map(|range| range.days_in_month(year, month).collect())
            .collect();
        let admitted = limits::admit(&occupancy, self.display.day_cap(), self.display.admission);
        debug!(
            "Month {}-{:02}: {} candidate ranges, {} admitted",
            year,
            month,
            candidates.len(),
            admitted.len()
        );

        let placed: Vec<(&TaskRange, (NaiveDate, NaiveDate))> = admitted
            .into_iter()
            .filter_map(|index| spans[index].map(|span| (candidates[index], span)))
            .collect();
        let (placements, diagnostics) = place_spans(&grid, &placed, sizer, self.geometry.spacing);

        Ok(MonthLayout {
            grid,
            placements,
            diagnostics,
            spacing: self.geometry.spacing,
            corrected: false,
        })
    }

    /// Spanning layouts for `count` consecutive months
    pub fn layout_months(
        &self,
        ranges: &[TaskRange],
        year: i32,
        month: u32,
        count: u32,
        sizer: &dyn ContentSizer,
    ) -> Result<Vec<MonthLayout>> {
        displayed_months(year, month, count)
            .into_iter()
            .map(|(y, m)| self.layout_month(ranges, y, m, sizer))
            .collect()
    }

    /// Full render pass in the configured mode
    pub fn render(
        &self,
        ranges: &[TaskRange],
        year: i32,
        month: u32,
        count: u32,
        sizer: &dyn ContentSizer,
    ) -> Result<Vec<MonthView>> {
        displayed_months(year, month, count)
            .into_iter()
            .map(|(y, m)| {
                if self.display.spanning {
                    self.layout_month(ranges, y, m, sizer).map(MonthView::Spanning)
                } else {
                    self.inline_month(ranges, y, m).map(MonthView::Inline)
                }
            })
            .collect()
    }
}

/// Stacks admitted bars in order on a fresh skyline.
///
/// A span endpoint missing from `grid` yields a diagnostic and the bar is
/// skipped. Spans built by `layout_month` are clipped to the grid's month,
/// so this only happens when a span and a grid come from different months.
fn place_spans(
    grid: &MonthGrid,
    spans: &[(&TaskRange, (NaiveDate, NaiveDate))],
    sizer: &dyn ContentSizer,
    spacing: f64,
) -> (Vec<Placement>, Vec<LayoutDiagnostic>) {
    let mut skyline = Skyline::new(grid.cells.len(), spacing);
    let mut placements = Vec::with_capacity(spans.len());
    let mut diagnostics = Vec::new();

    for &(range, (first, last)) in spans {
        let endpoints = (grid.cell_index(first), grid.cell_index(last));
        let (start, end) = match endpoints {
            (Some(start), Some(end)) if start <= end => (start, end),
            (start, _) => {
                let date = if start.is_none() { first } else { last };
                let diagnostic = LayoutDiagnostic::UnresolvableCellIndex {
                    range_id: range.id.clone(),
                    date,
                };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
                continue;
            }
        };

        let segments = split_into_segments(start, end);
        let height = segments
            .iter()
            .map(|segment| sizer.segment_height(range, segment).max(0.0))
            .fold(0.0, f64::max);
        let cells: Vec<usize> = segments.iter().flat_map(Segment::cells).collect();
        let offset = skyline.place(&cells, height);
        debug!(
            "Placed '{}' cells {}..={} in {} segment(s) at offset {} (height {})",
            range.id,
            start,
            end,
            segments.len(),
            offset,
            height
        );

        placements.push(Placement {
            range_id: range.id.clone(),
            environment: range.environment().to_string(),
            start_date: first,
            end_date: last,
            segments,
            vertical_offset: offset,
            height,
        });
    }

    (placements, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_same_row() {
        assert_eq!(
            split_into_segments(8, 11),
            vec![Segment { row: 1, start_column: 1, column_span: 4 }]
        );
    }

    #[test]
    fn test_split_two_rows() {
        let segments = split_into_segments(5, 9);
        assert_eq!(
            segments,
            vec![
                Segment { row: 0, start_column: 5, column_span: 2 },
                Segment { row: 1, start_column: 0, column_span: 3 },
            ]
        );
    }

    #[test]
    fn test_split_many_rows() {
        let segments = split_into_segments(3, 29);
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment { row: 0, start_column: 3, column_span: 4 });
        assert_eq!(segments[1], Segment { row: 1, start_column: 0, column_span: 7 });
        assert_eq!(segments[3], Segment { row: 3, start_column: 0, column_span: 7 });
        assert_eq!(segments[4], Segment { row: 4, start_column: 0, column_span: 2 });
        let total: usize = segments.iter().map(|s| s.column_span).sum();
        assert_eq!(total, 27);
    }

    #[test]
    fn test_segment_geometry() {
        let segment = Segment { row: 2, start_column: 3, column_span: 2 };
        assert_eq!(segment.cells(), 17..19);
        assert_eq!(segment.end_column(), 4);
        assert_eq!(segment.pixel_span(100.0, 2.0), (306.0, 202.0));
    }

    #[test]
    fn test_skyline_stacks_on_tallest() {
        let mut skyline = Skyline::new(14, 4.0);
        assert_eq!(skyline.place(&[0, 1, 2], 18.0), 0.0);
        assert_eq!(skyline.place(&[2, 3], 30.0), 22.0);
        // spans both earlier bars: sits above the taller stack
        assert_eq!(skyline.place(&[0, 1, 2, 3], 18.0), 56.0);
        // untouched cell starts at the bottom
        assert_eq!(skyline.place(&[9], 18.0), 0.0);
        assert_eq!(skyline.heights()[3], 78.0);
    }

    #[test]
    fn test_skyline_empty_cells() {
        let mut skyline = Skyline::new(7, 4.0);
        assert_eq!(skyline.offset_for(&[]), 0.0);
        assert_eq!(skyline.place(&[], 10.0), 0.0);
    }

    #[test]
    fn test_span_outside_grid_is_diagnosed_and_skipped() {
        use crate::models::RawTask;
        use crate::schedule::Schedule;

        let config = ScheduleConfig::default();
        let day = |m: u32, d: u32| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let schedule = Schedule::load(
            vec![
                RawTask::new("A", "完成").with_dates(day(3, 20), None),
                RawTask::new("B", "完成").with_dates(day(1, 10), None),
            ],
            &config,
        )
        .unwrap();
        let ranges = schedule.ranges();
        let grid = MonthGrid::new(2024, 1, &config.non_working).unwrap();
        let spans = vec![
            (&ranges[0], (day(3, 20), day(3, 20))),
            (&ranges[1], (day(1, 10), day(1, 10))),
        ];

        let (placements, diagnostics) = place_spans(&grid, &spans, &FixedHeight(18.0), 4.0);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].environment, "B");
        assert_eq!(placements[0].vertical_offset, 0.0);
        assert_eq!(
            diagnostics,
            vec![LayoutDiagnostic::UnresolvableCellIndex {
                range_id: ranges[0].id.clone(),
                date: day(3, 20),
            }]
        );
    }
}
