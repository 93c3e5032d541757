//! Inline (non-spanning) mode: each day lists its own blocks.
//!
//! A block groups the ranges of one (environment, batch) covering that
//! day, across statuses, and lists every task of those ranges. No bar-level admission happens here; the
//! per-day cap bounds the block count and the per-block cap bounds the
//! task list inside each block.

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use crate::error::Result;
use crate::layout::engine::GridLayoutEngine;
use crate::layout::grid::MonthGrid;
use crate::layout::limits::truncate_to_cap;
use crate::models::{RawTask, TaskRange};

#[derive(Debug, Clone, Serialize)]
pub struct TaskBlock {
    pub environment: String,
    pub batch: String,
    pub environment_color: String,
    pub batch_color: String,
    pub purpose: String,
    pub tasks: Vec<RawTask>,
    /// Tasks cut by the per-block cap
    pub hidden_tasks: usize,
}

impl TaskBlock {
    fn start(range: &TaskRange) -> Self {
        Self {
            environment: range.environment().to_string(),
            batch: range.batch().to_string(),
            environment_color: range.environment_color.clone(),
            batch_color: range.batch_color.clone(),
            purpose: range.purpose.clone(),
            tasks: Vec::new(),
            hidden_tasks: 0,
        }
    }

    /// Work-item texts in first-seen order, blanks and repeats dropped
    pub fn distinct_contents(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for content in self.tasks.iter().filter_map(|task| task.content.as_deref()) {
            let content = content.trim();
            if !content.is_empty() && !seen.contains(&content) {
                seen.push(content);
            }
        }
        seen
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayBlocks {
    pub date: NaiveDate,
    pub cell_index: usize,
    pub blocks: Vec<TaskBlock>,
    /// Blocks cut by the per-day cap
    pub hidden_blocks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineMonth {
    pub grid: MonthGrid,
    /// Only days with at least one block, ascending
    pub days: Vec<DayBlocks>,
}

impl InlineMonth {
    pub fn day(&self, date: NaiveDate) -> Option<&DayBlocks> {
        self.days.iter().find(|day| day.date == date)
    }
}

impl GridLayoutEngine {
    pub fn inline_month(&self, ranges: &[TaskRange], year: i32, month: u32) -> Result<InlineMonth> {
        let grid = MonthGrid::new(year, month, &self.non_working)?;
        let candidates = self.month_candidates(ranges, year, month);
        let block_cap = self.display.block_cap();
        let day_cap = self.display.day_cap();

        let mut days = Vec::new();
        for (cell_index, cell) in grid.month_cells() {
            let mut blocks: Vec<TaskBlock> = Vec::new();
            for range in candidates.iter().filter(|range| range.covers(cell.date)) {
                let position = blocks
                    .iter()
                    .position(|block| block.environment == range.environment() && block.batch == range.batch());
                let block = match position {
                    Some(position) => &mut blocks[position],
                    None => {
                        blocks.push(TaskBlock::start(range));
                        let last = blocks.len() - 1;
                        &mut blocks[last]
                    }
                };
                block.tasks.extend(range.tasks.iter().cloned());
            }
            if blocks.is_empty() {
                continue;
            }

            for block in &mut blocks {
                let (tasks, hidden) = truncate_to_cap(std::mem::take(&mut block.tasks), block_cap);
                block.tasks = tasks;
                block.hidden_tasks = hidden;
            }
            let (blocks, hidden_blocks) = truncate_to_cap(blocks, day_cap);

            days.push(DayBlocks {
                date: cell.date,
                cell_index,
                blocks,
                hidden_blocks,
            });
        }
        debug!("Inline month {}-{:02}: {} day(s) with blocks", year, month, days.len());

        Ok(InlineMonth { grid, days })
    }
}
