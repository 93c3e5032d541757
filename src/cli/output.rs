// Output formatting utilities

use std::collections::HashMap;
use std::io::IsTerminal;
use chrono::{Datelike, NaiveDate};
use crate::color::{contrast_text_color, parse_hex};
use crate::layout::{ContentSizer, InlineMonth, MonthGrid, MonthLayout, Segment, TaskBlock};
use crate::models::{Environment, Status, TaskRange};

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_RED: &str = "\x1b[31m";

/// Characters between adjacent day cells
pub const GRID_GAP: usize = 1;
const MIN_CELL_WIDTH: usize = 8;
const MAX_CELL_WIDTH: usize = 24;
/// Tallest a bar may grow, in lines
const MAX_BAR_LINES: usize = 3;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Day cell width that fits seven cells in `terminal_width`
pub fn cell_width_for(terminal_width: usize) -> usize {
    (terminal_width.saturating_sub(GRID_GAP * 6) / 7).clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH)
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

/// Terminal columns taken by one character (CJK is double width)
pub fn char_width(c: char) -> usize {
    if is_wide(c) { 2 } else { 1 }
}

pub fn text_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Greedy character wrap into lines of at most `width` columns
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(2);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    for c in text.chars() {
        let w = char_width(c);
        if current_width + w > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
            if c == ' ' {
                continue;
            }
        }
        current.push(c);
        current_width += w;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Truncate or space-pad to exactly `width` columns
pub fn pad_to(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = char_width(c);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

/// Text drawn on a bar
pub fn bar_label(range: &TaskRange) -> String {
    let mut label = format!("{} {} {}", range.environment(), range.batch(), range.status().label());
    let content = range.first_content().trim();
    if !content.is_empty() {
        label.push_str(": ");
        label.push_str(content);
    }
    label
}

/// Sizes bars by how many lines their label wraps to
pub struct TextSizer {
    pub cell_width: usize,
}

impl TextSizer {
    fn segment_columns(&self, segment: &Segment) -> usize {
        let (_, width) = segment.pixel_span(self.cell_width as f64, GRID_GAP as f64);
        width as usize
    }
}

impl ContentSizer for TextSizer {
    fn segment_height(&self, range: &TaskRange, segment: &Segment) -> f64 {
        let lines = wrap_text(&bar_label(range), self.segment_columns(segment)).len();
        lines.clamp(1, MAX_BAR_LINES) as f64
    }
}

/// Background with a contrasting foreground, as 24-bit ANSI
fn paint(text: &str, background: &str, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let Some((r, g, b)) = parse_hex(background) else {
        return text.to_string();
    };
    let (fr, fg, fb) = parse_hex(contrast_text_color(background)).unwrap_or((0, 0, 0));
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m{}{}",
        r, g, b, fr, fg, fb, text, ANSI_RESET
    )
}

fn style(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", code, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Color sample followed by a space, or nothing without color
fn swatch(color: &str, use_color: bool) -> String {
    if use_color {
        format!("{} ", paint("  ", color, true))
    } else {
        String::new()
    }
}

/// A run of text at a column offset within one output line
#[derive(Debug, Clone)]
struct Piece {
    left: usize,
    text: String,
    background: Option<String>,
}

fn compose_line(mut pieces: Vec<Piece>, use_color: bool) -> String {
    pieces.sort_by_key(|piece| piece.left);
    let mut line = String::new();
    let mut cursor = 0;
    for piece in pieces {
        if piece.left < cursor {
            continue;
        }
        line.push_str(&" ".repeat(piece.left - cursor));
        cursor = piece.left + text_width(&piece.text);
        match &piece.background {
            Some(color) => line.push_str(&paint(&piece.text, color, use_color)),
            None => line.push_str(&piece.text),
        }
    }
    line.trim_end().to_string()
}

fn column_left(column: usize, cell_width: usize) -> usize {
    column * (cell_width + GRID_GAP)
}

fn grid_header(grid: &MonthGrid, cell_width: usize, use_color: bool) -> Vec<String> {
    let total = cell_width * 7 + GRID_GAP * 6;
    let title = NaiveDate::from_ymd_opt(grid.year, grid.month, 1)
        .map(|first| first.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", grid.year, grid.month));
    let weekdays: Vec<String> = WEEKDAYS.iter().map(|day| pad_to(day, cell_width)).collect();
    vec![
        style(&format!("{:^width$}", title, width = total), ANSI_BOLD, use_color).trim_end().to_string(),
        weekdays.join(&" ".repeat(GRID_GAP)).trim_end().to_string(),
        "-".repeat(total),
    ]
}

fn date_line(grid: &MonthGrid, row: usize, cell_width: usize, use_color: bool) -> String {
    let mut line = String::new();
    for column in 0..7 {
        let Some(cell) = grid.cells.get(row * 7 + column) else {
            break;
        };
        if column > 0 {
            line.push_str(&" ".repeat(GRID_GAP));
        }
        let marker = if cell.in_month && cell.non_working { "*" } else { "" };
        let text = pad_to(&format!("{:>2}{}", cell.date.day(), marker), cell_width);
        let text = if !cell.in_month {
            style(&text, ANSI_DIM, use_color)
        } else if cell.non_working {
            style(&text, ANSI_FG_RED, use_color)
        } else {
            text
        };
        line.push_str(&text);
    }
    line.trim_end().to_string()
}

/// Text rendering of a spanning month layout
pub fn format_month_layout(layout: &MonthLayout, ranges: &[TaskRange], cell_width: usize, use_color: bool) -> String {
    let by_id: HashMap<&str, &TaskRange> = ranges.iter().map(|range| (range.id.as_str(), range)).collect();
    let row_heights = layout.row_heights();
    let mut lines = grid_header(&layout.grid, cell_width, use_color);

    for (row, height) in row_heights.iter().enumerate() {
        lines.push(date_line(&layout.grid, row, cell_width, use_color));
        let mut rows: Vec<Vec<Piece>> = vec![Vec::new(); height.ceil() as usize];

        for placement in &layout.placements {
            let Some(range) = by_id.get(placement.range_id.as_str()) else {
                continue;
            };
            let label = bar_label(range);
            for segment in placement.segments.iter().filter(|segment| segment.row == row) {
                let (_, width) = segment.pixel_span(cell_width as f64, GRID_GAP as f64);
                let width = width as usize;
                let wrapped = wrap_text(&label, width);
                let top = placement.vertical_offset.round() as usize;
                for k in 0..placement.height.round() as usize {
                    let Some(target) = rows.get_mut(top + k) else {
                        break;
                    };
                    let text = wrapped.get(k).map(String::as_str).unwrap_or("");
                    target.push(Piece {
                        left: column_left(segment.start_column, cell_width),
                        text: pad_to(text, width),
                        background: Some(range.environment_color.clone()),
                    });
                }
            }
        }

        lines.extend(rows.into_iter().map(|pieces| compose_line(pieces, use_color)));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn block_lines(block: &TaskBlock) -> Vec<(String, Option<String>)> {
    let mut lines = vec![(
        format!("{} {}", block.environment, block.batch),
        Some(block.environment_color.clone()),
    )];
    for task in &block.tasks {
        let text = task
            .content
            .as_deref()
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .unwrap_or(task.status.as_str());
        lines.push((format!("- {}", text), None));
    }
    if block.hidden_tasks > 0 {
        lines.push((format!("+{} more", block.hidden_tasks), None));
    }
    lines
}

/// Text rendering of an inline month
pub fn format_inline_month(month: &InlineMonth, cell_width: usize, use_color: bool) -> String {
    let mut lines = grid_header(&month.grid, cell_width, use_color);

    for row in 0..month.grid.rows() {
        lines.push(date_line(&month.grid, row, cell_width, use_color));

        let mut columns: Vec<(usize, Vec<(String, Option<String>)>)> = Vec::new();
        for day in month.days.iter().filter(|day| day.cell_index / 7 == row) {
            let mut cell_lines: Vec<(String, Option<String>)> = day.blocks.iter().flat_map(block_lines).collect();
            if day.hidden_blocks > 0 {
                cell_lines.push((format!("+{} blocks", day.hidden_blocks), None));
            }
            columns.push((day.cell_index % 7, cell_lines));
        }

        let height = columns.iter().map(|(_, cell_lines)| cell_lines.len()).max().unwrap_or(0);
        for k in 0..height {
            let pieces = columns
                .iter()
                .filter_map(|(column, cell_lines)| {
                    cell_lines.get(k).map(|(text, background)| Piece {
                        left: column_left(*column, cell_width),
                        text: pad_to(text, cell_width),
                        background: background.clone(),
                    })
                })
                .collect();
            lines.push(compose_line(pieces, use_color));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Non-working days inside the displayed months
pub fn format_non_working(days: &[(NaiveDate, Option<String>)]) -> String {
    let mut lines = vec!["Non-working days:".to_string()];
    for (date, description) in days {
        match description {
            Some(description) => lines.push(format!("  {}  {}", date.format("%Y-%m-%d %a"), description)),
            None => lines.push(format!("  {}", date.format("%Y-%m-%d %a"))),
        }
    }
    lines.join("\n")
}

pub fn format_environments(environments: &[Environment], use_color: bool) -> String {
    let name_width = environments
        .iter()
        .map(|environment| text_width(&environment.name))
        .max()
        .unwrap_or(0)
        .max(4);
    let mut lines = vec![style(
        &format!("{}  {:7}  {}", pad_to("Name", name_width), "Color", "Purpose"),
        ANSI_BOLD,
        use_color,
    )];
    for environment in environments {
        lines.push(format!(
            "{}{}  {}  {}",
            swatch(&environment.color, use_color),
            pad_to(&environment.name, name_width),
            environment.color,
            environment.purpose
        ));
    }
    lines.join("\n")
}

pub fn format_legend(batches: &[(String, String)], statuses: &[(Status, String)], use_color: bool) -> String {
    let mut lines = vec![style("Batches:", ANSI_BOLD, use_color)];
    for (batch, color) in batches {
        lines.push(format!("  {}{}  {}", swatch(color, use_color), color, batch));
    }
    lines.push(style("Statuses:", ANSI_BOLD, use_color));
    for (status, color) in statuses {
        lines.push(format!("  {}{}  {} ({})", swatch(color, use_color), color, status.label(), status.as_str()));
    }
    lines.join("\n")
}

/// Ranges active on one day, in display order
pub fn format_day(date: NaiveDate, ranges: &[&TaskRange], use_color: bool) -> String {
    let mut lines = vec![style(&format!("{}", date.format("%Y-%m-%d %A")), ANSI_BOLD, use_color)];
    if ranges.is_empty() {
        lines.push("  No scheduled work.".to_string());
        return lines.join("\n");
    }
    for range in ranges {
        let status = paint(&format!("[{}]", range.status().label()), &range.status_color, use_color);
        lines.push(format!(
            "  {} {} / {}  {}..{}  {}",
            status,
            range.environment(),
            range.batch(),
            range.min_date,
            range.max_date,
            range.purpose
        ));
        for task in &range.tasks {
            if let Some(content) = task.content.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                lines.push(format!("      - {}", content));
            }
        }
    }
    lines.join("\n")
}
