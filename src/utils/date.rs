// Date helpers: expression parsing, day iteration, month arithmetic

use chrono::{Datelike, Duration, Local, NaiveDate};
use anyhow::Result;

/// Accepted absolute date layouts, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y", "%m/%d/%Y"];

/// Parse a date expression into a calendar day
///
/// Supports absolute dates in the layouts above plus `today`, `tomorrow`
/// and `yesterday` relative to the local clock.
pub fn parse_date_expr(expr: &str) -> Result<NaiveDate> {
    let expr = expr.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(expr, format) {
            return Ok(date);
        }
    }

    let today = Local::now().date_naive();
    match expr {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => anyhow::bail!("Unsupported date expression: {}. Use YYYY-MM-DD, today, tomorrow or yesterday.", expr),
    }
}

/// Parse `YYYY-MM` (or `YYYY/MM`) into (year, month)
pub fn parse_month_spec(expr: &str) -> Result<(i32, u32)> {
    let expr = expr.trim();
    let (year, month) = expr
        .split_once(['-', '/'])
        .ok_or_else(|| anyhow::anyhow!("Invalid month: '{}'. Expected YYYY-MM.", expr))?;
    let year: i32 = year
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid year in month '{}'", expr))?;
    let month: u32 = month
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid month number in '{}'", expr))?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Invalid month: '{}'. Month must be between 01 and 12.", expr);
    }
    if !(1..=9999).contains(&year) {
        anyhow::bail!("Invalid month: '{}'. Year must be between 1 and 9999.", expr);
    }
    Ok((year, month))
}

/// Every day of the closed interval [start, end]; empty when end < start
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// First day of a month; `None` only for out-of-range years
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = add_months(year, month, 1);
    match (first_of_month(year, month), first_of_month(next_year, next_month)) {
        (Some(this), Some(next)) => (next - this).num_days() as u32,
        _ => 31,
    }
}

/// Shift (year, month) by a signed number of months
///
/// Saturates at the `i32` year bounds; such years fail later when a date
/// is built from them.
pub fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = i64::from(year) * 12 + (i64::from(month) - 1) + i64::from(delta);
    let year = i32::try_from(index.div_euclid(12)).unwrap_or(if index < 0 { i32::MIN } else { i32::MAX });
    (year, index.rem_euclid(12) as u32 + 1)
}

/// (year, month) of a date
pub fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
