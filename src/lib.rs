//! Envcal - environment schedule calendar
//!
//! Turns flat schedule records (environment, batch, status, date interval)
//! into month-grid calendars:
//! - Status normalization onto four canonical statuses
//! - Aggregation of records into per (environment, batch, status) ranges
//! - Deterministic color assignment with palette cycling or generated hues
//! - Display caps applied before layout
//! - Spanning bar layout with week-row splitting and skyline stacking,
//!   or inline per-day blocks
//! - Environment filtering, non-working days and rc-file configuration
//!
//! # Example
//!
//! ```no_run
//! use envcal::config::ScheduleConfig;
//! use envcal::layout::GridLayoutEngine;
//! use envcal::schedule::Schedule;
//!
//! fn main() -> envcal::error::Result<()> {
//!     let config = ScheduleConfig::default();
//!     let json = std::fs::read_to_string("schedule.json")?;
//!     let schedule = Schedule::from_json(&json, &config)?;
//!     let engine = GridLayoutEngine::new(&config);
//!     let layout = engine.layout_month(schedule.ranges(), 2024, 3, &engine.nominal_sizer())?;
//!     for placement in &layout.placements {
//!         println!("{} at {}", placement.range_id, placement.vertical_offset);
//!     }
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod layout;
pub mod models;
pub mod schedule;
pub mod utils;
