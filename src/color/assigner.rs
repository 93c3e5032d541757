use std::collections::HashMap;
use log::debug;
use crate::config::{ColorConfig, ColorStrategy};
use crate::models::{normalize_status, Status, DEFAULT_BATCH};
use super::{hsl_to_hex, DEFAULT_BATCH_GRAY, NEUTRAL_GRAY};

/// Index offset for generated batch colors, keeps their hues away from
/// generated environment hues
const BATCH_GENERATE_OFFSET: usize = 1000;

/// Golden angle in degrees
const GOLDEN_ANGLE: f64 = 137.508;

/// Deterministic color allocator for environments and batches.
///
/// Owns its cursors and name maps; a new instance starts from palette
/// index 0. `Schedule::load` builds a fresh one on every load.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    config: ColorConfig,
    environment_colors: HashMap<String, String>,
    batch_colors: HashMap<String, String>,
    /// Assignment order, for legends
    environment_order: Vec<String>,
    batch_order: Vec<String>,
    environment_cursor: usize,
    batch_cursor: usize,
}

/// Synthesized color for allocation index `index`
fn generate_color(index: usize) -> String {
    let hue = (index as f64 * GOLDEN_ANGLE) % 360.0;
    let saturation = 60.0 + (index % 3) as f64 * 10.0;
    let lightness = 50.0 + (index % 2) as f64 * 10.0;
    hsl_to_hex(hue, saturation, lightness)
}

/// Next color from a palette, advancing `cursor`
fn next_color(palette: &[String], cursor: &mut usize, strategy: ColorStrategy, generate_offset: usize) -> String {
    let index = *cursor;
    *cursor += 1;

    if palette.is_empty() || (index >= palette.len() && strategy == ColorStrategy::Generate) {
        return generate_color(index + generate_offset);
    }
    palette[index % palette.len()].clone()
}

fn remember(map: &mut HashMap<String, String>, order: &mut Vec<String>, name: &str, color: &str) {
    if map.insert(name.to_string(), color.to_string()).is_none() {
        order.push(name.to_string());
    }
}

impl ColorAssigner {
    pub fn new(config: ColorConfig) -> Self {
        Self {
            config,
            environment_colors: HashMap::new(),
            batch_colors: HashMap::new(),
            environment_order: Vec::new(),
            batch_order: Vec::new(),
            environment_cursor: 0,
            batch_cursor: 0,
        }
    }

    /// Color for an environment.
    ///
    /// Override table first, then the remembered color (when consistent),
    /// then the next palette entry or a generated color.
    pub fn environment_color(&mut self, name: &str) -> String {
        if let Some(color) = self.config.environment_overrides.get(name).cloned() {
            remember(&mut self.environment_colors, &mut self.environment_order, name, &color);
            return color;
        }

        if self.config.consistent {
            if let Some(color) = self.environment_colors.get(name) {
                return color.clone();
            }
        }

        let color = next_color(
            &self.config.environment_palette,
            &mut self.environment_cursor,
            self.config.strategy,
            0,
        );
        debug!("Assigned color {} to environment '{}'", color, name);
        remember(&mut self.environment_colors, &mut self.environment_order, name, &color);
        color
    }

    /// Color for a batch; the unspecified batch is always gray
    pub fn batch_color(&mut self, batch: &str) -> String {
        if batch.trim().is_empty() || batch == DEFAULT_BATCH {
            return DEFAULT_BATCH_GRAY.to_string();
        }

        if self.config.consistent {
            if let Some(color) = self.batch_colors.get(batch) {
                return color.clone();
            }
        }

        let color = next_color(
            &self.config.batch_palette,
            &mut self.batch_cursor,
            self.config.strategy,
            BATCH_GENERATE_OFFSET,
        );
        debug!("Assigned color {} to batch '{}'", color, batch);
        remember(&mut self.batch_colors, &mut self.batch_order, batch, &color);
        color
    }

    /// Color for a raw or canonical status string
    pub fn status_color(&self, raw: &str) -> String {
        self.color_of_status(normalize_status(raw))
    }

    pub fn color_of_status(&self, status: Status) -> String {
        self.config
            .status_colors
            .get(&status)
            .cloned()
            .unwrap_or_else(|| NEUTRAL_GRAY.to_string())
    }

    /// Assigned environment colors, in assignment order
    pub fn environment_colors(&self) -> Vec<(String, String)> {
        self.environment_order
            .iter()
            .filter_map(|name| self.environment_colors.get(name).map(|c| (name.clone(), c.clone())))
            .collect()
    }

    /// Assigned batch colors, in assignment order
    pub fn batch_colors(&self) -> Vec<(String, String)> {
        self.batch_order
            .iter()
            .filter_map(|name| self.batch_colors.get(name).map(|c| (name.clone(), c.clone())))
            .collect()
    }

    /// Statuses with a configured color, in canonical order
    pub fn statuses(&self) -> Vec<Status> {
        Status::ALL
            .into_iter()
            .filter(|status| self.config.status_colors.contains_key(status))
            .collect()
    }

    pub fn status_colors(&self) -> Vec<(Status, String)> {
        self.statuses()
            .into_iter()
            .map(|status| (status, self.color_of_status(status)))
            .collect()
    }
}
