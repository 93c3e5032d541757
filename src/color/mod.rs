//! Color utilities and the stateful color allocator
//!
//! Every color the core hands out is a `#rrggbb` string, so renderers can
//! derive contrast text and translucent fills from it.

pub mod assigner;

pub use assigner::ColorAssigner;

/// Neutral gray for unknown statuses
pub const NEUTRAL_GRAY: &str = "#9ca3af";

/// Fixed color of the unspecified batch
pub const DEFAULT_BATCH_GRAY: &str = "#9e9e9e";

pub const TEXT_BLACK: &str = "#000000";
pub const TEXT_WHITE: &str = "#ffffff";

/// Parse `#rrggbb` into its channels
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Weighted brightness on a 0-255 scale.
/// Formula: L = 0.2126*R + 0.7152*G + 0.0722*B
/// Unparseable colors sit exactly on the midpoint (128).
pub fn luminance(color: &str) -> f64 {
    match parse_hex(color) {
        Some((r, g, b)) => 0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64,
        None => 128.0,
    }
}

/// Black text on light backgrounds, white text on dark ones
pub fn contrast_text_color(background: &str) -> &'static str {
    if luminance(background) > 128.0 {
        TEXT_BLACK
    } else {
        TEXT_WHITE
    }
}

/// CSS `rgba()` of a hex color; non-hex input is returned unchanged
pub fn with_alpha(color: &str, alpha: f64) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => format!("rgba({}, {}, {}, {})", r, g, b, alpha),
        None => color.to_string(),
    }
}

/// Convert HSL (hue in degrees, saturation/lightness in percent) to hex
pub fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let h = hue.rem_euclid(360.0) / 360.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return to_hex(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    to_hex(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#dc2626"), Some((0xdc, 0x26, 0x26)));
        assert_eq!(parse_hex("#FFFFFF"), Some((255, 255, 255)));
        assert_eq!(parse_hex("dc2626"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex("hsl(1, 2%, 3%)"), None);
    }

    #[test]
    fn test_contrast_text_color() {
        assert_eq!(contrast_text_color("#ffffff"), TEXT_BLACK);
        assert_eq!(contrast_text_color("#000000"), TEXT_WHITE);
        // light blue batch color
        assert_eq!(contrast_text_color("#dbeafe"), TEXT_BLACK);
        // dark red environment color
        assert_eq!(contrast_text_color("#7f1d1d"), TEXT_WHITE);
        // unparseable sits on the threshold and is not "light"
        assert_eq!(contrast_text_color("not a color"), TEXT_WHITE);
    }

    #[test]
    fn test_luminance_threshold() {
        assert_eq!(contrast_text_color("#7f7f7f"), TEXT_WHITE);
        assert_eq!(contrast_text_color("#818181"), TEXT_BLACK);
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(with_alpha("#10b981", 0.15), "rgba(16, 185, 129, 0.15)");
        assert_eq!(with_alpha("red", 0.5), "red");
    }

    #[test]
    fn test_hsl_to_hex() {
        assert_eq!(hsl_to_hex(0.0, 100.0, 50.0), "#ff0000");
        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00ff00");
        assert_eq!(hsl_to_hex(240.0, 100.0, 50.0), "#0000ff");
        assert_eq!(hsl_to_hex(0.0, 0.0, 50.0), "#808080");
        assert_eq!(hsl_to_hex(480.0, 100.0, 50.0), hsl_to_hex(120.0, 100.0, 50.0));
    }
}
