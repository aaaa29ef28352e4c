//! HUD indicator formatting: the display data contract for charge sources.
//!
//! The core exposes one snapshot per producing source; an external HUD does
//! the actual rendering. Only the data contract lives here.

use serde::{Deserialize, Serialize};

/// Color-coded urgency derived from the charge/capacity ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorColor {
    /// ≥ 50% of capacity remaining.
    White,
    /// 20–50% remaining.
    Yellow,
    /// Below 20%.
    Red,
}

/// Display snapshot for one charge source, rebuilt each tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    /// Icon identifier for the HUD sprite lookup.
    pub icon: &'static str,
    /// Stored charge across the source's evaluated sub-producers.
    pub charge: f32,
    /// Capacity across the same sub-producers.
    pub capacity: f32,
    /// Formatted amount shown next to the icon.
    pub text: String,
    pub color: IndicatorColor,
}

impl IndicatorSnapshot {
    pub fn new(icon: &'static str, charge: f32, capacity: f32) -> Self {
        Self {
            icon,
            charge,
            capacity,
            text: format_amount(charge),
            color: urgency_color(charge, capacity),
        }
    }
}

/// Round to a whole number and group thousands with commas.
pub fn format_amount(value: f32) -> String {
    let rounded = value.round().max(0.0) as u64;
    let digits = rounded.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Urgency color for a charge/capacity pair. Zero capacity reads as empty.
pub fn urgency_color(charge: f32, capacity: f32) -> IndicatorColor {
    let ratio = if capacity > 0.0 {
        (charge / capacity).clamp(0.0, 1.0)
    } else {
        0.0
    };
    if ratio >= 0.5 {
        IndicatorColor::White
    } else if ratio >= 0.2 {
        IndicatorColor::Yellow
    } else {
        IndicatorColor::Red
    }
}
