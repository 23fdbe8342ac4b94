//! Completion-ratio aggregation and the LED color scale.
//!
//! # Responsibility
//! - Reduce a period's plan items to a completion ratio.
//! - Map ratios to the red/orange/green LED palette the calendar renders.
//!
//! # Invariants
//! - An empty period yields no ratio (`None`), never 0% or 100%.
//! - The color mapping is exact on the stop values 0, 0.5 and 1.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stop color for ratio 0.0.
pub const WARN_STOP: Rgb = Rgb::new(255, 0, 0);
/// Stop color for ratio 0.5.
pub const MID_STOP: Rgb = Rgb::new(255, 146, 0);
/// Stop color for ratio 1.0.
pub const TARGET_STOP: Rgb = Rgb::new(52, 216, 0);

/// Completion ratio over a sequence of per-item completion flags.
///
/// Returns `None` for an empty sequence: no data is distinct from 0%.
pub fn efficiency<I>(completed_flags: I) -> Option<f64>
where
    I: IntoIterator<Item = bool>,
{
    let mut total = 0usize;
    let mut completed = 0usize;
    for flag in completed_flags {
        total += 1;
        if flag {
            completed += 1;
        }
    }
    if total == 0 {
        None
    } else {
        Some(completed as f64 / total as f64)
    }
}

/// One sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Display for Rgb {
    /// CSS `rgb(r, g, b)` form, matching what the calendar LED consumes.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Calendar LED state for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedIndicator {
    /// No plan data for the period.
    Inactive,
    Lit(Rgb),
}

/// Piecewise-linear color for a completion ratio.
///
/// Interpolates warn -> midpoint over `[0, 0.5]` and midpoint -> target over
/// `[0.5, 1]`, per channel. Out-of-range ratios clamp to the nearest stop.
pub fn color_for(ratio: f64) -> Rgb {
    let ratio = ratio.clamp(0.0, 1.0);
    if ratio <= 0.5 {
        lerp(WARN_STOP, MID_STOP, ratio * 2.0)
    } else {
        lerp(MID_STOP, TARGET_STOP, (ratio - 0.5) * 2.0)
    }
}

/// LED state for an optional ratio; `None` maps to the inactive indicator.
pub fn indicator_for(ratio: Option<f64>) -> LedIndicator {
    match ratio {
        Some(ratio) => LedIndicator::Lit(color_for(ratio)),
        None => LedIndicator::Inactive,
    }
}

fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp_channel(from.r, to.r, t),
        lerp_channel(from.g, to.g, t),
        lerp_channel(from.b, to.b, t),
    )
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * t).round() as u8
}
