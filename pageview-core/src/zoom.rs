//! Zoom arithmetic: wheel-driven continuous zoom with anchor preservation and
//! toolbar step zoom.
//!
//! The two paths are bounded differently. Wheel zoom only has a floor
//! ([`WheelZoomConfig::min_scale`]); step zoom is held to a closed range
//! ([`StepZoomConfig`]). The asymmetry is kept on purpose.

use crate::config::{StepZoomConfig, WheelZoomConfig};

/// Render scale of the document, 1.0 being 100%.
///
/// Only the clamping constructors can build one, so an out-of-range value
/// never reaches the controller or the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Scale(f64);

impl Scale {
    pub const ONE: Scale = Scale(1.0);

    /// Clamp to the wheel floor. NaN collapses to the floor.
    pub fn wheel(value: f64, config: &WheelZoomConfig) -> Self {
        Self(value.max(config.min_scale))
    }

    /// Clamp to the closed step range. NaN collapses to the lower bound.
    pub fn step(value: f64, config: &StepZoomConfig) -> Self {
        if value.is_nan() {
            return Self(config.min_scale);
        }
        Self(value.clamp(config.min_scale, config.max_scale))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Rounded percentage shown in the toolbar.
    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::ONE
    }
}

/// A position in logical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Immediate scroll adjustment, added to the current scroll offset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollDelta {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Negative wheel delta (away from the user) zooms in.
    pub fn from_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomResult {
    pub new_scale: Scale,
    /// Realised ratio `new_scale / previous_scale`, after rounding and clamping.
    pub factor: f64,
    pub scroll_delta: ScrollDelta,
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-event factor magnitude, `min(1 + |delta| / K, MAX_FACTOR)`.
pub fn factor_magnitude(magnitude: f64, config: &WheelZoomConfig) -> f64 {
    (1.0 + magnitude.abs() / config.divisor).min(config.max_factor)
}

/// Scroll adjustment that keeps the content point under the pointer fixed
/// when the content is rescaled by `factor`.
///
/// `pointer` is measured from the content origin, i.e. viewport position plus
/// the current scroll offset.
pub fn anchor_scroll_delta(pointer: Point, factor: f64) -> ScrollDelta {
    ScrollDelta {
        x: pointer.x * (factor - 1.0),
        y: pointer.y * (factor - 1.0),
    }
}

/// Compute the scale and scroll adjustment for one zoom-classified wheel event.
pub fn compute_zoom(
    previous: Scale,
    magnitude: f64,
    direction: ZoomDirection,
    pointer: Point,
    config: &WheelZoomConfig,
) -> ZoomResult {
    let magnitude = factor_magnitude(magnitude, config);
    let requested = match direction {
        ZoomDirection::In => magnitude,
        ZoomDirection::Out => 1.0 / magnitude,
    };

    let candidate = round_to_hundredths(previous.value() * requested);
    // An overflowing step keeps the current scale.
    let new_scale = if candidate.is_finite() {
        Scale::wheel(candidate, config)
    } else {
        previous
    };
    // Anchor on what was actually applied, so a clamped event does not move
    // the content.
    let factor = new_scale.value() / previous.value();

    ZoomResult {
        new_scale,
        factor,
        scroll_delta: anchor_scroll_delta(pointer, factor),
    }
}

/// One toolbar step in `direction`, rounded to hundredths and clamped to the
/// step range.
pub fn step_zoom(current: Scale, direction: ZoomDirection, config: &StepZoomConfig) -> Scale {
    let next = match direction {
        ZoomDirection::In => current.value() + config.increment,
        ZoomDirection::Out => current.value() - config.increment,
    };
    Scale::step(round_to_hundredths(next), config)
}
