//! Tunables for wheel zoom, toolbar step zoom and gesture timing.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```json
//! { "wheel": { "divisor": 40.0 }, "gesture": { "cooldown_ms": 150 } }
//! ```

use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub wheel: WheelZoomConfig,
    pub step: StepZoomConfig,
    pub gesture: GestureTiming,
}

/// Continuous zoom driven by modifier + wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelZoomConfig {
    /// `K` in `1 + |delta| / K`.
    pub divisor: f64,
    /// Upper bound on a single event's multiplicative factor.
    pub max_factor: f64,
    /// Hard floor. There is no ceiling on this path.
    pub min_scale: f64,
}

impl Default for WheelZoomConfig {
    fn default() -> Self {
        Self {
            divisor: 20.0,
            max_factor: 1.2,
            min_scale: 0.1,
        }
    }
}

/// Discrete zoom driven by the toolbar +/- buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepZoomConfig {
    pub increment: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for StepZoomConfig {
    fn default() -> Self {
        Self {
            increment: 0.25,
            min_scale: 0.25,
            max_scale: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureTiming {
    /// Quiet period after a plain wheel event during which modifier events
    /// still count as scrolling.
    pub cooldown_ms: u64,
    /// Window after an accepted zoom event in which further zoom events are
    /// dropped.
    pub reentrancy_ms: u64,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            cooldown_ms: 100,
            reentrancy_ms: 5,
        }
    }
}

impl GestureTiming {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn reentrancy(&self) -> Duration {
        Duration::from_millis(self.reentrancy_ms)
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!("loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let wheel = &self.wheel;
        if !(wheel.divisor.is_finite() && wheel.divisor > 0.0) {
            return Err(ViewerError::Config(format!(
                "wheel.divisor must be positive, got {}",
                wheel.divisor
            )));
        }
        if !(wheel.max_factor.is_finite() && wheel.max_factor > 1.0) {
            return Err(ViewerError::Config(format!(
                "wheel.max_factor must be greater than 1, got {}",
                wheel.max_factor
            )));
        }
        if !(wheel.min_scale.is_finite() && wheel.min_scale > 0.0) {
            return Err(ViewerError::Config(format!(
                "wheel.min_scale must be positive, got {}",
                wheel.min_scale
            )));
        }

        let step = &self.step;
        if !(step.increment.is_finite() && step.increment > 0.0) {
            return Err(ViewerError::Config(format!(
                "step.increment must be positive, got {}",
                step.increment
            )));
        }
        if !(step.min_scale > 0.0 && step.min_scale < step.max_scale && step.max_scale.is_finite()) {
            return Err(ViewerError::Config(format!(
                "step range [{}, {}] is empty or non-positive",
                step.min_scale, step.max_scale
            )));
        }
        Ok(())
    }
}
