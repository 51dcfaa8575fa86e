//! Wheel gesture classification.
//!
//! A single wheel stream carries both scrolling and modifier-zooming. The
//! classifier is a three-state machine driven by the timestamps handed to it:
//!
//! * `Idle` - no recent wheel activity.
//! * `Zooming` - a zoom event was accepted; further zoom events are dropped
//!   until the re-entrancy window closes.
//! * `CoolingDown` - a plain scroll event arrived; modifier events are still
//!   scrolling until the cooldown expires, so trackpad momentum that outlives
//!   the scroll does not turn into zoom when the modifier goes down.

use crate::config::GestureTiming;
use crate::zoom::Point;
use std::time::{Duration, Instant};

/// One wheel event, as seen by the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub delta_y: f64,
    /// The platform zoom modifier (Ctrl, or Cmd on macOS).
    pub modifier_held: bool,
    /// Pointer position relative to the viewport's top-left corner.
    pub pointer: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Zoom,
    Scroll,
    /// A zoom event that overlapped a previous one and was discarded.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: GestureKind,
    /// Whether the host should suppress its native wheel handling.
    pub prevent_default: bool,
}

impl Classification {
    fn zoom() -> Self {
        Self {
            kind: GestureKind::Zoom,
            prevent_default: true,
        }
    }

    fn scroll() -> Self {
        Self {
            kind: GestureKind::Scroll,
            prevent_default: false,
        }
    }

    fn dropped() -> Self {
        // The modifier is still held, so native page zoom must stay off.
        Self {
            kind: GestureKind::Dropped,
            prevent_default: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Zooming { guard_until: Instant },
    CoolingDown { until: Instant },
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    state: GestureState,
    cooldown: Duration,
    reentrancy: Duration,
}

impl GestureClassifier {
    pub fn new(timing: &GestureTiming) -> Self {
        Self {
            state: GestureState::Idle,
            cooldown: timing.cooldown(),
            reentrancy: timing.reentrancy(),
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Expire whichever timer is running.
    pub fn tick(&mut self, now: Instant) {
        match self.state {
            GestureState::Zooming { guard_until } if now >= guard_until => {
                self.state = GestureState::Idle;
            }
            GestureState::CoolingDown { until } if now >= until => {
                tracing::trace!("scroll cooldown expired");
                self.state = GestureState::Idle;
            }
            _ => {}
        }
    }

    pub fn classify(&mut self, sample: &GestureSample, now: Instant) -> Classification {
        self.tick(now);

        if !sample.modifier_held {
            self.state = GestureState::CoolingDown {
                until: now + self.cooldown,
            };
            return Classification::scroll();
        }

        match self.state {
            GestureState::CoolingDown { .. } => {
                tracing::trace!(delta_y = sample.delta_y, "modifier wheel inside scroll cooldown");
                Classification::scroll()
            }
            GestureState::Zooming { .. } => {
                tracing::trace!(delta_y = sample.delta_y, "dropping overlapping zoom event");
                Classification::dropped()
            }
            GestureState::Idle => {
                self.state = GestureState::Zooming {
                    guard_until: now + self.reentrancy,
                };
                Classification::zoom()
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(&GestureTiming::default())
    }
}
