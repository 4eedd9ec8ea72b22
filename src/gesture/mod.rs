//! Touch-gesture subsystem: long-press and swipe-to-reply disambiguation.
//!
//! One [`arbiter::GestureArbiter`] per list or view owns all session state;
//! nothing here is process-wide, so independent surfaces cannot
//! cross-contaminate. The arbiter consumes raw touch events and returns
//! [`GestureCommand`]s for the shell to execute in order - timers, haptics,
//! offset updates, and the terminal gesture callbacks.

pub mod arbiter;
pub mod long_press;
pub mod swipe;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use arbiter::GestureArbiter;
pub use long_press::{LongPressDetector, LongPressState};
pub use swipe::{SwipeTracker, SwipeUpdate};

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
pub enum GestureError {
    #[error("invalid subject id: {0}")]
    InvalidSubject(String),

    #[error("coordinate is not finite: ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("invalid threshold {name}: {value}")]
    InvalidThreshold { name: String, value: f64 },
}

/// Caller-supplied identifier of the thing being touched (e.g. a message
/// id) - immutable after construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    const MAX_LENGTH: usize = 128;

    pub fn new(id: impl Into<String>) -> Result<Self, GestureError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(GestureError::InvalidSubject(
                "subject id cannot be empty".into(),
            ));
        }
        if id.len() > Self::MAX_LENGTH {
            return Err(GestureError::InvalidSubject(format!(
                "subject id exceeds {} characters",
                Self::MAX_LENGTH
            )));
        }
        if id.chars().any(char::is_control) {
            return Err(GestureError::InvalidSubject(
                "subject id contains control characters".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single contact point's client coordinates, NaN-safe by construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    x: f64,
    y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Result<Self, GestureError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GestureError::NonFiniteCoordinate { x, y });
        }
        Ok(Self { x, y })
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }
}

/// Capability gate: gesture logic only runs on touch surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Touch,
    PointerOnly,
}

impl SurfaceKind {
    pub fn is_touch(self) -> bool {
        matches!(self, Self::Touch)
    }
}

/// Handle for a one-shot timer the shell runs on the arbiter's behalf.
/// Tokens are arbiter-scoped and never reused, so a late firing from an
/// ended session cannot match a live one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// Everything the gesture core asks of the outside world. The shell
/// executes these in order; the core renders nothing itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GestureCommand {
    StartTimer { token: TimerToken, delay_ms: u64 },
    CancelTimer { token: TimerToken },
    /// Best-effort vibration; platforms without support ignore it.
    HapticPulse { duration_ms: u64 },
    /// Reveal offset for the reply affordance changed.
    OffsetChanged { subject: SubjectId, px: f64 },
    OffsetCleared { subject: SubjectId },
    /// Terminal: the touch resolved as a long-press.
    LongPress { subject: SubjectId },
    /// Terminal: the touch resolved as a committed swipe-to-reply.
    SwipeReply { subject: SubjectId },
}

impl GestureCommand {
    /// Terminal commands resolve a session; at most one is ever emitted
    /// per session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LongPress { .. } | Self::SwipeReply { .. })
    }
}

/// Thresholds for both detectors. Defaults are the product values; custom
/// configurations are validated so the commit threshold stays reachable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    hold_ms: u64,
    slop_px: f64,
    vertical_cancel_px: f64,
    max_offset_px: f64,
    commit_px: f64,
    haptic_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hold_ms: crate::LONG_PRESS_HOLD_MS,
            slop_px: crate::LONG_PRESS_SLOP_PX,
            vertical_cancel_px: crate::SWIPE_VERTICAL_CANCEL_PX,
            max_offset_px: crate::SWIPE_MAX_OFFSET_PX,
            commit_px: crate::SWIPE_COMMIT_PX,
            haptic_ms: crate::HAPTIC_PULSE_MS,
        }
    }
}

impl GestureConfig {
    pub fn custom(
        hold_ms: u64,
        slop_px: f64,
        vertical_cancel_px: f64,
        max_offset_px: f64,
        commit_px: f64,
        haptic_ms: u64,
    ) -> Result<Self, GestureError> {
        if hold_ms == 0 {
            return Err(GestureError::InvalidThreshold {
                name: "hold_ms".into(),
                value: 0.0,
            });
        }
        for (name, value) in [
            ("slop_px", slop_px),
            ("vertical_cancel_px", vertical_cancel_px),
            ("max_offset_px", max_offset_px),
            ("commit_px", commit_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GestureError::InvalidThreshold {
                    name: name.into(),
                    value,
                });
            }
        }
        if commit_px >= max_offset_px {
            return Err(GestureError::InvalidThreshold {
                name: "commit_px".into(),
                value: commit_px,
            });
        }
        Ok(Self {
            hold_ms,
            slop_px,
            vertical_cancel_px,
            max_offset_px,
            commit_px,
            haptic_ms,
        })
    }

    pub fn hold_ms(&self) -> u64 {
        self.hold_ms
    }

    pub fn slop_px(&self) -> f64 {
        self.slop_px
    }

    pub fn vertical_cancel_px(&self) -> f64 {
        self.vertical_cancel_px
    }

    pub fn max_offset_px(&self) -> f64 {
        self.max_offset_px
    }

    pub fn commit_px(&self) -> f64 {
        self.commit_px
    }

    pub fn haptic_ms(&self) -> u64 {
        self.haptic_ms
    }
}
