//! Swipe-to-reply tracking for a single touch session.
//!
//! Horizontal drags publish a clamped reveal offset; vertical travel past
//! the cancel threshold reclassifies the gesture as a scroll and stops
//! tracking with no terminal callback. Dragging back past the origin
//! floor-clamps the offset at zero - intended behavior, not a bug.

use serde::{Deserialize, Serialize};

use super::{GestureConfig, TouchPoint};

/// What a move event did to the published offset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SwipeUpdate {
    /// Offset unchanged; nothing to publish.
    Unchanged,
    /// New offset to publish for rendering.
    Offset(f64),
    /// Vertical scroll took over. `had_offset` says whether a published
    /// offset needs clearing.
    Disqualified { had_offset: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwipeTracker {
    origin: TouchPoint,
    offset_px: f64,
    disqualified: bool,
}

impl SwipeTracker {
    pub fn start(origin: TouchPoint) -> Self {
        Self {
            origin,
            offset_px: 0.0,
            disqualified: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset_px
    }

    pub fn is_disqualified(&self) -> bool {
        self.disqualified
    }

    pub fn on_move(&mut self, point: TouchPoint, config: &GestureConfig) -> SwipeUpdate {
        if self.disqualified {
            return SwipeUpdate::Unchanged;
        }

        let dy = (point.y() - self.origin.y()).abs();
        if dy > config.vertical_cancel_px() {
            let had_offset = self.offset_px > 0.0;
            self.disqualified = true;
            self.offset_px = 0.0;
            return SwipeUpdate::Disqualified { had_offset };
        }

        let dx = point.x() - self.origin.x();
        // Rightward drags reveal up to the cap; leftward drags only retract
        // an already-revealed offset, never below zero.
        let next = if dx > 0.0 {
            dx.min(config.max_offset_px())
        } else if self.offset_px > 0.0 {
            0.0
        } else {
            return SwipeUpdate::Unchanged;
        };

        if (next - self.offset_px).abs() < f64::EPSILON {
            return SwipeUpdate::Unchanged;
        }
        self.offset_px = next;
        SwipeUpdate::Offset(next)
    }

    /// Whether the released drag commits a reply.
    pub fn commits(&self, config: &GestureConfig) -> bool {
        !self.disqualified && self.offset_px > config.commit_px()
    }
}
