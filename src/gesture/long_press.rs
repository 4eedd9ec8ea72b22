//! Long-press detection for a single touch session.
//!
//! State machine `Armed -> {Fired, Cancelled}`; the idle state is the
//! absence of a detector. The one-shot timer lives on the shell side; the
//! detector only hands out the token to start and the token to cancel, and
//! refuses a firing whose token does not match the armed session - the
//! guard against a stale timer resolving a session that already ended.

use serde::{Deserialize, Serialize};

use super::{TimerToken, TouchPoint};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LongPressState {
    /// Waiting for the hold timer; origin and timer token recorded.
    Armed {
        origin: TouchPoint,
        token: TimerToken,
    },
    /// The hold timer elapsed in place; the callback fired exactly once.
    Fired,
    /// Disqualified by movement or ended early. Terminal.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LongPressDetector {
    state: LongPressState,
}

impl LongPressDetector {
    pub fn arm(origin: TouchPoint, token: TimerToken) -> Self {
        Self {
            state: LongPressState::Armed { origin, token },
        }
    }

    pub fn state(&self) -> LongPressState {
        self.state
    }

    pub fn has_fired(&self) -> bool {
        matches!(self.state, LongPressState::Fired)
    }

    /// Axis-independent slop check: more than `slop_px` of travel on either
    /// axis disqualifies the press for the rest of the session. Returns the
    /// timer token to cancel when that happens.
    pub fn on_move(&mut self, point: TouchPoint, slop_px: f64) -> Option<TimerToken> {
        let LongPressState::Armed { origin, token } = self.state else {
            return None;
        };
        let dx = (point.x() - origin.x()).abs();
        let dy = (point.y() - origin.y()).abs();
        if dx > slop_px || dy > slop_px {
            self.state = LongPressState::Cancelled;
            return Some(token);
        }
        None
    }

    /// A timer firing only counts while still armed with the same token.
    /// Returns whether the long-press fired.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        match self.state {
            LongPressState::Armed { token: armed, .. } if armed == token => {
                self.state = LongPressState::Fired;
                true
            }
            _ => false,
        }
    }

    /// Touch lifted. Returns the timer token to cancel if one is still
    /// pending; ending after a fire or cancel is a no-op.
    pub fn on_end(&mut self) -> Option<TimerToken> {
        match self.state {
            LongPressState::Armed { token, .. } => {
                self.state = LongPressState::Cancelled;
                Some(token)
            }
            LongPressState::Fired | LongPressState::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> TouchPoint {
        TouchPoint::new(x, y).unwrap()
    }

    const SLOP: f64 = 10.0;

    #[test]
    fn stationary_hold_fires_on_timer() {
        let mut detector = LongPressDetector::arm(point(100.0, 200.0), TimerToken(1));
        assert_eq!(detector.on_move(point(105.0, 195.0), SLOP), None);
        assert!(detector.on_timer(TimerToken(1)));
        assert!(detector.has_fired());
    }

    #[test]
    fn fires_at_most_once() {
        let mut detector = LongPressDetector::arm(point(0.0, 0.0), TimerToken(1));
        assert!(detector.on_timer(TimerToken(1)));
        assert!(!detector.on_timer(TimerToken(1)));
    }

    #[test]
    fn eleven_px_on_one_axis_disqualifies() {
        let mut detector = LongPressDetector::arm(point(100.0, 100.0), TimerToken(7));
        assert_eq!(
            detector.on_move(point(111.0, 100.0), SLOP),
            Some(TimerToken(7))
        );
        // The session stays disqualified: a late timer firing is refused.
        assert!(!detector.on_timer(TimerToken(7)));
        assert_eq!(detector.state(), LongPressState::Cancelled);
    }

    #[test]
    fn vertical_slop_also_disqualifies() {
        let mut detector = LongPressDetector::arm(point(100.0, 100.0), TimerToken(2));
        assert_eq!(
            detector.on_move(point(100.0, 88.0), SLOP),
            Some(TimerToken(2))
        );
    }

    #[test]
    fn movement_within_slop_keeps_timer_pending() {
        let mut detector = LongPressDetector::arm(point(100.0, 100.0), TimerToken(3));
        assert_eq!(detector.on_move(point(110.0, 110.0), SLOP), None);
        assert!(matches!(detector.state(), LongPressState::Armed { .. }));
    }

    #[test]
    fn end_before_timer_cancels_and_returns_token() {
        let mut detector = LongPressDetector::arm(point(0.0, 0.0), TimerToken(4));
        assert_eq!(detector.on_end(), Some(TimerToken(4)));
        assert!(!detector.on_timer(TimerToken(4)));
    }

    #[test]
    fn end_after_fire_has_no_pending_timer() {
        let mut detector = LongPressDetector::arm(point(0.0, 0.0), TimerToken(5));
        assert!(detector.on_timer(TimerToken(5)));
        assert_eq!(detector.on_end(), None);
    }

    #[test]
    fn mismatched_token_is_ignored() {
        let mut detector = LongPressDetector::arm(point(0.0, 0.0), TimerToken(6));
        assert!(!detector.on_timer(TimerToken(99)));
        assert!(matches!(detector.state(), LongPressState::Armed { .. }));
    }
}
