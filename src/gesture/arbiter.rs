//! Per-surface gesture arbitration.
//!
//! The arbiter owns the one active touch session for its surface, runs the
//! long-press and swipe detectors against the same event stream, and
//! enforces mutual exclusion between the two interpretations: a fired
//! long-press kills swipe tracking for the session, and an open long-press
//! menu at touch-start keeps swipe tracking from ever engaging. Every exit
//! path - commit, cancel, disqualification, stale event - removes the
//! session's published offset and pending timer, so nothing leaks across
//! sessions.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::long_press::LongPressDetector;
use super::swipe::{SwipeTracker, SwipeUpdate};
use super::{GestureCommand, GestureConfig, SubjectId, SurfaceKind, TimerToken, TouchPoint};

struct ActiveSession {
    subject: SubjectId,
    long_press: LongPressDetector,
    /// `None` once swipe tracking is suppressed (menu open), disqualified
    /// (scroll), or lost to a fired long-press.
    swipe: Option<SwipeTracker>,
}

pub struct GestureArbiter {
    surface: SurfaceKind,
    config: GestureConfig,
    active: Option<ActiveSession>,
    offsets: HashMap<SubjectId, f64>,
    next_token: u64,
}

impl GestureArbiter {
    pub fn new(surface: SurfaceKind) -> Self {
        Self::with_config(surface, GestureConfig::default())
    }

    pub fn with_config(surface: SurfaceKind, config: GestureConfig) -> Self {
        Self {
            surface,
            config,
            active: None,
            offsets: HashMap::new(),
            next_token: 1,
        }
    }

    pub fn surface(&self) -> SurfaceKind {
        self.surface
    }

    pub fn is_tracking(&self, subject: &SubjectId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|session| &session.subject == subject)
    }

    /// Current reveal offset published for a subject, if any.
    pub fn offset_for(&self, subject: &SubjectId) -> Option<f64> {
        self.offsets.get(subject).copied()
    }

    pub fn published_offsets(&self) -> Vec<(SubjectId, f64)> {
        self.offsets
            .iter()
            .map(|(subject, px)| (subject.clone(), *px))
            .collect()
    }

    /// A finger touched down on `subject`. `menu_open` is the externally
    /// signaled "long-press menu is showing" condition; while it holds,
    /// swipe tracking for this session never starts.
    pub fn touch_start(
        &mut self,
        subject: SubjectId,
        point: TouchPoint,
        menu_open: bool,
    ) -> Vec<GestureCommand> {
        if !self.surface.is_touch() {
            return Vec::new();
        }
        let mut commands = Vec::new();

        // A new start while a session is live means we missed an end event.
        // Resolve the old session defensively: no callbacks, no leaks.
        if let Some(stale) = self.active.take() {
            warn!(subject = %stale.subject, "touch-start with live session, clearing");
            self.discard_session(stale, &mut commands);
        }

        let token = TimerToken(self.next_token);
        self.next_token += 1;
        commands.push(GestureCommand::StartTimer {
            token,
            delay_ms: self.config.hold_ms(),
        });

        let swipe = if menu_open {
            debug!(%subject, "menu open, swipe tracking suppressed");
            None
        } else {
            Some(SwipeTracker::start(point))
        };

        self.active = Some(ActiveSession {
            subject,
            long_press: LongPressDetector::arm(point, token),
            swipe,
        });
        commands
    }

    pub fn touch_move(&mut self, subject: &SubjectId, point: TouchPoint) -> Vec<GestureCommand> {
        if !self.surface.is_touch() {
            return Vec::new();
        }
        let Some(session) = self
            .active
            .as_mut()
            .filter(|session| &session.subject == subject)
        else {
            debug!(%subject, "move for unknown session ignored");
            return Vec::new();
        };
        let mut commands = Vec::new();

        if let Some(token) = session.long_press.on_move(point, self.config.slop_px()) {
            commands.push(GestureCommand::CancelTimer { token });
        }

        if let Some(swipe) = session.swipe.as_mut() {
            match swipe.on_move(point, &self.config) {
                SwipeUpdate::Offset(px) => {
                    self.offsets.insert(subject.clone(), px);
                    commands.push(GestureCommand::OffsetChanged {
                        subject: subject.clone(),
                        px,
                    });
                }
                SwipeUpdate::Disqualified { had_offset } => {
                    debug!(%subject, "vertical scroll, swipe tracking stopped");
                    session.swipe = None;
                    self.offsets.remove(subject);
                    if had_offset {
                        commands.push(GestureCommand::OffsetCleared {
                            subject: subject.clone(),
                        });
                    }
                }
                SwipeUpdate::Unchanged => {}
            }
        }
        commands
    }

    pub fn touch_end(&mut self, subject: &SubjectId) -> Vec<GestureCommand> {
        if !self.surface.is_touch() {
            return Vec::new();
        }
        let mut commands = Vec::new();

        let mut session = match self.active.take() {
            Some(session) if &session.subject == subject => session,
            other => {
                // Stale or mismatched end: clear what we know, fire nothing.
                self.active = other;
                warn!(%subject, "end for a session that was not started");
                if self.offsets.remove(subject).is_some() {
                    commands.push(GestureCommand::OffsetCleared {
                        subject: subject.clone(),
                    });
                }
                return commands;
            }
        };

        if let Some(token) = session.long_press.on_end() {
            commands.push(GestureCommand::CancelTimer { token });
        }

        // A fired long-press already resolved the session; otherwise the
        // swipe gets its chance to commit.
        if !session.long_press.has_fired() {
            if let Some(swipe) = session.swipe.take() {
                if swipe.commits(&self.config) {
                    commands.push(GestureCommand::SwipeReply {
                        subject: subject.clone(),
                    });
                    commands.push(GestureCommand::HapticPulse {
                        duration_ms: self.config.haptic_ms(),
                    });
                }
            }
        }

        // Final step on every path: drop the published offset.
        if self.offsets.remove(subject).is_some() {
            commands.push(GestureCommand::OffsetCleared {
                subject: subject.clone(),
            });
        }
        commands
    }

    /// The shell's one-shot timer elapsed. Fires the long-press only if the
    /// token still belongs to the armed session; anything else is stale.
    pub fn timer_fired(&mut self, token: TimerToken) -> Vec<GestureCommand> {
        if !self.surface.is_touch() {
            return Vec::new();
        }
        let Some(session) = self.active.as_mut() else {
            debug!(?token, "timer fired with no active session");
            return Vec::new();
        };
        if !session.long_press.on_timer(token) {
            debug!(?token, "stale timer token ignored");
            return Vec::new();
        }

        let subject = session.subject.clone();
        let mut commands = vec![
            GestureCommand::LongPress {
                subject: subject.clone(),
            },
            GestureCommand::HapticPulse {
                duration_ms: self.config.haptic_ms(),
            },
        ];

        // Long-press won: the swipe interpretation is dead for this session.
        session.swipe = None;
        if self.offsets.remove(&subject).is_some() {
            commands.push(GestureCommand::OffsetCleared { subject });
        }
        commands
    }

    fn discard_session(&mut self, session: ActiveSession, commands: &mut Vec<GestureCommand>) {
        let mut session = session;
        if let Some(token) = session.long_press.on_end() {
            commands.push(GestureCommand::CancelTimer { token });
        }
        if self.offsets.remove(&session.subject).is_some() {
            commands.push(GestureCommand::OffsetCleared {
                subject: session.subject,
            });
        }
    }
}
