//! Converts decoded pointer events into scroll deltas, tap/swipe actions
//! and snap targets. One active pointer at a time; events from other
//! pointers are ignored while a gesture is in progress.

mod velocity;

pub use velocity::{Velocity, VelocityTracker};

use log::debug;

use crate::config::Config;

/// A pointer event already decoded by the host input boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pointer: u64, x: f32, y: f32, t_ms: u64 },
    Move { pointer: u64, x: f32, y: f32, t_ms: u64 },
    Up { pointer: u64, x: f32, y: f32, t_ms: u64 },
    Cancel { pointer: u64, t_ms: u64 },
}

impl PointerEvent {
    pub fn t_ms(&self) -> u64 {
        match *self {
            PointerEvent::Down { t_ms, .. }
            | PointerEvent::Move { t_ms, .. }
            | PointerEvent::Up { t_ms, .. }
            | PointerEvent::Cancel { t_ms, .. } => t_ms,
        }
    }
}

/// External action requested by a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    /// Tap on the current tile.
    Activate,
    SwipeUp,
    SwipeDown,
}

/// Outcome of a release: which slot to snap to and what to tell the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub target: usize,
    pub action: Option<GestureAction>,
}

/// What the owner should do after feeding an event to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate {
    None,
    /// A pointer went down; any running snap animation should stop.
    Pressed,
    /// Apply this horizontal delta to the scroll offset (caller clamps).
    Scroll(f32),
    Released(Release),
}

/// Scroll geometry the classification needs, owned by the controller.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext {
    pub offset: f32,
    pub width: f32,
    pub has_previous: bool,
}

#[derive(Debug)]
struct Session {
    pointer: u64,
    start_x: f32,
    start_y: f32,
    last_x: f32,
    last_y: f32,
    long_press_deadline: Option<u64>,
    ignore_next_up: bool,
}

impl Session {
    fn displacement(&self) -> f32 {
        (self.start_x - self.last_x).abs() + (self.start_y - self.last_y).abs()
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Tracking(Session),
}

/// The gesture state machine: `Idle → Tracking → Idle`, with a long-press
/// deadline nested inside `Tracking`.
#[derive(Debug, Default)]
pub struct GestureTracker {
    state: State,
    velocity: VelocityTracker,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, State::Tracking(_))
    }

    /// Feed one pointer event, returning what the owner should do.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        ctx: GestureContext,
        config: &Config,
    ) -> GestureUpdate {
        match event {
            PointerEvent::Down { pointer, x, y, t_ms } => {
                if self.is_tracking() {
                    // secondary pointer, single-touch only
                    return GestureUpdate::None;
                }
                self.velocity.clear();
                self.velocity.push(t_ms, x, y);
                self.state = State::Tracking(Session {
                    pointer,
                    start_x: x,
                    start_y: y,
                    last_x: x,
                    last_y: y,
                    long_press_deadline: Some(t_ms + config.long_press_delay_ms),
                    ignore_next_up: false,
                });
                GestureUpdate::Pressed
            }
            PointerEvent::Move { pointer, x, y, t_ms } => {
                let State::Tracking(session) = &mut self.state else {
                    return GestureUpdate::None;
                };
                if session.pointer != pointer {
                    return GestureUpdate::None;
                }
                self.velocity.push(t_ms, x, y);
                let dx = session.last_x - x;
                let dy = session.last_y - y;
                session.last_x = x;
                session.last_y = y;
                // Horizontal-dominant movement drags the carousel; vertical
                // movement is reserved for the swipe gestures.
                if dx.abs() > dy.abs() {
                    GestureUpdate::Scroll(dx)
                } else {
                    GestureUpdate::None
                }
            }
            PointerEvent::Up { pointer, x, y, t_ms } => {
                let mut session = match std::mem::take(&mut self.state) {
                    State::Tracking(session) if session.pointer == pointer => session,
                    other => {
                        self.state = other;
                        return GestureUpdate::None;
                    }
                };
                session.long_press_deadline = None;
                session.last_x = x;
                session.last_y = y;
                self.velocity.push(t_ms, x, y);
                let velocity = self.velocity.measure(t_ms, config.velocity_window_ms);
                let release = classify(&session, velocity, ctx, config);
                debug!(
                    "release: velocity=({:.0},{:.0}) target={} action={:?}",
                    velocity.x, velocity.y, release.target, release.action
                );
                GestureUpdate::Released(release)
            }
            PointerEvent::Cancel { pointer, .. } => {
                let State::Tracking(session) = &self.state else {
                    return GestureUpdate::None;
                };
                if session.pointer != pointer {
                    return GestureUpdate::None;
                }
                self.state = State::Idle;
                GestureUpdate::Released(Release {
                    target: nearest_slot(ctx),
                    action: None,
                })
            }
        }
    }

    /// Poll the long-press deadline; the owner calls this from its tick.
    /// Fires at most once per gesture, and only while the pointer has not
    /// strayed past the tap threshold. A fired long-press suppresses the
    /// tap action of the following release.
    pub fn poll_long_press(&mut self, now_ms: u64, config: &Config) -> bool {
        let State::Tracking(session) = &mut self.state else {
            return false;
        };
        let Some(deadline) = session.long_press_deadline else {
            return false;
        };
        if now_ms < deadline {
            return false;
        }
        session.long_press_deadline = None;
        if session.displacement() < config.tap_distance_threshold_px {
            session.ignore_next_up = true;
            return true;
        }
        false
    }
}

/// The release decision table. Pure in its inputs: the same session,
/// velocity and geometry always produce the same decision.
fn classify(session: &Session, velocity: Velocity, ctx: GestureContext, config: &Config) -> Release {
    let threshold = config.snap_velocity_threshold;
    let min_slot = if ctx.has_previous { 0 } else { 1 };

    if session.displacement() < config.tap_distance_threshold_px {
        let action = if session.ignore_next_up {
            None
        } else {
            Some(GestureAction::Activate)
        };
        Release { target: 1, action }
    } else if velocity.x > threshold {
        Release {
            target: min_slot,
            action: None,
        }
    } else if velocity.x < -threshold {
        Release {
            target: 2,
            action: None,
        }
    } else if velocity.y < -threshold {
        Release {
            target: 1,
            action: Some(GestureAction::SwipeUp),
        }
    } else if velocity.y > threshold {
        Release {
            target: 1,
            action: Some(GestureAction::SwipeDown),
        }
    } else {
        Release {
            target: nearest_slot(ctx),
            action: None,
        }
    }
}

/// Slot whose boundary is nearest the current offset, clamped to the
/// reachable range. Ties round to the even slot so a half-way release from
/// center settles on the tile the drag was heading toward.
fn nearest_slot(ctx: GestureContext) -> usize {
    let min_slot = if ctx.has_previous { 0 } else { 1 };
    if ctx.width <= 0.0 {
        return 1;
    }
    let nearest = (ctx.offset / ctx.width).round_ties_even() as i64;
    nearest.clamp(min_slot as i64, 2) as usize
}
