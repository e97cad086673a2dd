//! Swipe-to-delete for a single list row.
//!
//! The row content follows the pointer leftwards. Releasing past half the row
//! width commits the delete; anything less springs back.

use super::{Command, Machine, Pointer};

/// Fraction of the row width that commits a delete on release.
pub const COMMIT_RATIO: f64 = 0.5;
/// Horizontal travel after which the drag counts as a swipe, not a tap.
pub const MOVE_THRESHOLD_PX: f64 = 6.0;
pub const COMMIT_DELAY_MS: u64 = 180;
pub const SNAP_BACK_MS: u64 = 160;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeState {
    Idle,
    Dragging {
        pointer_id: u64,
        start_x: f64,
        origin: f64,
        moved: bool,
    },
    /// Terminal: the row is leaving and the delete will fire.
    Committing,
    SnappingBack,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeEvent {
    Down(Pointer),
    Move(Pointer),
    Up(Pointer),
    Cancel { pointer_id: u64 },
    LostCapture { pointer_id: u64 },
    Click,
    Resize { width: f64 },
    Timer(SwipeTimer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeTimer {
    CommitDone,
    SnapDone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeEffect {
    CapturePointer(u64),
    ReleasePointer(u64),
    /// Stop the host from scrolling or treating the drag as a tap.
    PreventDefault,
    /// Move the row content to `px` (≤ 0) over `animate_ms`.
    Offset { px: f64, animate_ms: u64 },
    FadeContent,
    Delete,
    SwallowClick,
    OpenDetail,
}

type Out = Vec<Command<SwipeTimer, SwipeEffect>>;

#[derive(Debug, Clone)]
pub struct Swipe {
    state: SwipeState,
    width: f64,
    offset: f64,
    swallow_click: bool,
}

impl Swipe {
    pub fn new(width: f64) -> Self {
        Self {
            state: SwipeState::Idle,
            width: width.max(0.0),
            offset: 0.0,
            swallow_click: false,
        }
    }

    pub fn state(&self) -> SwipeState {
        self.state
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn clamp(&self, px: f64) -> f64 {
        px.clamp(-self.width, 0.0)
    }

    fn set_offset(&mut self, px: f64, animate_ms: u64, out: &mut Out) {
        self.offset = px;
        out.push(Command::Emit(SwipeEffect::Offset { px, animate_ms }));
    }

    fn snap_back(&mut self, out: &mut Out) {
        out.push(Command::CancelTimers);
        self.state = SwipeState::SnappingBack;
        self.set_offset(0.0, SNAP_BACK_MS, out);
        out.push(Command::Schedule {
            timer: SwipeTimer::SnapDone,
            after_ms: SNAP_BACK_MS,
        });
    }

    fn commit(&mut self, out: &mut Out) {
        out.push(Command::CancelTimers);
        self.state = SwipeState::Committing;
        self.set_offset(-self.width, COMMIT_DELAY_MS, out);
        out.push(Command::Emit(SwipeEffect::FadeContent));
        out.push(Command::Schedule {
            timer: SwipeTimer::CommitDone,
            after_ms: COMMIT_DELAY_MS,
        });
    }

    fn on_down(&mut self, p: Pointer, out: &mut Out) {
        if !p.kind.drives_gestures() {
            return;
        }
        match self.state {
            SwipeState::Idle | SwipeState::SnappingBack => {}
            SwipeState::Dragging { .. } | SwipeState::Committing => return,
        }
        out.push(Command::CancelTimers);
        self.swallow_click = false;
        self.state = SwipeState::Dragging {
            pointer_id: p.id,
            start_x: p.x,
            origin: self.offset,
            moved: false,
        };
        out.push(Command::Emit(SwipeEffect::CapturePointer(p.id)));
    }

    fn on_move(&mut self, p: Pointer, out: &mut Out) {
        let SwipeState::Dragging {
            pointer_id,
            start_x,
            origin,
            moved,
        } = self.state
        else {
            return;
        };
        if pointer_id != p.id {
            return;
        }
        let dx = p.x - start_x;
        let moved = moved || dx.abs() > MOVE_THRESHOLD_PX;
        if moved {
            out.push(Command::Emit(SwipeEffect::PreventDefault));
        }
        self.state = SwipeState::Dragging {
            pointer_id,
            start_x,
            origin,
            moved,
        };
        let px = self.clamp(origin + dx);
        self.set_offset(px, 0, out);
    }

    fn on_up(&mut self, p: Pointer, out: &mut Out) {
        let SwipeState::Dragging { pointer_id, .. } = self.state else {
            return;
        };
        if pointer_id != p.id {
            return;
        }
        self.on_move(p, out);
        if let SwipeState::Dragging { moved, .. } = self.state {
            self.swallow_click = moved;
        }
        out.push(Command::Emit(SwipeEffect::ReleasePointer(p.id)));

        if self.width > 0.0 && self.offset.abs() >= self.width * COMMIT_RATIO {
            self.commit(out);
        } else if !self.swallow_click && self.offset == 0.0 {
            // A tap: nothing to animate.
            self.state = SwipeState::Idle;
        } else {
            self.snap_back(out);
        }
    }

    fn on_cancel(&mut self, id: u64, out: &mut Out) {
        match self.state {
            SwipeState::Dragging { pointer_id, .. } if pointer_id == id => {
                self.swallow_click = false;
                self.snap_back(out);
            }
            _ => {}
        }
    }

    fn on_click(&mut self, out: &mut Out) {
        if self.swallow_click {
            self.swallow_click = false;
            out.push(Command::Emit(SwipeEffect::SwallowClick));
            return;
        }
        let effect = match self.state {
            SwipeState::Idle | SwipeState::SnappingBack => SwipeEffect::OpenDetail,
            SwipeState::Dragging { .. } | SwipeState::Committing => SwipeEffect::SwallowClick,
        };
        out.push(Command::Emit(effect));
    }
}

impl Machine for Swipe {
    type Event = SwipeEvent;
    type Timer = SwipeTimer;
    type Effect = SwipeEffect;

    fn handle(&mut self, event: SwipeEvent, out: &mut Out) {
        match event {
            SwipeEvent::Down(p) => self.on_down(p, out),
            SwipeEvent::Move(p) => self.on_move(p, out),
            SwipeEvent::Up(p) => self.on_up(p, out),
            SwipeEvent::Cancel { pointer_id } | SwipeEvent::LostCapture { pointer_id } => {
                self.on_cancel(pointer_id, out)
            }
            SwipeEvent::Click => self.on_click(out),
            SwipeEvent::Resize { width } => {
                self.width = width.max(0.0);
                if self.state != SwipeState::Committing {
                    self.offset = self.clamp(self.offset);
                }
            }
            SwipeEvent::Timer(SwipeTimer::CommitDone) => {
                if self.state == SwipeState::Committing {
                    out.push(Command::Emit(SwipeEffect::Delete));
                }
            }
            SwipeEvent::Timer(SwipeTimer::SnapDone) => {
                if self.state == SwipeState::SnappingBack {
                    self.state = SwipeState::Idle;
                }
            }
        }
    }

    fn timer_event(timer: SwipeTimer) -> SwipeEvent {
        SwipeEvent::Timer(timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Driver, PointerKind};

    const WIDTH: f64 = 200.0;

    fn touch(id: u64, x: f64) -> Pointer {
        Pointer { id, kind: PointerKind::Touch, x, y: 10.0 }
    }

    fn driver() -> Driver<Swipe> {
        Driver::new(Swipe::new(WIDTH))
    }

    /// Drag pointer 1 from x=300 to `300 - distance`, then release at t=50.
    fn swipe_left(d: &mut Driver<Swipe>, distance: f64) -> Vec<SwipeEffect> {
        let mut effects = d.dispatch(SwipeEvent::Down(touch(1, 300.0)), 0);
        effects.extend(d.dispatch(SwipeEvent::Move(touch(1, 300.0 - distance / 2.0)), 20));
        effects.extend(d.dispatch(SwipeEvent::Move(touch(1, 300.0 - distance)), 40));
        effects.extend(d.dispatch(SwipeEvent::Up(touch(1, 300.0 - distance)), 50));
        effects
    }

    #[test]
    fn test_release_at_exactly_half_commits() {
        let mut d = driver();
        let effects = swipe_left(&mut d, 100.0);
        assert_eq!(d.machine().state(), SwipeState::Committing);
        assert!(effects.contains(&SwipeEffect::Offset { px: -WIDTH, animate_ms: COMMIT_DELAY_MS }));
        assert!(effects.contains(&SwipeEffect::FadeContent));
        assert!(!effects.contains(&SwipeEffect::Delete));

        assert!(d.advance(50 + COMMIT_DELAY_MS - 1).is_empty());
        assert_eq!(d.advance(50 + COMMIT_DELAY_MS), vec![SwipeEffect::Delete]);
    }

    #[test]
    fn test_release_below_half_snaps_back() {
        let mut d = driver();
        let effects = swipe_left(&mut d, 98.0);
        assert_eq!(d.machine().state(), SwipeState::SnappingBack);
        assert!(effects.contains(&SwipeEffect::Offset { px: 0.0, animate_ms: SNAP_BACK_MS }));
        assert!(d.advance(1_000).is_empty());
        assert_eq!(d.machine().state(), SwipeState::Idle);
        assert_eq!(d.machine().offset(), 0.0);
    }

    #[test]
    fn test_offset_is_clamped() {
        let mut d = driver();
        d.dispatch(SwipeEvent::Down(touch(1, 100.0)), 0);
        let right = d.dispatch(SwipeEvent::Move(touch(1, 180.0)), 10);
        assert!(right.contains(&SwipeEffect::Offset { px: 0.0, animate_ms: 0 }));
        let far_left = d.dispatch(SwipeEvent::Move(touch(1, -500.0)), 20);
        assert!(far_left.contains(&SwipeEffect::Offset { px: -WIDTH, animate_ms: 0 }));
    }

    #[test]
    fn test_mouse_does_not_start_drag() {
        let mut d = driver();
        let mouse = Pointer { id: 9, kind: PointerKind::Mouse, x: 100.0, y: 0.0 };
        assert!(d.dispatch(SwipeEvent::Down(mouse), 0).is_empty());
        assert_eq!(d.machine().state(), SwipeState::Idle);
    }

    #[test]
    fn test_second_pointer_is_ignored() {
        let mut d = driver();
        d.dispatch(SwipeEvent::Down(touch(1, 300.0)), 0);
        assert!(d.dispatch(SwipeEvent::Down(touch(2, 100.0)), 5).is_empty());
        assert!(d.dispatch(SwipeEvent::Move(touch(2, 0.0)), 10).is_empty());
        assert!(d.dispatch(SwipeEvent::Up(touch(2, 0.0)), 15).is_empty());
        assert!(matches!(d.machine().state(), SwipeState::Dragging { pointer_id: 1, .. }));
    }

    #[test]
    fn test_click_after_moved_drag_is_swallowed_once() {
        let mut d = driver();
        swipe_left(&mut d, 40.0);
        assert_eq!(d.dispatch(SwipeEvent::Click, 60), vec![SwipeEffect::SwallowClick]);
        d.advance(1_000);
        assert_eq!(d.dispatch(SwipeEvent::Click, 1_001), vec![SwipeEffect::OpenDetail]);
    }

    #[test]
    fn test_tap_without_movement_opens_detail() {
        let mut d = driver();
        d.dispatch(SwipeEvent::Down(touch(1, 300.0)), 0);
        let effects = d.dispatch(SwipeEvent::Up(touch(1, 302.0)), 30);
        assert!(!effects.contains(&SwipeEffect::PreventDefault));
        assert_eq!(d.machine().state(), SwipeState::Idle);
        assert!(!d.has_pending_timers());
        assert_eq!(d.dispatch(SwipeEvent::Click, 31), vec![SwipeEffect::OpenDetail]);
    }

    #[test]
    fn test_cancel_snaps_back_and_drops_pending_commit() {
        let mut d = driver();
        d.dispatch(SwipeEvent::Down(touch(1, 300.0)), 0);
        d.dispatch(SwipeEvent::Move(touch(1, 150.0)), 10);
        let effects = d.dispatch(SwipeEvent::Cancel { pointer_id: 1 }, 20);
        assert!(effects.contains(&SwipeEffect::Offset { px: 0.0, animate_ms: SNAP_BACK_MS }));
        assert!(!d.advance(10_000).contains(&SwipeEffect::Delete));
        assert_eq!(d.machine().state(), SwipeState::Idle);
    }

    #[test]
    fn test_lost_capture_snaps_back() {
        let mut d = driver();
        d.dispatch(SwipeEvent::Down(touch(4, 300.0)), 0);
        d.dispatch(SwipeEvent::Move(touch(4, 200.0)), 10);
        d.dispatch(SwipeEvent::LostCapture { pointer_id: 4 }, 20);
        assert_eq!(d.machine().state(), SwipeState::SnappingBack);
    }

    #[test]
    fn test_commit_is_not_cancelable() {
        let mut d = driver();
        swipe_left(&mut d, 150.0);
        assert!(d.dispatch(SwipeEvent::Down(touch(2, 300.0)), 60).is_empty());
        d.dispatch(SwipeEvent::Cancel { pointer_id: 1 }, 70);
        assert_eq!(d.advance(50 + COMMIT_DELAY_MS), vec![SwipeEffect::Delete]);
    }

    #[test]
    fn test_unmount_prevents_delete() {
        let mut d = driver();
        swipe_left(&mut d, 150.0);
        d.unmount();
        assert!(d.advance(10_000).is_empty());
    }

    #[test]
    fn test_zero_width_never_commits() {
        let mut d = Driver::new(Swipe::new(0.0));
        swipe_left(&mut d, 50.0);
        assert_eq!(d.machine().state(), SwipeState::SnappingBack);
    }
}
