//! Horizontal month pager. Dragging right goes to the earlier month, dragging
//! left to the later one.

use super::{Command, Machine, Pointer};

pub const MIN_SWITCH_PX: f64 = 60.0;
pub const SWITCH_RATIO: f64 = 0.2;
pub const SLIDE_MS: u64 = 240;
pub const TOOLTIP_BUFFER_MS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselState {
    Idle,
    Dragging { pointer_id: u64, start_x: f64 },
    AnimatingOut { direction: Direction },
    AnimatingIn,
    SnappingBack,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CarouselEvent {
    Down(Pointer),
    Move(Pointer),
    Up(Pointer),
    Cancel { pointer_id: u64 },
    LostCapture { pointer_id: u64 },
    /// Button paging.
    Step(Direction),
    Resize { width: f64 },
    /// Replace the month list, staying on the displayed month when it still exists.
    SetMonths(Vec<String>),
    Timer(CarouselTimer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselTimer {
    OutDone,
    InDone,
    SnapDone,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CarouselEffect {
    CapturePointer(u64),
    ReleasePointer(u64),
    /// Horizontal content offset; positive moves content right.
    Offset { px: f64, animate_ms: u64 },
    SuppressTooltips { ms: u64 },
    MonthChanged { index: usize, month: String },
}

type Out = Vec<Command<CarouselTimer, CarouselEffect>>;

#[derive(Debug, Clone)]
pub struct Carousel {
    months: Vec<String>,
    index: usize,
    width: f64,
    offset: f64,
    state: CarouselState,
}

impl Carousel {
    /// `months` oldest first; starts on `index` (clamped).
    pub fn new(months: Vec<String>, index: usize, width: f64) -> Self {
        let index = index.min(months.len().saturating_sub(1));
        Self {
            months,
            index,
            width: width.max(0.0),
            offset: 0.0,
            state: CarouselState::Idle,
        }
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn month(&self) -> Option<&str> {
        self.months.get(self.index).map(String::as_str)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn threshold(&self) -> f64 {
        MIN_SWITCH_PX.max(self.width * SWITCH_RATIO)
    }

    pub fn has_neighbor(&self, direction: Direction) -> bool {
        match direction {
            Direction::Previous => self.index > 0,
            Direction::Next => self.index + 1 < self.months.len(),
        }
    }

    fn set_offset(&mut self, px: f64, animate_ms: u64, out: &mut Out) {
        self.offset = px;
        out.push(Command::Emit(CarouselEffect::Offset { px, animate_ms }));
    }

    fn begin_switch(&mut self, direction: Direction, out: &mut Out) {
        out.push(Command::CancelTimers);
        self.state = CarouselState::AnimatingOut { direction };
        let px = match direction {
            Direction::Previous => self.width,
            Direction::Next => -self.width,
        };
        self.set_offset(px, SLIDE_MS, out);
        out.push(Command::Emit(CarouselEffect::SuppressTooltips {
            ms: 2 * SLIDE_MS + TOOLTIP_BUFFER_MS,
        }));
        out.push(Command::Schedule {
            timer: CarouselTimer::OutDone,
            after_ms: SLIDE_MS,
        });
    }

    fn snap_back(&mut self, out: &mut Out) {
        out.push(Command::CancelTimers);
        self.state = CarouselState::SnappingBack;
        self.set_offset(0.0, SLIDE_MS, out);
        out.push(Command::Schedule {
            timer: CarouselTimer::SnapDone,
            after_ms: SLIDE_MS,
        });
    }

    fn on_down(&mut self, p: Pointer, out: &mut Out) {
        if !p.kind.drives_gestures() || self.state != CarouselState::Idle {
            return;
        }
        out.push(Command::CancelTimers);
        self.state = CarouselState::Dragging {
            pointer_id: p.id,
            start_x: p.x,
        };
        out.push(Command::Emit(CarouselEffect::CapturePointer(p.id)));
    }

    /// Current displacement for the tracked pointer, if `p` is it.
    fn displacement(&self, p: &Pointer) -> Option<f64> {
        match self.state {
            CarouselState::Dragging { pointer_id, start_x } if pointer_id == p.id => {
                Some((p.x - start_x).clamp(-self.width, self.width))
            }
            _ => None,
        }
    }

    fn on_move(&mut self, p: Pointer, out: &mut Out) {
        if let Some(dx) = self.displacement(&p) {
            self.set_offset(dx, 0, out);
        }
    }

    fn on_up(&mut self, p: Pointer, out: &mut Out) {
        let Some(dx) = self.displacement(&p) else {
            return;
        };
        out.push(Command::Emit(CarouselEffect::ReleasePointer(p.id)));
        self.offset = dx;
        let direction = if dx > 0.0 {
            Direction::Previous
        } else {
            Direction::Next
        };
        if dx.abs() > self.threshold() && self.has_neighbor(direction) {
            self.begin_switch(direction, out);
        } else {
            self.snap_back(out);
        }
    }

    fn on_cancel(&mut self, id: u64, out: &mut Out) {
        match self.state {
            CarouselState::Dragging { pointer_id, .. } if pointer_id == id => self.snap_back(out),
            _ => {}
        }
    }

    fn on_out_done(&mut self, out: &mut Out) {
        let CarouselState::AnimatingOut { direction } = self.state else {
            return;
        };
        self.index = match direction {
            Direction::Previous => self.index.saturating_sub(1),
            Direction::Next => (self.index + 1).min(self.months.len().saturating_sub(1)),
        };
        if let Some(month) = self.month().map(str::to_string) {
            out.push(Command::Emit(CarouselEffect::MonthChanged {
                index: self.index,
                month,
            }));
        }
        // New page enters from the side opposite to where the old one left.
        let entry = match direction {
            Direction::Previous => -self.width,
            Direction::Next => self.width,
        };
        self.set_offset(entry, 0, out);
        self.set_offset(0.0, SLIDE_MS, out);
        self.state = CarouselState::AnimatingIn;
        out.push(Command::Schedule {
            timer: CarouselTimer::InDone,
            after_ms: SLIDE_MS,
        });
    }

    fn on_set_months(&mut self, months: Vec<String>) {
        let current = self.month().map(str::to_string);
        self.index = current
            .and_then(|m| months.iter().position(|x| *x == m))
            .unwrap_or_else(|| self.index.min(months.len().saturating_sub(1)));
        self.months = months;
    }
}

impl Machine for Carousel {
    type Event = CarouselEvent;
    type Timer = CarouselTimer;
    type Effect = CarouselEffect;

    fn handle(&mut self, event: CarouselEvent, out: &mut Out) {
        match event {
            CarouselEvent::Down(p) => self.on_down(p, out),
            CarouselEvent::Move(p) => self.on_move(p, out),
            CarouselEvent::Up(p) => self.on_up(p, out),
            CarouselEvent::Cancel { pointer_id } | CarouselEvent::LostCapture { pointer_id } => {
                self.on_cancel(pointer_id, out)
            }
            CarouselEvent::Step(direction) => {
                if self.state == CarouselState::Idle && self.has_neighbor(direction) {
                    self.begin_switch(direction, out);
                }
            }
            CarouselEvent::Resize { width } => self.width = width.max(0.0),
            CarouselEvent::SetMonths(months) => self.on_set_months(months),
            CarouselEvent::Timer(CarouselTimer::OutDone) => self.on_out_done(out),
            CarouselEvent::Timer(CarouselTimer::InDone) => {
                if self.state == CarouselState::AnimatingIn {
                    self.state = CarouselState::Idle;
                }
            }
            CarouselEvent::Timer(CarouselTimer::SnapDone) => {
                if self.state == CarouselState::SnappingBack {
                    self.state = CarouselState::Idle;
                }
            }
        }
    }

    fn timer_event(timer: CarouselTimer) -> CarouselEvent {
        CarouselEvent::Timer(timer)
    }
}
