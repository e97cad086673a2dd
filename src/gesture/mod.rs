//! Pointer gesture state machines.
//!
//! Each gesture is a [`Machine`] that consumes events and answers with
//! [`Command`]s. A [`Driver`] owns the event queue and the pending timers,
//! feeding expired timers back to the machine as ordinary events, so the
//! machines themselves never look at a clock.

pub mod carousel;
pub mod swipe;

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Only touch and pen input drive gestures.
    pub fn drives_gestures(self) -> bool {
        matches!(self, PointerKind::Touch | PointerKind::Pen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: u64,
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command<T, E> {
    Schedule { timer: T, after_ms: u64 },
    CancelTimers,
    Emit(E),
}

pub trait Machine {
    type Event;
    type Timer: Copy;
    type Effect;

    fn handle(&mut self, event: Self::Event, out: &mut Vec<Command<Self::Timer, Self::Effect>>);

    fn timer_event(timer: Self::Timer) -> Self::Event;
}

pub struct Driver<M: Machine> {
    machine: M,
    queue: VecDeque<M::Event>,
    timers: Vec<(u64, M::Timer)>,
    now_ms: u64,
}

impl<M: Machine> Driver<M> {
    pub fn new(machine: M) -> Self {
        Self {
            machine,
            queue: VecDeque::new(),
            timers: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|(at, _)| *at).min()
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Queue an event without processing it.
    pub fn push(&mut self, event: M::Event) {
        self.queue.push_back(event);
    }

    /// Fire timers due at or before `now_ms`, then process queued events.
    pub fn advance(&mut self, now_ms: u64) -> Vec<M::Effect> {
        let mut effects = Vec::new();
        self.fire_due(now_ms, &mut effects);
        self.drain(&mut effects);
        effects
    }

    /// Bring timers up to `now_ms`, then handle `event`.
    pub fn dispatch(&mut self, event: M::Event, now_ms: u64) -> Vec<M::Effect> {
        let mut effects = Vec::new();
        self.fire_due(now_ms, &mut effects);
        self.queue.push_back(event);
        self.drain(&mut effects);
        effects
    }

    /// Drop every pending timer and queued event.
    pub fn unmount(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    fn fire_due(&mut self, now_ms: u64, effects: &mut Vec<M::Effect>) {
        self.drain(effects);
        loop {
            let due = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, (at, _))| *at <= now_ms)
                .min_by_key(|(_, (at, _))| *at)
                .map(|(i, _)| i);
            let Some(i) = due else { break };
            let (at, timer) = self.timers.remove(i);
            self.now_ms = self.now_ms.max(at);
            self.queue.push_back(M::timer_event(timer));
            self.drain(effects);
        }
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn drain(&mut self, effects: &mut Vec<M::Effect>) {
        let mut commands = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            self.machine.handle(event, &mut commands);
            for command in commands.drain(..) {
                match command {
                    Command::Schedule { timer, after_ms } => {
                        self.timers.push((self.now_ms + after_ms, timer));
                    }
                    Command::CancelTimers => self.timers.clear(),
                    Command::Emit(effect) => effects.push(effect),
                }
            }
        }
    }
}
