use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual time for replays and tests. Clones share the same position.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// A single re-armable deadline. Arming always replaces the previous
/// deadline, so there is never more than one outstanding.
#[derive(Debug, Default)]
pub struct OneShotTimer {
    generation: u64,
    armed: Option<(TimerHandle, Instant)>,
}

impl OneShotTimer {
    pub fn arm(&mut self, now: Instant, delay: Duration) -> TimerHandle {
        self.generation += 1;
        let handle = TimerHandle(self.generation);
        self.armed = Some((handle, now + delay));
        handle
    }

    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.armed.take().map(|(handle, _)| handle)
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        self.armed.map(|(handle, _)| handle)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.map(|(_, deadline)| deadline)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn fire_if_due(&mut self, now: Instant) -> Option<TimerHandle> {
        match self.armed {
            Some((handle, deadline)) if deadline <= now => {
                self.armed = None;
                Some(handle)
            }
            _ => None,
        }
    }
}
