use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Trailing-edge debounce for single-threaded executors.
///
/// Every call to [`Debouncer::arm`] supersedes the tickets handed out before
/// it. The caller sleeps for [`Debouncer::quiet_period`] and then checks
/// [`DebounceTicket::is_current`]; only the last ticket of a burst survives,
/// so a burst collapses into one action after the burst goes quiet.
#[derive(Debug, Clone)]
pub struct Debouncer {
    generation: Rc<Cell<u64>>,
    quiet_period: Duration,
}

#[derive(Debug, Clone)]
pub struct DebounceTicket {
    generation: Rc<Cell<u64>>,
    issued: u64,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            generation: Rc::new(Cell::new(0)),
            quiet_period,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn arm(&self) -> DebounceTicket {
        let issued = self.generation.get().wrapping_add(1);
        self.generation.set(issued);
        DebounceTicket {
            generation: Rc::clone(&self.generation),
            issued,
        }
    }

    /// Invalidates every outstanding ticket without issuing a new one.
    pub fn cancel(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

impl DebounceTicket {
    pub fn is_current(&self) -> bool {
        self.generation.get() == self.issued
    }
}
