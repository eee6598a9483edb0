use std::cell::RefCell;
use std::fmt;

use foundation::time::Millis;

/// Handle returned by [`TimerHost::set_timeout`]. Browser timer handles are
/// plain integers, so this mirrors them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

pub type TimerCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerError(pub String);

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to schedule timer: {}", self.0)
    }
}

impl std::error::Error for TimerError {}

/// One-shot timers on a single-threaded event loop (`setTimeout` /
/// `clearTimeout`).
pub trait TimerHost {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Result<TimerId, TimerError>;

    /// Clearing an unknown or already fired timer is a no-op.
    fn clear_timeout(&self, id: TimerId);
}

struct PendingTimer {
    id: TimerId,
    due: Millis,
    seq: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct VirtualClock {
    now: Millis,
    next_id: i32,
    next_seq: u64,
    pending: Vec<PendingTimer>,
}

/// Deterministic timer host driven by [`VirtualTimers::advance`].
///
/// Timers fire in `(due, registration order)` order, and the clock reads the
/// due time of the timer being fired. Callbacks may schedule or clear timers.
#[derive(Default)]
pub struct VirtualTimers {
    clock: RefCell<VirtualClock>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Millis {
        self.clock.borrow().now
    }

    pub fn pending_count(&self) -> usize {
        self.clock.borrow().pending.len()
    }

    /// Moves the clock forward by `ms`, firing every timer that comes due.
    /// Returns the number of callbacks run.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now().saturating_add(ms);
        let mut fired = 0usize;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let idx = clock
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(i, _)| i);
                idx.map(|i| {
                    let timer = clock.pending.remove(i);
                    clock.now = timer.due;
                    timer
                })
            };
            // Borrow released before running user code.
            let Some(timer) = next else { break };
            (timer.callback)();
            fired += 1;
        }
        self.clock.borrow_mut().now = target;
        fired
    }
}

impl TimerHost for VirtualTimers {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Result<TimerId, TimerError> {
        let mut clock = self.clock.borrow_mut();
        clock.next_id = clock.next_id.wrapping_add(1);
        let id = TimerId(clock.next_id);
        let seq = clock.next_seq;
        clock.next_seq = clock.next_seq.wrapping_add(1);
        let due = clock.now.saturating_add(u64::from(delay_ms));
        clock.pending.push(PendingTimer {
            id,
            due,
            seq,
            callback,
        });
        Ok(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.clock.borrow_mut().pending.retain(|t| t.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::{TimerHost, VirtualTimers};
    use foundation::time::Millis;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_in_due_then_registration_order() {
        let timers = VirtualTimers::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, delay) in [("late", 30), ("a", 10), ("b", 10)] {
            let log = log.clone();
            timers
                .set_timeout(delay, Box::new(move || log.borrow_mut().push(name)))
                .unwrap();
        }
        assert_eq!(timers.advance(9), 0);
        assert_eq!(timers.advance(100), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "late"]);
        assert_eq!(timers.now(), Millis(109));
    }

    #[test]
    fn cleared_timer_never_fires() {
        let timers = VirtualTimers::new();
        let hit = Rc::new(RefCell::new(false));
        let h = hit.clone();
        let id = timers
            .set_timeout(5, Box::new(move || *h.borrow_mut() = true))
            .unwrap();
        timers.clear_timeout(id);
        timers.advance(10);
        assert!(!*hit.borrow());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn callbacks_see_their_due_time_and_can_reschedule() {
        let timers = Rc::new(VirtualTimers::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let t = timers.clone();
        let s = seen.clone();
        timers
            .set_timeout(
                10,
                Box::new(move || {
                    s.borrow_mut().push(t.now());
                    let s2 = s.clone();
                    let t2 = t.clone();
                    t.set_timeout(5, Box::new(move || s2.borrow_mut().push(t2.now())))
                        .unwrap();
                }),
            )
            .unwrap();
        assert_eq!(timers.advance(20), 2);
        assert_eq!(*seen.borrow(), vec![Millis(10), Millis(15)]);
    }
}
