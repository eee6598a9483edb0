use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::timer::{TimerError, TimerHost, TimerId};

struct DebounceState<A> {
    host: Rc<dyn TimerHost>,
    wait_ms: u32,
    func: Box<dyn Fn(A)>,
    pending: Cell<Option<TimerId>>,
}

/// Trailing-edge debounce.
///
/// Every [`Debounced::call`] cancels the pending timer and arms a new one, so
/// a burst of calls produces a single invocation `wait_ms` after the last call,
/// with the arguments of that last call.
pub struct Debounced<A: 'static> {
    state: Rc<DebounceState<A>>,
}

impl<A: 'static> Debounced<A> {
    pub fn new(host: Rc<dyn TimerHost>, wait_ms: u32, func: impl Fn(A) + 'static) -> Self {
        Self {
            state: Rc::new(DebounceState {
                host,
                wait_ms,
                func: Box::new(func),
                pending: Cell::new(None),
            }),
        }
    }

    pub fn wait_ms(&self) -> u32 {
        self.state.wait_ms
    }

    pub fn is_pending(&self) -> bool {
        let id = self.state.pending.get();
        id.is_some()
    }

    pub fn call(&self, args: A) -> Result<(), TimerError> {
        self.cancel();
        let weak: Weak<DebounceState<A>> = Rc::downgrade(&self.state);
        let id = self.state.host.set_timeout(
            self.state.wait_ms,
            Box::new(move || {
                // Dropped debouncers leave their last timer as a no-op.
                let Some(state) = weak.upgrade() else { return };
                state.pending.set(None);
                (state.func)(args);
            }),
        )?;
        self.state.pending.set(Some(id));
        Ok(())
    }

    /// Drops the pending invocation, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.state.pending.take() {
            self.state.host.clear_timeout(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Debounced;
    use crate::timer::{TimerHost, VirtualTimers};
    use foundation::time::Millis;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(timers: &Rc<VirtualTimers>) -> (Debounced<u32>, Rc<RefCell<Vec<(Millis, u32)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c = calls.clone();
        let t = timers.clone();
        let host: Rc<dyn TimerHost> = timers.clone();
        let d = Debounced::new(host, 250, move |n| c.borrow_mut().push((t.now(), n)));
        (d, calls)
    }

    #[test]
    fn burst_collapses_into_one_trailing_call() {
        let timers = Rc::new(VirtualTimers::new());
        let (d, calls) = recorder(&timers);

        for n in 0..10 {
            d.call(n).unwrap();
            timers.advance(100);
        }
        // Last call at t=900; quiet period ends at t=1150.
        assert!(calls.borrow().is_empty());
        timers.advance(149);
        assert!(calls.borrow().is_empty());
        timers.advance(1);
        assert_eq!(*calls.borrow(), vec![(Millis(1150), 9)]);
        assert!(!d.is_pending());
    }

    #[test]
    fn separated_calls_each_fire() {
        let timers = Rc::new(VirtualTimers::new());
        let (d, calls) = recorder(&timers);

        d.call(1).unwrap();
        timers.advance(300);
        d.call(2).unwrap();
        timers.advance(300);
        assert_eq!(*calls.borrow(), vec![(Millis(250), 1), (Millis(550), 2)]);
    }

    #[test]
    fn cancel_suppresses_pending_call() {
        let timers = Rc::new(VirtualTimers::new());
        let (d, calls) = recorder(&timers);

        d.call(1).unwrap();
        assert!(d.is_pending());
        d.cancel();
        timers.advance(1000);
        assert!(calls.borrow().is_empty());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn dropped_debouncer_does_not_fire() {
        let timers = Rc::new(VirtualTimers::new());
        let (d, calls) = recorder(&timers);

        d.call(1).unwrap();
        drop(d);
        timers.advance(1000);
        assert!(calls.borrow().is_empty());
    }
}
