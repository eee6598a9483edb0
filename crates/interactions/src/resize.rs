use std::rc::Rc;

use runtime::{Debounced, TimerHost};

use crate::config::PageConfig;
use crate::navbar;
use crate::page::{EventKind, EventTarget, Page, PageEvent};

/// Re-evaluates the navbar background once resizing settles.
///
/// Resize events are coalesced by a trailing debounce of
/// `resize_debounce_ms`. The navbar is looked up on each run, so a page
/// without one is wired anyway and the run is a no-op.
pub fn install<P: Page + 'static>(
    page: &Rc<P>,
    timers: Rc<dyn TimerHost>,
    config: &Rc<PageConfig>,
) -> Rc<Debounced<()>> {
    let p = page.clone();
    let cfg = config.clone();
    let debounced = Rc::new(Debounced::new(timers, config.resize_debounce_ms, move |()| {
        let state = navbar::refresh(&*p, &cfg);
        tracing::debug!(?state, "navbar re-evaluated after resize");
    }));

    let d = debounced.clone();
    page.listen(
        EventTarget::Window,
        EventKind::Resize,
        Rc::new(move |_: &PageEvent| {
            if let Err(err) = d.call(()) {
                tracing::warn!(%err, "could not debounce resize");
            }
        }),
    );
    debounced
}
