use std::rc::Rc;

use foundation::NodeId;

use crate::config::PageConfig;
use crate::page::{Dom, EventKind, EventTarget, Page, PageEvent, Viewport};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NavbarState {
    Top,
    Scrolled,
}

impl NavbarState {
    /// `Scrolled` strictly above the threshold. NaN offsets read as `Top`.
    pub fn for_offset(scroll_y: f64, threshold_px: f64) -> Self {
        if scroll_y > threshold_px {
            NavbarState::Scrolled
        } else {
            NavbarState::Top
        }
    }

    pub fn background(self, config: &PageConfig) -> &str {
        match self {
            NavbarState::Top => &config.navbar_background_top,
            NavbarState::Scrolled => &config.navbar_background_scrolled,
        }
    }
}

/// Writes the background matching the current scroll offset.
pub fn apply<P: Dom + Viewport + ?Sized>(
    page: &P,
    config: &PageConfig,
    navbar: NodeId,
) -> NavbarState {
    let state = NavbarState::for_offset(page.scroll_y(), config.navbar_threshold_px);
    page.set_style(navbar, "background", state.background(config));
    state
}

/// Looks the navbar up again and re-applies its background. Used after
/// layout changes, when the originally captured node may be stale.
pub fn refresh<P: Dom + Viewport + ?Sized>(page: &P, config: &PageConfig) -> Option<NavbarState> {
    let navbar = page.query(&config.selectors.navbar)?;
    Some(apply(page, config, navbar))
}

/// Re-applies the background on every scroll event. Returns the navbar node,
/// or `None` (nothing wired) when the page has no navbar.
pub fn install<P: Page + 'static>(page: &Rc<P>, config: &Rc<PageConfig>) -> Option<NodeId> {
    let Some(navbar) = page.query(&config.selectors.navbar) else {
        tracing::debug!(selector = %config.selectors.navbar, "no navbar on page");
        return None;
    };
    let p = page.clone();
    let cfg = config.clone();
    page.listen(
        EventTarget::Window,
        EventKind::Scroll,
        Rc::new(move |_: &PageEvent| {
            apply(&*p, &cfg, navbar);
        }),
    );
    Some(navbar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Element, MemoryPage};

    const TOP: &str = "rgba(33, 37, 41, 0.95)";
    const SCROLLED: &str = "rgba(33, 37, 41, 0.98)";

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(NavbarState::for_offset(0.0, 50.0), NavbarState::Top);
        assert_eq!(NavbarState::for_offset(50.0, 50.0), NavbarState::Top);
        assert_eq!(NavbarState::for_offset(50.5, 50.0), NavbarState::Scrolled);
        assert_eq!(NavbarState::for_offset(f64::NAN, 50.0), NavbarState::Top);
    }

    #[test]
    fn scroll_toggles_background() {
        let page = Rc::new(MemoryPage::new());
        let navbar = page.append(None, Element::new("nav").class("navbar"));
        let cfg = Rc::new(PageConfig::default());
        assert_eq!(install(&page, &cfg), Some(navbar));

        for (y, expected) in [(0.0, TOP), (51.0, SCROLLED), (50.0, TOP), (900.0, SCROLLED)] {
            page.scroll_window(y);
            assert_eq!(page.style(navbar, "background").as_deref(), Some(expected));
        }
        // Same state twice leaves the same value.
        page.scroll_window(901.0);
        assert_eq!(page.style(navbar, "background").as_deref(), Some(SCROLLED));
    }

    #[test]
    fn missing_navbar_is_not_wired() {
        let page = Rc::new(MemoryPage::new());
        let cfg = Rc::new(PageConfig::default());
        assert_eq!(install(&page, &cfg), None);
        assert_eq!(page.listener_count(EventTarget::Window, EventKind::Scroll), 0);
        assert_eq!(refresh(&*page, &cfg), None);
    }
}
