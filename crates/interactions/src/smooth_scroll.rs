use std::rc::Rc;

use foundation::NodeId;

use crate::config::PageConfig;
use crate::page::{Dom, EventKind, EventTarget, Page, PageEvent, ScrollBehavior, Viewport};

/// Element id named by an in-page `href` (`"#about"` → `"about"`).
///
/// A bare `#` names nothing.
pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Scroll offset that puts a target at `target_top` just below the header.
pub fn scroll_destination(target_top: f64, header_offset_px: f64) -> f64 {
    target_top - header_offset_px
}

/// Click handler body. The default jump is always suppressed; returns the
/// scroll destination when the fragment resolves to an element.
pub fn handle_click<P: Dom + Viewport + ?Sized>(
    page: &P,
    config: &PageConfig,
    link: NodeId,
    event: &PageEvent,
) -> Option<f64> {
    event.prevent_default();
    let href = page.attribute(link, "href")?;
    let Some(target) = fragment_id(&href).and_then(|id| page.element_by_id(id)) else {
        tracing::debug!(%href, "fragment has no target");
        return None;
    };
    let top = scroll_destination(page.offset_top(target), config.header_offset_px);
    page.scroll_to(top, ScrollBehavior::Smooth);
    tracing::trace!(%href, top, "smooth scroll");
    Some(top)
}

/// Intercepts clicks on every in-page anchor. Returns the number of links wired.
pub fn install<P: Page + 'static>(page: &Rc<P>, config: &Rc<PageConfig>) -> usize {
    let links = page.query_all(&config.selectors.fragment_links);
    for &link in &links {
        let p = page.clone();
        let cfg = config.clone();
        page.listen(
            EventTarget::Node(link),
            EventKind::Click,
            Rc::new(move |e: &PageEvent| {
                handle_click(&*p, &cfg, link, e);
            }),
        );
    }
    links.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Element, MemoryPage};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Rc<MemoryPage>, NodeId, NodeId, NodeId) {
        let page = Rc::new(MemoryPage::new());
        let nav = page.append(None, Element::new("nav"));
        let good = page.append(Some(nav), Element::new("a").attr("href", "#projects"));
        let missing = page.append(Some(nav), Element::new("a").attr("href", "#nowhere"));
        let bare = page.append(Some(nav), Element::new("a").attr("href", "#"));
        page.append(Some(nav), Element::new("a").attr("href", "https://example.com"));
        page.append(
            None,
            Element::new("section").id("projects").layout(1200.0, 600.0),
        );
        (page, good, missing, bare)
    }

    #[test]
    fn fragment_ids() {
        assert_eq!(fragment_id("#about"), Some("about"));
        assert_eq!(fragment_id("#"), None);
        assert_eq!(fragment_id("about"), None);
        assert_eq!(fragment_id(""), None);
    }

    #[test]
    fn wires_only_in_page_links() {
        let (page, ..) = fixture();
        assert_eq!(install(&page, &Rc::new(PageConfig::default())), 3);
    }

    #[test]
    fn existing_target_scrolls_below_header() {
        let (page, good, ..) = fixture();
        install(&page, &Rc::new(PageConfig::default()));

        let event = page.click(good);
        assert!(event.default_prevented());
        assert_eq!(page.scroll_requests(), vec![(1130.0, ScrollBehavior::Smooth)]);
        assert_eq!(page.scroll_y(), 1130.0);
    }

    #[test]
    fn missing_target_prevents_default_without_scrolling() {
        let (page, _, missing, bare) = fixture();
        install(&page, &Rc::new(PageConfig::default()));
        page.scroll_window(42.0);

        for link in [missing, bare] {
            assert!(page.click(link).default_prevented());
        }
        assert!(page.scroll_requests().is_empty());
        assert_eq!(page.scroll_y(), 42.0);
    }

    #[test]
    fn header_offset_is_configurable() {
        let (page, good, ..) = fixture();
        let cfg = PageConfig {
            header_offset_px: 0.0,
            ..PageConfig::default()
        };
        install(&page, &Rc::new(cfg));
        page.click(good);
        assert_eq!(page.scroll_requests(), vec![(1200.0, ScrollBehavior::Smooth)]);
    }
}
