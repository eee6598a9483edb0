use std::rc::Rc;

use foundation::{NodeId, Span};

use crate::config::PageConfig;
use crate::page::{Dom, EventKind, EventTarget, Page, PageEvent, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedSection {
    pub id: String,
    pub extent: Span,
}

/// Section containing `scroll_y + lookahead`. When extents overlap the last
/// section in document order wins, so at most one is ever selected.
pub fn current_section(
    sections: &[TrackedSection],
    scroll_y: f64,
    lookahead_px: f64,
) -> Option<&str> {
    let line = scroll_y + lookahead_px;
    sections
        .iter()
        .rev()
        .find(|s| s.extent.contains(line))
        .map(|s| s.id.as_str())
}

/// Link that should carry the active flag: the first whose `href` is exactly
/// `#<section_id>`.
pub fn link_for_section<'a>(
    links: impl IntoIterator<Item = (NodeId, Option<&'a str>)>,
    section_id: &str,
) -> Option<NodeId> {
    links.into_iter().find_map(|(node, href)| {
        let fragment = href?.strip_prefix('#')?;
        (fragment == section_id).then_some(node)
    })
}

/// Recomputes the active link from scratch and writes it to every link.
/// Returns the link left active, if any.
pub fn apply<P: Dom + Viewport + ?Sized>(
    page: &P,
    config: &PageConfig,
    sections: &[NodeId],
    links: &[NodeId],
) -> Option<NodeId> {
    // Layout and ids are read per event; both may change after load.
    let tracked: Vec<TrackedSection> = sections
        .iter()
        .filter_map(|&node| {
            Some(TrackedSection {
                id: page.attribute(node, "id")?,
                extent: Span::new(page.offset_top(node), page.offset_height(node)),
            })
        })
        .collect();

    let hrefs: Vec<(NodeId, Option<String>)> = links
        .iter()
        .map(|&link| (link, page.attribute(link, "href")))
        .collect();

    let active = current_section(&tracked, page.scroll_y(), config.active_lookahead_px)
        .and_then(|id| link_for_section(hrefs.iter().map(|(n, h)| (*n, h.as_deref())), id));

    for &link in links {
        if Some(link) == active {
            page.add_class(link, &config.active_class);
        } else {
            page.remove_class(link, &config.active_class);
        }
    }
    active
}

/// Tracks sections on every scroll event (unthrottled). Returns
/// `(sections, links)` counts.
pub fn install<P: Page + 'static>(page: &Rc<P>, config: &Rc<PageConfig>) -> (usize, usize) {
    let sections = page.query_all(&config.selectors.sections);
    let links = page.query_all(&config.selectors.nav_links);
    let counts = (sections.len(), links.len());

    let p = page.clone();
    let cfg = config.clone();
    page.listen(
        EventTarget::Window,
        EventKind::Scroll,
        Rc::new(move |_: &PageEvent| {
            let active = apply(&*p, &cfg, &sections, &links);
            tracing::trace!(?active, "active link recomputed");
        }),
    );
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Element, MemoryPage};
    use pretty_assertions::assert_eq;

    struct Fixture {
        page: Rc<MemoryPage>,
        links: Vec<NodeId>,
        sections: Vec<NodeId>,
    }

    // home [0, 600), about [600, 1400), a gap, contact [1600, 2000).
    fn fixture() -> Fixture {
        let page = Rc::new(MemoryPage::new());
        let nav = page.append(None, Element::new("nav").class("navbar"));
        let ul = page.append(Some(nav), Element::new("ul").class("navbar-nav"));
        let links = ["#home", "#about", "#contact"]
            .into_iter()
            .map(|href| {
                page.append(
                    Some(ul),
                    Element::new("a").class("nav-link").attr("href", href),
                )
            })
            .collect();
        let sections = [("home", 0.0, 600.0), ("about", 600.0, 800.0), ("contact", 1600.0, 400.0)]
            .into_iter()
            .map(|(id, top, h)| page.append(None, Element::new("section").id(id).layout(top, h)))
            .collect();
        Fixture {
            page,
            links,
            sections,
        }
    }

    fn tracked(id: &str, top: f64, height: f64) -> TrackedSection {
        TrackedSection {
            id: id.into(),
            extent: Span::new(top, height),
        }
    }

    #[test]
    fn current_section_uses_lookahead_and_half_open_extents() {
        let s = vec![
            tracked("a", 0.0, 100.0),
            tracked("b", 100.0, 100.0),
        ];
        assert_eq!(current_section(&s, 0.0, 100.0), Some("b"));
        assert_eq!(current_section(&s, -1.0, 100.0), Some("a"));
        assert_eq!(current_section(&s, 100.0, 100.0), None);
    }

    #[test]
    fn overlapping_sections_pick_the_last() {
        let s = vec![
            tracked("outer", 0.0, 1000.0),
            tracked("inner", 200.0, 100.0),
        ];
        assert_eq!(current_section(&s, 150.0, 100.0), Some("inner"));
        assert_eq!(current_section(&s, 500.0, 100.0), Some("outer"));
    }

    #[test]
    fn link_matching_is_exact() {
        let links = [
            (NodeId(1), Some("#about-me")),
            (NodeId(2), None),
            (NodeId(3), Some("#about")),
            (NodeId(4), Some("#about")),
        ];
        assert_eq!(link_for_section(links, "about"), Some(NodeId(3)));
        assert_eq!(link_for_section(links, "contact"), None);
    }

    #[test]
    fn scrolling_moves_the_active_flag() {
        let f = fixture();
        assert_eq!(install(&f.page, &Rc::new(PageConfig::default())), (3, 3));

        let cases = [
            (0.0, Some(0)),
            (499.0, Some(0)),
            (500.0, Some(1)),
            (1299.0, Some(1)),
            (1300.0, None), // gap between about and contact
            (1500.0, Some(2)),
            (1899.0, Some(2)),
            (1900.0, None),
        ];
        for (y, expected) in cases {
            f.page.scroll_window(y);
            let active = f.page.with_class("active");
            let expected: Vec<_> = expected.map(|i| f.links[i]).into_iter().collect();
            assert_eq!(active, expected, "y={y}");
        }
    }

    #[test]
    fn never_more_than_one_active_link() {
        let f = fixture();
        // Stale state from markup must be cleared on the first event.
        f.page.add_class(f.links[0], "active");
        f.page.add_class(f.links[2], "active");
        install(&f.page, &Rc::new(PageConfig::default()));

        let mut y = -200.0;
        while y < 2500.0 {
            f.page.scroll_window(y);
            assert!(f.page.with_class("active").len() <= 1, "y={y}");
            y += 37.0;
        }
    }

    #[test]
    fn layout_is_read_per_event() {
        let f = fixture();
        install(&f.page, &Rc::new(PageConfig::default()));
        f.page.scroll_window(1300.0);
        assert!(f.page.with_class("active").is_empty());

        // Contact section grows upwards into the gap.
        f.page.set_layout(f.sections[2], 1400.0, 600.0);
        f.page.scroll_window(1300.0);
        assert_eq!(f.page.with_class("active"), vec![f.links[2]]);
    }
}
