//! Capability traits through which behaviors read and mutate the page.
//!
//! Behaviors never touch browser globals. They receive a page implementing
//! [`Dom`], [`Viewport`] and [`Events`]; the wasm app backs these with
//! `web-sys`, tests use [`crate::memory::MemoryPage`].

use std::cell::Cell;
use std::rc::Rc;

use foundation::{NodeId, Point, Rect};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Scroll,
    Resize,
    Submit,
    PointerMove,
    PointerLeave,
}

impl EventKind {
    /// DOM event type name.
    pub fn dom_name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Scroll => "scroll",
            EventKind::Resize => "resize",
            EventKind::Submit => "submit",
            EventKind::PointerMove => "mousemove",
            EventKind::PointerLeave => "mouseleave",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Node(NodeId),
}

/// An event as seen by a handler.
///
/// `prevent_default` is recorded here and forwarded to the host event once
/// the handler returns.
#[derive(Debug)]
pub struct PageEvent {
    kind: EventKind,
    target: EventTarget,
    pointer: Option<Point>,
    default_prevented: Cell<bool>,
}

impl PageEvent {
    pub fn new(kind: EventKind, target: EventTarget) -> Self {
        Self {
            kind,
            target,
            pointer: None,
            default_prevented: Cell::new(false),
        }
    }

    /// Attaches client coordinates of the pointer.
    pub fn with_pointer(mut self, pointer: Point) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    /// The node the listener was registered on, if any.
    pub fn current_node(&self) -> Option<NodeId> {
        match self.target {
            EventTarget::Node(node) => Some(node),
            EventTarget::Window => None,
        }
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub type Handler = Rc<dyn Fn(&PageEvent)>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Read and mutate elements.
///
/// Invalid selectors match nothing.
pub trait Dom {
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// First descendant of `root` matching `selector`.
    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId>;

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Document-relative layout offset (`offsetTop`).
    fn offset_top(&self, node: NodeId) -> f64;

    fn offset_height(&self, node: NodeId) -> f64;

    /// Viewport-relative box (`getBoundingClientRect()`).
    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// Sets an inline style property; custom properties (`--x`) included.
    fn set_style(&self, node: NodeId, property: &str, value: &str);

    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    fn add_class(&self, node: NodeId, class: &str);

    fn remove_class(&self, node: NodeId, class: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn set_inner_html(&self, node: NodeId, html: &str);

    fn set_disabled(&self, node: NodeId, disabled: bool);

    /// First value submitted under `name` by `form` (`FormData.get`).
    fn form_field(&self, form: NodeId, name: &str) -> Option<String>;
}

pub trait Viewport {
    /// Vertical scroll offset of the document (`scrollY`).
    fn scroll_y(&self) -> f64;

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    /// Blocking modal message.
    fn alert(&self, message: &str);
}

pub trait Events {
    /// Registers `handler` for the page lifetime.
    fn listen(&self, target: EventTarget, kind: EventKind, handler: Handler);
}

/// Everything a behavior installer needs.
pub trait Page: Dom + Viewport + Events {}

impl<T: Dom + Viewport + Events + ?Sized> Page for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prevent_default_is_sticky() {
        let e = PageEvent::new(EventKind::Submit, EventTarget::Node(NodeId(3)));
        assert!(!e.default_prevented());
        e.prevent_default();
        e.prevent_default();
        assert!(e.default_prevented());
        assert_eq!(e.current_node(), Some(NodeId(3)));
    }

    #[test]
    fn window_events_have_no_node() {
        let e = PageEvent::new(EventKind::Scroll, EventTarget::Window);
        assert_eq!(e.current_node(), None);
        assert_eq!(e.pointer(), None);
        assert_eq!(EventKind::PointerLeave.dom_name(), "mouseleave");
    }
}
