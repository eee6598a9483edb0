//! In-memory page: a tiny element tree plus a fake viewport.
//!
//! Implements the page traits without a browser so every behavior can be
//! driven by synthetic events in tests and native tools.

mod selector;

pub use selector::{ElementTree, Selector, SelectorError};

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use foundation::{NodeId, Point, Rect};

use crate::page::{
    Dom, EventKind, EventTarget, Events, Handler, PageEvent, ScrollBehavior, Viewport,
};

/// Description of an element to append to a [`MemoryPage`].
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    offset_top: f64,
    offset_height: f64,
    rect: Rect,
    value: Option<String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        for c in class.split_whitespace() {
            if !self.classes.iter().any(|x| x == c) {
                self.classes.push(c.to_string());
            }
        }
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Document layout box (`offsetTop` / `offsetHeight`).
    pub fn layout(mut self, offset_top: f64, offset_height: f64) -> Self {
        self.offset_top = offset_top;
        self.offset_height = offset_height;
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Current value of a form control.
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }
}

#[derive(Debug)]
struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    styles: BTreeMap<String, String>,
    inner_html: String,
    disabled: bool,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Pre-order walk, i.e. document order.
    fn document_order(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.node(node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }
}

impl ElementTree for Tree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn tag(&self, node: NodeId) -> &str {
        self.node(node).map(|n| n.element.tag.as_str()).unwrap_or("")
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        let n = self.node(node)?;
        if name == "class" {
            // Classes live in their own list; expose them only via has_class.
            return None;
        }
        n.element.attrs.get(name).map(String::as_str)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.element.classes.iter().any(|c| c == class))
    }
}

/// A browser-free [`crate::page::Page`].
pub struct MemoryPage {
    tree: RefCell<Tree>,
    listeners: RefCell<Vec<(EventTarget, EventKind, Handler)>>,
    scroll_y: Cell<f64>,
    scroll_requests: RefCell<Vec<(f64, ScrollBehavior)>>,
    alerts: RefCell<Vec<String>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        Self {
            tree: RefCell::new(Tree::default()),
            listeners: RefCell::new(Vec::new()),
            scroll_y: Cell::new(0.0),
            scroll_requests: RefCell::new(Vec::new()),
            alerts: RefCell::new(Vec::new()),
        }
    }

    /// Appends `element` as the last child of `parent`, or as a new root when
    /// `parent` is `None` or unknown to this page.
    pub fn append(&self, parent: Option<NodeId>, element: Element) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = NodeId(tree.nodes.len() as u32);
        let parent = parent.filter(|p| p.index() < tree.nodes.len());
        match parent.and_then(|p| tree.node_mut(p)) {
            Some(p) => p.children.push(id),
            None => tree.roots.push(id),
        }
        tree.nodes.push(Node {
            element,
            parent,
            children: Vec::new(),
            styles: BTreeMap::new(),
            inner_html: String::new(),
            disabled: false,
        });
        id
    }

    pub fn set_value(&self, node: NodeId, value: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.element.value = Some(value.to_string());
        }
    }

    pub fn set_layout(&self, node: NodeId, offset_top: f64, offset_height: f64) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.element.offset_top = offset_top;
            n.element.offset_height = offset_height;
        }
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.inner_html.clone())
            .unwrap_or_default()
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.tree.borrow().node(node).is_some_and(|n| n.disabled)
    }

    /// Nodes carrying `class`, in document order.
    pub fn with_class(&self, class: &str) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.document_order(&tree.roots)
            .into_iter()
            .filter(|&id| tree.has_class(id, class))
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn scroll_requests(&self) -> Vec<(f64, ScrollBehavior)> {
        self.scroll_requests.borrow().clone()
    }

    pub fn listener_count(&self, target: EventTarget, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(t, k, _)| *t == target && *k == kind)
            .count()
    }

    /// Runs every handler registered for the event's target and kind.
    pub fn dispatch(&self, event: PageEvent) -> PageEvent {
        let handlers: Vec<Handler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(t, k, _)| *t == event.target() && *k == event.kind())
            .map(|(_, _, h)| h.clone())
            .collect();
        // Handlers may register listeners or touch the tree; no borrows held.
        for handler in handlers {
            handler(&event);
        }
        event
    }

    /// Moves the viewport to `y` and fires `scroll` on the window.
    pub fn scroll_window(&self, y: f64) -> PageEvent {
        self.scroll_y.set(y);
        self.dispatch(PageEvent::new(EventKind::Scroll, EventTarget::Window))
    }

    pub fn resize(&self) -> PageEvent {
        self.dispatch(PageEvent::new(EventKind::Resize, EventTarget::Window))
    }

    pub fn click(&self, node: NodeId) -> PageEvent {
        self.dispatch(PageEvent::new(EventKind::Click, EventTarget::Node(node)))
    }

    pub fn submit(&self, form: NodeId) -> PageEvent {
        self.dispatch(PageEvent::new(EventKind::Submit, EventTarget::Node(form)))
    }

    pub fn pointer_move(&self, node: NodeId, client: Point) -> PageEvent {
        self.dispatch(
            PageEvent::new(EventKind::PointerMove, EventTarget::Node(node)).with_pointer(client),
        )
    }

    pub fn pointer_leave(&self, node: NodeId) -> PageEvent {
        self.dispatch(PageEvent::new(
            EventKind::PointerLeave,
            EventTarget::Node(node),
        ))
    }

    fn select(&self, within: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        let selector = match Selector::parse(selector) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(%selector, %err, "ignoring invalid selector");
                return Vec::new();
            }
        };
        let tree = self.tree.borrow();
        let scope = match within {
            Some(root) => tree.node(root).map(|n| n.children.clone()).unwrap_or_default(),
            None => tree.roots.clone(),
        };
        tree.document_order(&scope)
            .into_iter()
            .filter(|&id| within.is_none_or(|root| tree.is_ancestor(root, id)))
            .filter(|&id| selector.matches(&*tree, id))
            .collect()
    }
}

impl Dom for MemoryPage {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(None, selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.select(Some(root), selector).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        let tree = self.tree.borrow();
        tree.document_order(&tree.roots)
            .into_iter()
            .find(|&n| tree.attr(n, "id") == Some(id))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let n = tree.node(node)?;
        if name == "class" {
            return (!n.element.classes.is_empty()).then(|| n.element.classes.join(" "));
        }
        n.element.attrs.get(name).cloned()
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.tree
            .borrow()
            .node(node)
            .map_or(0.0, |n| n.element.offset_top)
    }

    fn offset_height(&self, node: NodeId) -> f64 {
        self.tree
            .borrow()
            .node(node)
            .map_or(0.0, |n| n.element.offset_height)
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.element.rect)
            .unwrap_or_default()
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree.borrow().node(node)?.styles.get(property).cloned()
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            if !n.element.classes.iter().any(|c| c == class) {
                n.element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.element.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        ElementTree::has_class(&*self.tree.borrow(), node, class)
    }

    fn set_inner_html(&self, node: NodeId, html: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.inner_html = html.to_string();
        }
    }

    fn set_disabled(&self, node: NodeId, disabled: bool) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.disabled = disabled;
        }
    }

    fn form_field(&self, form: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let scope = tree.node(form)?.children.clone();
        tree.document_order(&scope)
            .into_iter()
            .find(|&id| tree.attr(id, "name") == Some(name))
            .map(|id| {
                tree.node(id)
                    .and_then(|n| n.element.value.clone())
                    .unwrap_or_default()
            })
    }
}

impl Viewport for MemoryPage {
    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        self.scroll_requests.borrow_mut().push((top, behavior));
        // Documents cannot scroll above their origin.
        self.scroll_y.set(top.max(0.0));
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

impl Events for MemoryPage {
    fn listen(&self, target: EventTarget, kind: EventKind, handler: Handler) {
        self.listeners.borrow_mut().push((target, kind, handler));
    }
}
