use std::cell::RefCell;

use foundation::{NodeId, Point, Rect};
use gloo::events::{EventListener, EventListenerOptions};
use interactions::{
    Dom, EventKind, EventTarget, Events, Handler, PageError, PageEvent, ScrollBehavior, Viewport,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, FormData, HtmlButtonElement, HtmlElement, HtmlFormElement, MouseEvent,
    ScrollToOptions, Window,
};

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

/// Raw coordinate if it is a usable number, the whole-pixel value otherwise.
fn sub_pixel(raw: Option<f64>, whole: i32) -> f64 {
    raw.filter(|v| v.is_finite()).unwrap_or(f64::from(whole))
}

/// Sub-pixel pointer position. `clientX`/`clientY` are doubles in the DOM but
/// web-sys types them as `i32`, so read the raw properties first.
fn client_point(mouse: &MouseEvent) -> Point {
    let coord = |name: &str, whole: i32| {
        let raw = js_sys::Reflect::get(mouse, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_f64());
        sub_pixel(raw, whole)
    };
    Point::new(
        coord("clientX", mouse.client_x()),
        coord("clientY", mouse.client_y()),
    )
}

/// The live browser document behind the page traits.
///
/// Elements are interned on first sight; a [`NodeId`] indexes into that table
/// for the page lifetime. Listeners are kept alive here until unload.
pub struct DomPage {
    window: Window,
    document: Document,
    nodes: RefCell<Vec<Element>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl DomPage {
    pub fn new() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or(PageError::Unavailable("window"))?;
        let document = window.document().ok_or(PageError::Unavailable("document"))?;
        Ok(Self {
            window,
            document,
            nodes: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Text content of the element with `id`, if present.
    pub fn text_of(&self, id: &str) -> Option<String> {
        self.document.get_element_by_id(id)?.text_content()
    }

    fn intern(&self, element: Element) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(i) = nodes.iter().position(|n| *n == element) {
            return NodeId(i as u32);
        }
        nodes.push(element);
        NodeId((nodes.len() - 1) as u32)
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node.index()).cloned()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }
}

impl Dom for DomPage {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(%selector, err = %js_err(e), "querySelectorAll failed");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .map(|el| self.intern(el))
            .collect()
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let found = self.element(root)?.query_selector(selector);
        match found {
            Ok(el) => el.map(|el| self.intern(el)),
            Err(e) => {
                tracing::warn!(%selector, err = %js_err(e), "querySelector failed");
                None
            }
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        let el = self.document.get_element_by_id(id)?;
        Some(self.intern(el))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.html(node).map_or(0.0, |el| f64::from(el.offset_top()))
    }

    fn offset_height(&self, node: NodeId) -> f64 {
        self.html(node).map_or(0.0, |el| f64::from(el.offset_height()))
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.element(node)
            .map(|el| {
                let r = el.get_bounding_client_rect();
                Rect::new(r.left(), r.top(), r.width(), r.height())
            })
            .unwrap_or_default()
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.html(node) else { return };
        if let Err(e) = el.style().set_property(property, value) {
            tracing::warn!(%property, err = %js_err(e), "style update rejected");
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.html(node)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn add_class(&self, node: NodeId, class: &str) {
        let Some(el) = self.element(node) else { return };
        if let Err(e) = el.class_list().add_1(class) {
            tracing::warn!(%class, err = %js_err(e), "classList.add rejected");
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        let Some(el) = self.element(node) else { return };
        if let Err(e) = el.class_list().remove_1(class) {
            tracing::warn!(%class, err = %js_err(e), "classList.remove rejected");
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn set_inner_html(&self, node: NodeId, html: &str) {
        if let Some(el) = self.element(node) {
            el.set_inner_html(html);
        }
    }

    fn set_disabled(&self, node: NodeId, disabled: bool) {
        let Some(el) = self.element(node) else { return };
        if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
            return;
        }
        let result = if disabled {
            el.set_attribute("disabled", "")
        } else {
            el.remove_attribute("disabled")
        };
        if let Err(e) = result {
            tracing::warn!(err = %js_err(e), "disabled attribute update rejected");
        }
    }

    fn form_field(&self, form: NodeId, name: &str) -> Option<String> {
        let form = self.element(form)?.dyn_into::<HtmlFormElement>().ok()?;
        let data = match FormData::new_with_form(&form) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(err = %js_err(e), "FormData construction failed");
                return None;
            }
        };
        // `null` for absent fields; File entries are not text either.
        data.get(name).as_string()
    }
}

impl Viewport for DomPage {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            tracing::warn!(err = %js_err(e), "alert failed");
        }
    }
}

impl Events for DomPage {
    fn listen(&self, target: EventTarget, kind: EventKind, handler: Handler) {
        // gloo listeners are passive unless asked otherwise; only click and
        // submit handlers ever cancel the default action.
        let options = match kind {
            EventKind::Click | EventKind::Submit => EventListenerOptions::enable_prevent_default(),
            _ => EventListenerOptions::default(),
        };
        let callback = move |event: &web_sys::Event| {
            let mut page_event = PageEvent::new(kind, target);
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                page_event = page_event.with_pointer(client_point(mouse));
            }
            handler(&page_event);
            if page_event.default_prevented() {
                event.prevent_default();
            }
        };

        let listener = match target {
            EventTarget::Window => {
                EventListener::new_with_options(&self.window, kind.dom_name(), options, callback)
            }
            EventTarget::Node(node) => {
                let Some(el) = self.element(node) else {
                    tracing::warn!(?node, "listen on unknown node");
                    return;
                };
                EventListener::new_with_options(&el, kind.dom_name(), options, callback)
            }
        };
        self.listeners.borrow_mut().push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::sub_pixel;

    #[test]
    fn pointer_keeps_fractional_pixels() {
        assert_eq!(sub_pixel(Some(97.5), 97), 97.5);
        assert_eq!(sub_pixel(Some(-0.25), 0), -0.25);
    }

    #[test]
    fn pointer_falls_back_to_whole_pixels() {
        assert_eq!(sub_pixel(None, 42), 42.0);
        assert_eq!(sub_pixel(Some(f64::NAN), 42), 42.0);
    }
}
