use console_error_panic_hook::set_once;
use gloo::events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;

use interactions::{PageConfig, PageController, PageError};

mod dom;
mod logging;
mod timers;

use dom::DomPage;
use timers::BrowserTimers;

/// Id of an optional `<script type="application/json">` element holding a
/// [`PageConfig`] override.
pub const CONFIG_ELEMENT_ID: &str = "page-interactions-config";

static INITIALIZED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static CONTROLLER: RefCell<Option<PageController<DomPage>>> = const { RefCell::new(None) };
    static READY_LISTENER: RefCell<Option<EventListener>> = const { RefCell::new(None) };
}

fn to_js(err: PageError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| to_js(PageError::Unavailable("window")))?;
    let document = window
        .document()
        .ok_or_else(|| to_js(PageError::Unavailable("document")))?;

    if document.ready_state() == "loading" {
        let listener = EventListener::once(&document, "DOMContentLoaded", |_| install_logged());
        READY_LISTENER.with(|slot| *slot.borrow_mut() = Some(listener));
    } else {
        install_logged();
    }
    Ok(())
}

fn install_logged() {
    if let Err(err) = install() {
        console_error(&format!("page interactions: {err}"));
    }
}

fn install() -> Result<(), PageError> {
    let page = Rc::new(DomPage::new()?);
    let config = load_config(&page);
    // An unparseable level was already rejected by `load_config`.
    logging::init(config.log_level().unwrap_or(tracing::Level::INFO));

    let timers = Rc::new(BrowserTimers::new(page.window().clone()));
    let controller = PageController::install(page, timers, config);
    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
    Ok(())
}

/// Embedded override if present and valid, defaults otherwise.
fn load_config(page: &DomPage) -> PageConfig {
    let Some(text) = page.text_of(CONFIG_ELEMENT_ID) else {
        return PageConfig::default();
    };
    match PageConfig::from_json(&text) {
        Ok(config) => config,
        Err(err) => {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "page interactions: ignoring #{CONFIG_ELEMENT_ID}: {err}"
            )));
            PageConfig::default()
        }
    }
}

/// Effective configuration as JSON; the defaults before installation.
#[wasm_bindgen]
pub fn config_json() -> Result<String, JsValue> {
    let json = CONTROLLER.with(|slot| match slot.borrow().as_ref() {
        Some(controller) => controller.config().to_json(),
        None => PageConfig::default().to_json(),
    });
    json.map_err(to_js)
}

/// What was wired on this page, as JSON; `None` until the document is ready.
#[wasm_bindgen]
pub fn install_report() -> Result<Option<String>, JsValue> {
    CONTROLLER.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|controller| serde_json::to_string(&controller.report()))
            .transpose()
            .map_err(|err| to_js(err.into()))
    })
}
