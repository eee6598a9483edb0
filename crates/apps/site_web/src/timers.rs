use runtime::{TimerCallback, TimerError, TimerHost, TimerId};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

/// `setTimeout`-backed timers.
///
/// Callbacks are handed to JS as one-shot closures, freed once they run.
/// A cleared timer's closure is never run and stays allocated.
pub struct BrowserTimers {
    window: Window,
}

impl BrowserTimers {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl TimerHost for BrowserTimers {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Result<TimerId, TimerError> {
        let closure = Closure::once_into_js(move || callback());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), delay)
            .map(TimerId)
            .map_err(|e| TimerError(e.as_string().unwrap_or_else(|| format!("{e:?}"))))
    }

    fn clear_timeout(&self, id: TimerId) {
        self.window.clear_timeout_with_handle(id.0);
    }
}
