//! `setTimeout` / `setInterval` wrappers.

use js_sys::Promise;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::window;

use crate::{Error, Result};

/// Runs `f` once after `ms`. The callback frees itself after firing.
pub fn set_timeout(ms: u32, f: impl FnOnce() + 'static) -> Result<i32> {
    let window = window().ok_or(Error::NoWindow)?;
    let callback = Closure::once_into_js(f);
    let id = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms as i32)?;
    Ok(id)
}

/// A repeating timer, cleared on [`cancel`](Self::cancel) or drop.
pub struct Interval {
    id: Option<i32>,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new(ms: u32, f: impl FnMut() + 'static) -> Result<Self> {
        let window = window().ok_or(Error::NoWindow)?;
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), ms as i32)?;
        Ok(Self {
            id: Some(id),
            _callback: callback,
        })
    }

    pub fn cancel(&mut self) {
        if let (Some(id), Some(window)) = (self.id.take(), window()) {
            window.clear_interval_with_handle(id);
        }
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Resolves after `ms`. Without a window it resolves immediately.
pub async fn sleep(ms: u32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        let scheduled = window().map(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}
