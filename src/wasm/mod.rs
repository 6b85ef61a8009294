//! Browser entry point and glue.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, VisibilityState};

use crate::activation::{ActivationController, Visibility};
use crate::config::SceneConfig;
use crate::Error;

mod asset;
pub mod celebration;
mod gl;
pub mod probe;
mod raf;
pub mod scene;
pub mod timer;
pub mod widgets;

use scene::WebScenes;

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn visibility(document: &Document) -> Visibility {
    match document.visibility_state() {
        VisibilityState::Hidden => Visibility::Hidden,
        _ => Visibility::Visible,
    }
}

#[cfg_attr(not(test), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    // A second start (test harnesses) keeps the first logger.
    let _ = console_log::init_with_level(level);
    // Nothing here is worth breaking the page over.
    if let Err(err) = run() {
        log::error!("page effects disabled: {err}");
    }
    Ok(())
}

fn run() -> crate::Result<()> {
    let window = web_sys::window().ok_or(Error::NoWindow)?;
    let document = window.document().ok_or(Error::NoDocument)?;

    if let Err(err) = widgets::install(&document) {
        log::warn!("page widgets unavailable: {err}");
    }

    let supported = probe::has_rendering_support(&document);
    probe::mark_document(&document, supported);
    if !supported {
        log::warn!("WebGL2 unavailable, keeping the static fallback");
    }

    let config = SceneConfig::for_device(probe::device_profile(&window));
    log::info!(
        "scene config: {} particles, point size {}",
        config.particles.count,
        config.particles.size
    );
    let scenes = WebScenes::from_document(&document)?;
    let bouquet_canvas = scenes.bouquet_canvas().clone();
    let controller = Rc::new(RefCell::new(ActivationController::new(scenes, config, supported)));

    if visibility(&document) == Visibility::Visible {
        controller.borrow_mut().activate();
    }

    let on_visibility = {
        let controller = Rc::clone(&controller);
        let document = document.clone();
        Closure::wrap(Box::new(move || {
            let visibility = visibility(&document);
            log::debug!("page visibility: {visibility:?}");
            controller.borrow_mut().on_visibility(visibility);
        }) as Box<dyn FnMut()>)
    };
    document.add_event_listener_with_callback("visibilitychange", on_visibility.as_ref().unchecked_ref())?;
    on_visibility.forget();

    celebration::install(&bouquet_canvas, controller)?;
    Ok(())
}
