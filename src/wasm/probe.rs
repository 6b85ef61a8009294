//! Runtime capability checks.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, Window};

use crate::config::DeviceProfile;

pub const ENABLED_CLASS: &str = "webgl-enabled";
pub const FALLBACK_CLASS: &str = "no-webgl";

/// Tries to open a WebGL2 context on a scratch canvas. Never throws.
pub fn has_rendering_support(document: &Document) -> bool {
    let Ok(element) = document.create_element("canvas") else {
        return false;
    };
    let Ok(canvas) = element.dyn_into::<HtmlCanvasElement>() else {
        return false;
    };
    matches!(canvas.get_context("webgl2"), Ok(Some(_)))
}

pub fn device_profile(window: &Window) -> DeviceProfile {
    let user_agent = window.navigator().user_agent().unwrap_or_default();
    DeviceProfile::detect(&user_agent, window.device_pixel_ratio())
}

/// Marks `<html>` so the stylesheet can swap in the static fallback.
pub fn mark_document(document: &Document, supported: bool) {
    let Some(root) = document.document_element() else {
        return;
    };
    let classes = root.class_list();
    let (add, remove) = if supported {
        (ENABLED_CLASS, FALLBACK_CLASS)
    } else {
        (FALLBACK_CLASS, ENABLED_CLASS)
    };
    let _ = classes.remove_1(remove);
    let _ = classes.add_1(add);
}
