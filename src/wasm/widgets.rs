//! Copy-link button and license modal.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Document, Event, HtmlDocument, HtmlElement, HtmlTextAreaElement};

use super::timer;
use crate::{Error, Result};

pub const COPY_BUTTON_ID: &str = "copy-link";
pub const COPY_FEEDBACK_ID: &str = "copy-feedback";
pub const LICENSE_BUTTON_ID: &str = "license-open";

/// How long "Link copied!" stays up.
pub const COPY_FEEDBACK_MS: u32 = 2000;
pub const COPY_FEEDBACK_TEXT: &str = "Link copied!";

pub const LICENSE_TEXT: &str = "This page and its source are released under the MIT License. \
Permission is hereby granted, free of charge, to any person obtaining a copy of this software \
and associated documentation files, to deal in the software without restriction. \
The software is provided \"as is\", without warranty of any kind.";

fn on_click(element: &HtmlElement, f: impl FnMut(Event) + 'static) -> Result<()> {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
    element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    // Page-lifetime listener.
    closure.forget();
    Ok(())
}

fn html_element(document: &Document, tag: &str, class: &str) -> Result<HtmlElement> {
    let element: HtmlElement = document.create_element(tag)?.unchecked_into();
    element.set_class_name(class);
    Ok(element)
}

/// Wires up the copy-link and license buttons present on the page.
pub fn install(document: &Document) -> Result<()> {
    match document.get_element_by_id(COPY_BUTTON_ID) {
        Some(button) => {
            let doc = document.clone();
            on_click(button.unchecked_ref(), move |_| {
                wasm_bindgen_futures::spawn_local(copy_link(doc.clone()));
            })?;
        }
        None => log::debug!("no #{COPY_BUTTON_ID} on this page"),
    }

    match document.get_element_by_id(LICENSE_BUTTON_ID) {
        Some(button) => {
            let doc = document.clone();
            let slot: ModalSlot = Rc::new(RefCell::new(None));
            on_click(button.unchecked_ref(), move |_| {
                if let Err(err) = open_license(&doc, &slot) {
                    log::error!("license modal failed: {err}");
                }
            })?;
        }
        None => log::debug!("no #{LICENSE_BUTTON_ID} on this page"),
    }
    Ok(())
}

/// Copies the page address, through the async clipboard when the context
/// allows it and a selected textarea otherwise. Failures are logged, never
/// shown.
pub async fn copy_link(document: Document) {
    let href = match window().ok_or(Error::NoWindow).and_then(|w| w.location().href().map_err(Error::from)) {
        Ok(href) => href,
        Err(err) => {
            log::warn!("copy link: {err}");
            return;
        }
    };
    let copied = match write_clipboard(&href).await {
        Ok(()) => Ok(()),
        Err(err) => {
            log::debug!("clipboard API failed ({err}), copying from a selection");
            copy_with_selection(&document, &href)
        }
    };
    match copied {
        Ok(()) => {
            log::debug!("copied {href}");
            show_feedback(&document);
        }
        Err(err) => log::warn!("copy link failed: {err}"),
    }
}

async fn write_clipboard(text: &str) -> Result<()> {
    let navigator = window().ok_or(Error::NoWindow)?.navigator();
    // Absent outside secure contexts.
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(Error::Js("clipboard unavailable".into()));
    }
    let write: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))?.dyn_into()?;
    let promise: Promise = write.call1(&clipboard, &JsValue::from_str(text))?.dyn_into()?;
    JsFuture::from(promise).await?;
    Ok(())
}

/// Copies `text` with `execCommand("copy")` on a temporary off-screen
/// textarea, which is always removed again.
pub fn copy_with_selection(document: &Document, text: &str) -> Result<()> {
    let body = document.body().ok_or(Error::NoDocument)?;
    let area: HtmlTextAreaElement = document.create_element("textarea")?.unchecked_into();
    area.set_value(text);
    area.set_attribute("readonly", "")?;
    area.set_attribute("style", "position: fixed; left: -9999px; top: 0; opacity: 0;")?;
    body.append_child(&area)?;
    area.select();
    let copied = document
        .dyn_ref::<HtmlDocument>()
        .ok_or_else(|| Error::Js("not an HTML document".into()))
        .and_then(|html| html.exec_command("copy").map_err(Error::from));
    area.remove();
    if copied? {
        Ok(())
    } else {
        Err(Error::Js("copy command was refused".into()))
    }
}

fn show_feedback(document: &Document) {
    let Some(feedback) = document.get_element_by_id(COPY_FEEDBACK_ID) else {
        return;
    };
    feedback.set_text_content(Some(COPY_FEEDBACK_TEXT));
    let cleared = timer::set_timeout(COPY_FEEDBACK_MS, move || {
        if feedback.text_content().as_deref() == Some(COPY_FEEDBACK_TEXT) {
            feedback.set_text_content(None);
        }
    });
    if let Err(err) = cleared {
        log::warn!("copy feedback timer: {err}");
    }
}

/// An open license overlay. Closing it is the only way scroll is restored.
pub struct LicenseModal {
    backdrop: HtmlElement,
    body: HtmlElement,
    saved_overflow: String,
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

impl LicenseModal {
    fn close(self) {
        self.backdrop.remove();
        if let Err(err) = self.body.style().set_property("overflow", &self.saved_overflow) {
            log::warn!("could not restore page scroll: {err:?}");
        }
    }
}

pub type ModalSlot = Rc<RefCell<Option<LicenseModal>>>;

/// Opens the license overlay unless one is already open.
pub fn open_license(document: &Document, slot: &ModalSlot) -> Result<()> {
    if slot.borrow().is_some() {
        return Ok(());
    }
    let body = document.body().ok_or(Error::NoDocument)?;
    let saved_overflow = body.style().get_property_value("overflow")?;

    let backdrop = html_element(document, "div", "license-backdrop")?;
    let dialog = html_element(document, "div", "license-dialog")?;
    dialog.set_attribute("role", "dialog")?;
    dialog.set_attribute("aria-modal", "true")?;
    let title = html_element(document, "h2", "license-title")?;
    title.set_text_content(Some("License"));
    let text = html_element(document, "p", "license-text")?;
    text.set_text_content(Some(LICENSE_TEXT));
    let close = html_element(document, "button", "license-close")?;
    close.set_text_content(Some("Close"));
    dialog.append_child(&title)?;
    dialog.append_child(&text)?;
    dialog.append_child(&close)?;
    backdrop.append_child(&dialog)?;

    let weak = Rc::downgrade(slot);
    let on_close = Closure::wrap(Box::new(move |_: Event| dismiss(&weak)) as Box<dyn FnMut(Event)>);
    close.add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;

    let weak = Rc::downgrade(slot);
    let target: JsValue = backdrop.clone().into();
    let on_backdrop = Closure::wrap(Box::new(move |event: Event| {
        // Clicks inside the dialog bubble up here too.
        if event.target().map(JsValue::from).as_ref() == Some(&target) {
            dismiss(&weak);
        }
    }) as Box<dyn FnMut(Event)>);
    backdrop.add_event_listener_with_callback("click", on_backdrop.as_ref().unchecked_ref())?;

    body.append_child(&backdrop)?;
    body.style().set_property("overflow", "hidden")?;
    *slot.borrow_mut() = Some(LicenseModal {
        backdrop,
        body,
        saved_overflow,
        _listeners: vec![on_close, on_backdrop],
    });
    Ok(())
}

/// Both dismissal paths end here.
pub fn dismiss(slot: &Weak<RefCell<Option<LicenseModal>>>) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let modal = slot.borrow_mut().take();
    if let Some(modal) = modal {
        modal.close();
    }
}
