//! The double-activation "happy birthday" overlay.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Element, Event, HtmlCanvasElement, HtmlElement};

use super::scene::{BouquetHandle, WebScenes};
use super::timer::{self, Interval};
use crate::activation::ActivationController;
use crate::celebration::{
    CelebrationPlan, Event as Step, ParticleKind, Spawn, Timeline, BANNER_TEXT, BOOST_INTERVAL_MS, BOOST_STEP, STYLE,
};
use crate::gesture::{DoubleActivation, PointerKind};
use crate::{Error, Result};

/// Listens for double clicks / double taps on the bouquet canvas.
pub fn install(canvas: &HtmlCanvasElement, controller: Rc<RefCell<ActivationController<WebScenes>>>) -> Result<()> {
    let detector = Rc::new(RefCell::new(DoubleActivation::new()));
    for (event, kind) in [("click", PointerKind::Mouse), ("touchend", PointerKind::Touch)] {
        let detector = Rc::clone(&detector);
        let controller = Rc::clone(&controller);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if !detector.borrow_mut().register(kind, event.time_stamp()) {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            // The handle is weak; a bouquet stopped mid-celebration is skipped.
            let bouquet = controller.borrow().bouquet();
            if let Err(err) = celebrate(&document, bouquet) {
                log::warn!("celebration failed: {err}");
            }
        }) as Box<dyn FnMut(Event)>);
        canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn div(document: &Document, class: &str) -> Result<HtmlElement> {
    let element: HtmlElement = document.create_element("div")?.unchecked_into();
    element.set_class_name(class);
    Ok(element)
}

fn build(document: &Document, spawn: &Spawn) -> Result<HtmlElement> {
    let element = div(document, spawn.kind.class())?;
    let style = match spawn.kind {
        ParticleKind::Confetti => format!(
            "left: {:.1}%; width: {:.1}px; height: {:.1}px; background: {}; animation-duration: {}ms;",
            spawn.left_pct,
            spawn.size_px,
            spawn.size_px * 0.6,
            spawn.paint,
            spawn.lifetime_ms,
        ),
        ParticleKind::Sparkle | ParticleKind::Heart => {
            element.set_text_content(Some(spawn.paint));
            format!(
                "left: {:.1}%; top: {:.1}%; font-size: {:.1}px; animation-duration: {}ms;",
                spawn.left_pct, spawn.top_pct, spawn.size_px, spawn.lifetime_ms,
            )
        }
    };
    element.set_attribute("style", &style)?;
    Ok(element)
}

struct Overlay {
    document: Document,
    root: HtmlElement,
    style: Element,
    spawns: Vec<Spawn>,
    live: Vec<Option<HtmlElement>>,
    boost: Option<Interval>,
}

impl Overlay {
    fn apply(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Spawn(index) => {
                let Some(slot) = self.live.get_mut(index) else {
                    return Ok(());
                };
                let element = build(&self.document, &self.spawns[index])?;
                self.root.append_child(&element)?;
                *slot = Some(element);
            }
            Step::Remove(index) => {
                if let Some(element) = self.live.get_mut(index).and_then(Option::take) {
                    element.remove();
                }
            }
            Step::EndBoost => self.boost = None,
            Step::RemoveOverlay => {
                self.boost = None;
                self.live.clear();
                self.root.remove();
                self.style.remove();
            }
        }
        Ok(())
    }
}

fn schedule(overlay: &Rc<RefCell<Overlay>>, bouquet: Option<BouquetHandle>, timeline: &Timeline) -> Result<()> {
    for (at, step) in timeline.scheduling_order() {
        let overlay = Rc::clone(overlay);
        timer::set_timeout(at, move || {
            if let Err(err) = overlay.borrow_mut().apply(step) {
                log::warn!("celebration step {step:?}: {err}");
            }
        })?;
    }
    if let Some(bouquet) = bouquet {
        let boost = Interval::new(BOOST_INTERVAL_MS, move || {
            bouquet.boost(BOOST_STEP);
        })?;
        overlay.borrow_mut().boost = Some(boost);
    }
    Ok(())
}

/// Shows the overlay and, if the bouquet is live, spins it faster for a
/// while. Everything it adds removes itself.
pub fn celebrate(document: &Document, bouquet: Option<BouquetHandle>) -> Result<()> {
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let plan = CelebrationPlan::generate(&mut SmallRng::seed_from_u64(seed));
    let timeline = plan.timeline();
    let end_ms = timeline.last_at();

    let head = document.head().ok_or(Error::NoDocument)?;
    let body = document.body().ok_or(Error::NoDocument)?;
    let style = document.create_element("style")?;
    style.set_text_content(Some(STYLE));
    let root = div(document, "celebration-overlay")?;
    let banner = div(document, "celebration-banner")?;
    banner.set_text_content(Some(BANNER_TEXT));
    root.append_child(&banner)?;
    head.append_child(&style)?;
    if let Err(err) = body.append_child(&root) {
        style.remove();
        return Err(err.into());
    }

    let overlay = Rc::new(RefCell::new(Overlay {
        document: document.clone(),
        root,
        style,
        live: vec![None; plan.spawns.len()],
        spawns: plan.spawns,
        boost: None,
    }));
    if let Err(err) = schedule(&overlay, bouquet, &timeline) {
        overlay.borrow_mut().apply(Step::RemoveOverlay)?;
        return Err(err);
    }
    log::info!("celebrating for {end_ms} ms");
    Ok(())
}
