use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::window;

use crate::animation::{AnimationDriver, FrameStep, TimeScaling};
use crate::{Error, Result};

struct Inner {
    driver: RefCell<AnimationDriver>,
    on_frame: RefCell<Box<dyn FnMut(FrameStep)>>,
    // `callback` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. It captures only a `Weak` back to
    // `Inner`, so dropping the `RafLoop` frees both.
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    pending: Cell<Option<i32>>,
}

impl Inner {
    fn request(&self) -> Result<()> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let id = window()
            .ok_or(Error::NoWindow)?
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.pending.set(Some(id));
        Ok(())
    }
}

/// A render loop on `requestAnimationFrame`, gated by an [`AnimationDriver`].
pub struct RafLoop {
    inner: Rc<Inner>,
}

impl RafLoop {
    pub fn new(scaling: TimeScaling, on_frame: impl FnMut(FrameStep) + 'static) -> Self {
        let inner = Rc::new(Inner {
            driver: RefCell::new(AnimationDriver::new(scaling)),
            on_frame: RefCell::new(Box::new(on_frame)),
            callback: RefCell::new(None),
            pending: Cell::new(None),
        });
        let weak: Weak<Inner> = Rc::downgrade(&inner);
        *inner.callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending.set(None);
            let step = inner.driver.borrow_mut().tick(now);
            if let Some(step) = step {
                (inner.on_frame.borrow_mut())(step);
                // schedule next
                if let Err(err) = inner.request() {
                    log::error!("render loop stopped: {err}");
                    inner.driver.borrow_mut().cancel();
                }
            }
        }) as Box<dyn FnMut(f64)>));
        Self { inner }
    }

    pub fn start(&self) -> Result<()> {
        self.inner.driver.borrow_mut().start()?;
        if self.inner.pending.get().is_none() {
            self.inner.request()?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.inner.driver.borrow().is_running()
    }

    /// Cancels the pending frame and the driver. Terminal.
    pub fn cancel(&self) {
        self.inner.driver.borrow_mut().cancel();
        if let (Some(id), Some(window)) = (self.inner.pending.take(), window()) {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
