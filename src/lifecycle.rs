//! Scene ownership and teardown.
//!
//! A started subsystem is represented by a [`SceneHandle`]: whatever the
//! caller needs to talk to the scene, plus a [`Disposer`] holding every
//! release step registered while the scene was built.

use std::fmt;

use crate::config::SceneConfig;
use crate::Result;

type Step = Box<dyn FnOnce()>;

/// Ordered release steps, run last-registered-first.
///
/// Disposal is idempotent, and an undisposed `Disposer` disposes itself on
/// drop, so a build that bails out with `?` half-way still releases what it
/// had already set up.
#[derive(Default)]
pub struct Disposer {
    steps: Vec<Step>,
    disposed: bool,
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("steps", &self.steps.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Disposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a release step. Steps pushed after disposal run at once.
    pub fn push(&mut self, step: impl FnOnce() + 'static) {
        if self.disposed {
            step();
        } else {
            self.steps.push(Box::new(step));
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        while let Some(step) = self.steps.pop() {
            step();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A started subsystem.
#[derive(Debug)]
pub struct SceneHandle<T> {
    content: T,
    disposer: Disposer,
}

impl<T> SceneHandle<T> {
    pub fn new(content: T, disposer: Disposer) -> Self {
        Self { content, disposer }
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn is_disposed(&self) -> bool {
        self.disposer.is_disposed()
    }

    /// Releases everything the subsystem owns. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.disposer.dispose();
    }
}

/// Builds the two subsystems of the page.
///
/// Implementations bind each subsystem to its display surface, start its
/// render loop (or arrange for it to start once content exists), and
/// register every release step on the returned handle.
pub trait SceneFactory {
    type Background;
    type Bouquet: Clone;

    fn start_background(&mut self, config: &SceneConfig) -> Result<SceneHandle<Self::Background>>;

    fn start_bouquet(&mut self, config: &SceneConfig) -> Result<SceneHandle<Self::Bouquet>>;
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn steps_run_in_reverse_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut disposer = Disposer::new();
        for name in ["raf", "resize", "gl"] {
            let log = Rc::clone(&log);
            disposer.push(move || log.borrow_mut().push(name));
        }
        disposer.dispose();
        disposer.dispose();
        assert_eq!(*log.borrow(), vec!["gl", "resize", "raf"]);
    }

    #[test]
    fn drop_disposes_partial_build() {
        let released = Rc::new(RefCell::new(false));
        {
            let mut disposer = Disposer::new();
            let released = Rc::clone(&released);
            disposer.push(move || *released.borrow_mut() = true);
        }
        assert!(*released.borrow());
    }

    #[test]
    fn late_step_runs_immediately() {
        let ran = Rc::new(RefCell::new(0));
        let mut handle = SceneHandle::new((), Disposer::new());
        handle.dispose();
        let mut disposer = Disposer::new();
        disposer.dispose();
        let counter = Rc::clone(&ran);
        disposer.push(move || *counter.borrow_mut() += 1);
        assert_eq!(*ran.borrow(), 1);
        assert!(handle.is_disposed());
    }
}
