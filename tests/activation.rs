use std::cell::Cell;
use std::rc::Rc;

use bouquet_wasm::activation::{Activation, ActivationController, Visibility};
use bouquet_wasm::config::SceneConfig;
use bouquet_wasm::lifecycle::{Disposer, SceneFactory, SceneHandle};
use bouquet_wasm::{Error, Result};

#[derive(Clone, Default)]
struct Counters {
    background_started: Rc<Cell<u32>>,
    background_live: Rc<Cell<i32>>,
    bouquet_started: Rc<Cell<u32>>,
    bouquet_live: Rc<Cell<i32>>,
}

#[derive(Default)]
struct FakeScenes {
    counters: Counters,
    fail_bouquet: bool,
}

fn live_disposer(live: &Rc<Cell<i32>>) -> Disposer {
    live.set(live.get() + 1);
    let live = Rc::clone(live);
    let mut disposer = Disposer::new();
    disposer.push(move || live.set(live.get() - 1));
    disposer
}

impl SceneFactory for FakeScenes {
    type Background = ();
    type Bouquet = u32;

    fn start_background(&mut self, _config: &SceneConfig) -> Result<SceneHandle<()>> {
        let c = &self.counters;
        c.background_started.set(c.background_started.get() + 1);
        Ok(SceneHandle::new((), live_disposer(&c.background_live)))
    }

    fn start_bouquet(&mut self, _config: &SceneConfig) -> Result<SceneHandle<u32>> {
        let c = &self.counters;
        c.bouquet_started.set(c.bouquet_started.get() + 1);
        // Half-built: the GL context exists, then the shader fails.
        let disposer = live_disposer(&c.bouquet_live);
        if self.fail_bouquet {
            drop(disposer);
            return Err(Error::Shader("boom".into()));
        }
        Ok(SceneHandle::new(c.bouquet_started.get(), disposer))
    }
}

fn controller(supported: bool) -> (ActivationController<FakeScenes>, Counters) {
    let scenes = FakeScenes::default();
    let counters = scenes.counters.clone();
    (ActivationController::new(scenes, SceneConfig::default(), supported), counters)
}

#[test]
fn unsupported_rendering_never_starts() {
    let (mut ctl, counters) = controller(false);
    ctl.activate();
    ctl.on_visibility(Visibility::Hidden);
    ctl.on_visibility(Visibility::Visible);
    assert_eq!(ctl.activation(), Activation::Disabled);
    assert_eq!(counters.background_started.get(), 0);
    assert_eq!(counters.bouquet_started.get(), 0);
    assert!(ctl.bouquet().is_none());
}

#[test]
fn activation_starts_both_once() {
    let (mut ctl, counters) = controller(true);
    ctl.activate();
    ctl.activate();
    ctl.on_visibility(Visibility::Visible);
    assert!(ctl.is_background_running() && ctl.is_bouquet_running());
    assert_eq!(counters.background_started.get(), 1);
    assert_eq!(counters.bouquet_started.get(), 1);
    assert_eq!(counters.background_live.get(), 1);
    assert_eq!(counters.bouquet_live.get(), 1);
}

#[test]
fn visibility_round_trip_keeps_one_live_handle() {
    let (mut ctl, counters) = controller(true);
    ctl.activate();

    ctl.on_visibility(Visibility::Hidden);
    assert_eq!(counters.background_live.get(), 0);
    assert_eq!(counters.bouquet_live.get(), 0);
    assert!(!ctl.is_background_running() && !ctl.is_bouquet_running());

    ctl.on_visibility(Visibility::Hidden);
    assert_eq!(counters.background_live.get(), 0);

    ctl.on_visibility(Visibility::Visible);
    assert_eq!(counters.background_live.get(), 1);
    assert_eq!(counters.bouquet_live.get(), 1);
    assert_eq!(counters.background_started.get(), 2);
    assert_eq!(counters.bouquet_started.get(), 2);
}

#[test]
fn bouquet_handle_follows_the_live_scene() {
    let (mut ctl, _) = controller(true);
    ctl.activate();
    assert_eq!(ctl.bouquet(), Some(1));
    ctl.on_visibility(Visibility::Hidden);
    assert_eq!(ctl.bouquet(), None);
    ctl.on_visibility(Visibility::Visible);
    assert_eq!(ctl.bouquet(), Some(2));
}

#[test]
fn failed_start_leaves_subsystem_stopped_and_released() {
    let scenes = FakeScenes {
        fail_bouquet: true,
        ..FakeScenes::default()
    };
    let counters = scenes.counters.clone();
    let mut ctl = ActivationController::new(scenes, SceneConfig::default(), true);
    ctl.activate();
    assert!(ctl.is_background_running());
    assert!(!ctl.is_bouquet_running());
    assert_eq!(counters.bouquet_live.get(), 0);

    // The next visible event retries only the missing subsystem.
    ctl.on_visibility(Visibility::Visible);
    assert_eq!(counters.background_started.get(), 1);
    assert_eq!(counters.bouquet_started.get(), 2);
}

#[test]
fn dropping_the_controller_disposes_everything() {
    let (mut ctl, counters) = controller(true);
    ctl.activate();
    drop(ctl);
    assert_eq!(counters.background_live.get(), 0);
    assert_eq!(counters.bouquet_live.get(), 0);
}
