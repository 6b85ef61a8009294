use std::cell::{Cell, RefCell};
use std::future;
use std::rc::Rc;

use bouquet_wasm::config::BouquetConfig;
use bouquet_wasm::lifecycle::{Disposer, SceneHandle};
use bouquet_wasm::loader::{
    wait_ready, AssetSlot, BouquetContent, LoadOutcome, ReadinessPolicy, LOADED_OFFSET, LOADED_SCALE,
};
use bouquet_wasm::mesh::{fallback_bouquet, Mesh, Model, SceneNode};
use bouquet_wasm::Error;
use glam::{Mat4, Vec3};

fn single_node_model() -> Model {
    Model {
        nodes: vec![SceneNode::new("petal", Mesh::sphere(1.0, 8, [1.0, 0.0, 0.0]), Mat4::IDENTITY)],
    }
}

#[test]
fn loader_ready_after_a_few_polls() {
    let sleeps = RefCell::new(Vec::new());
    let polls = Cell::new(0);
    let result = pollster::block_on(wait_ready(
        ReadinessPolicy::default(),
        || {
            polls.set(polls.get() + 1);
            polls.get() > 3
        },
        |ms| {
            sleeps.borrow_mut().push(ms);
            future::ready(())
        },
    ));
    assert!(result.is_ok());
    assert_eq!(*sleeps.borrow(), vec![500, 500, 500]);
}

#[test]
fn loader_available_immediately_never_sleeps() {
    let sleeps = Cell::new(0);
    let result = pollster::block_on(wait_ready(
        ReadinessPolicy::default(),
        || true,
        |_| {
            sleeps.set(sleeps.get() + 1);
            future::ready(())
        },
    ));
    assert!(result.is_ok());
    assert_eq!(sleeps.get(), 0);
}

#[test]
fn readiness_wait_is_bounded() {
    let sleeps = Cell::new(0);
    let result = pollster::block_on(wait_ready(
        ReadinessPolicy::default(),
        || false,
        |_| {
            sleeps.set(sleeps.get() + 1);
            future::ready(())
        },
    ));
    assert!(matches!(result, Err(Error::LoaderUnavailable { waited_ms: 10_000 })));
    assert_eq!(sleeps.get(), 20);
}

#[test]
fn zero_interval_still_times_out() {
    let sleeps = RefCell::new(Vec::new());
    let result = pollster::block_on(wait_ready(
        ReadinessPolicy {
            interval_ms: 0,
            timeout_ms: 1_000,
        },
        || false,
        |ms| {
            sleeps.borrow_mut().push(ms);
            future::ready(())
        },
    ));
    assert!(matches!(result, Err(Error::LoaderUnavailable { waited_ms: 1_000 })));
    assert_eq!(sleeps.borrow().len(), 1_000);
    assert!(sleeps.borrow().iter().all(|&ms| ms == 1));
}

#[test]
fn loaded_model_is_placed_and_attached() {
    let mut slot = AssetSlot::new();
    let ticket = slot.begin().unwrap();
    assert!(slot.is_loading());
    let fallback_built = Cell::new(false);
    let content = slot
        .resolve(
            ticket,
            LoadOutcome::Loaded(single_node_model()),
            |model| {
                model.place(LOADED_SCALE, LOADED_OFFSET);
                model.mark_shadows();
            },
            || {
                fallback_built.set(true);
                Model::default()
            },
        )
        .unwrap();
    assert!(!content.is_fallback());
    let node = &content.asset().nodes[0];
    assert!(node.cast_shadow && node.receive_shadow);
    let moved = node.transform.transform_point3(Vec3::new(1.0, 0.0, 0.0));
    assert!(moved.abs_diff_eq(Vec3::new(2.0, -1.0, 0.0), 1e-6));
    assert!(!fallback_built.get());
}

#[test]
fn failed_load_attaches_the_fallback_once() {
    let config = BouquetConfig::default();
    let mut slot = AssetSlot::new();
    let ticket = slot.begin().unwrap();
    let fallback_calls = Cell::new(0);
    slot.resolve(
        ticket,
        LoadOutcome::Failed(Error::Fetch {
            url: config.model_url.to_string(),
            status: 404,
        }),
        |_| panic!("a failed load has nothing to place"),
        || {
            fallback_calls.set(fallback_calls.get() + 1);
            fallback_bouquet(&config)
        },
    )
    .unwrap();
    assert_eq!(fallback_calls.get(), 1);
    match slot.content() {
        Some(BouquetContent::Fallback(model)) => assert_eq!(model.mesh_count(), 10),
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[test]
fn one_load_at_a_time() {
    let mut slot: AssetSlot<Model> = AssetSlot::new();
    let _ticket = slot.begin().unwrap();
    assert!(matches!(slot.begin(), Err(Error::LoadInFlight)));
}

#[test]
fn content_attaches_exactly_once() {
    let mut slot = AssetSlot::new();
    let ticket = slot.begin().unwrap();
    slot.resolve(ticket, LoadOutcome::Loaded(1u8), |_| {}, || 0).unwrap();
    assert!(matches!(slot.begin(), Err(Error::SlotResolved)));
    assert_eq!(slot.content(), Some(&BouquetContent::Loaded(1)));
}

#[test]
fn disposal_while_loading_drops_the_late_result() {
    let slot: Rc<RefCell<AssetSlot<Model>>> = Rc::new(RefCell::new(AssetSlot::new()));
    let ticket = slot.borrow_mut().begin().unwrap();

    let mut disposer = Disposer::new();
    let closing = Rc::clone(&slot);
    disposer.push(move || closing.borrow_mut().close());
    let mut handle = SceneHandle::new((), disposer);
    handle.dispose();
    handle.dispose();
    assert!(handle.is_disposed());
    assert!(slot.borrow().is_closed());

    let late = slot
        .borrow_mut()
        .resolve(ticket, LoadOutcome::Loaded(single_node_model()), |_| {}, Model::default)
        .map(|_| ());
    assert!(matches!(late, Err(Error::SlotResolved)));
    assert!(slot.borrow().content().is_none());
}

#[test]
fn unusable_loaded_model_is_swapped_for_the_fallback() {
    let config = BouquetConfig::default();
    let mut slot = AssetSlot::new();
    let ticket = slot.begin().unwrap();
    slot.resolve(ticket, LoadOutcome::Loaded(single_node_model()), |_| {}, Model::default)
        .unwrap();

    let content = slot.fall_back(|| fallback_bouquet(&config)).unwrap();
    assert!(content.is_fallback());
    assert_eq!(content.asset().mesh_count(), 10);
    assert!(matches!(slot.content(), Some(BouquetContent::Fallback(_))));

    // The fallback is final.
    let again = slot.fall_back(Model::default).map(|_| ());
    assert!(matches!(again, Err(Error::SlotResolved)));
}

#[test]
fn fall_back_needs_loaded_content() {
    let mut slot: AssetSlot<Model> = AssetSlot::new();
    assert!(slot.fall_back(Model::default).is_err());
    let _ticket = slot.begin().unwrap();
    assert!(slot.fall_back(Model::default).is_err());
    assert!(slot.is_loading());
    slot.close();
    assert!(slot.fall_back(Model::default).is_err());
    assert!(slot.content().is_none());
}
