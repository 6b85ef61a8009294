use std::collections::HashMap;

use bouquet_wasm::celebration::{
    CelebrationPlan, Event, ParticleKind, BOOST_DURATION_MS, CONFETTI_COUNT, ELEMENT_DEADLINE_MS, HEART_COUNT,
    OVERLAY_LIFETIME_MS, SPARKLE_COUNT,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn plan(seed: u64) -> CelebrationPlan {
    CelebrationPlan::generate(&mut SmallRng::seed_from_u64(seed))
}

#[test]
fn element_counts() {
    let plan = plan(1);
    assert_eq!(plan.count(ParticleKind::Confetti), CONFETTI_COUNT);
    assert_eq!(plan.count(ParticleKind::Sparkle), SPARKLE_COUNT);
    assert_eq!(plan.count(ParticleKind::Heart), HEART_COUNT);
    assert_eq!(plan.spawns.len(), 75);
}

#[test]
fn every_element_is_gone_by_the_deadline() {
    for seed in 0..20 {
        let timeline = plan(seed).timeline();
        for (at, event) in &timeline.events {
            if let Event::Remove(_) = event {
                assert!(*at <= ELEMENT_DEADLINE_MS, "seed {seed}: removal at {at}");
            }
        }
    }
}

#[test]
fn overlay_removal_is_the_final_event() {
    let timeline = plan(3).timeline();
    assert_eq!(timeline.last_at(), OVERLAY_LIFETIME_MS);
    assert_eq!(timeline.events.last().map(|(_, e)| *e), Some(Event::RemoveOverlay));
    let overlay_removals = timeline.events.iter().filter(|(_, e)| *e == Event::RemoveOverlay).count();
    assert_eq!(overlay_removals, 1);
}

#[test]
fn boost_ends_after_three_seconds() {
    let timeline = plan(4).timeline();
    let ends: Vec<u32> = timeline
        .events
        .iter()
        .filter(|(_, e)| *e == Event::EndBoost)
        .map(|(at, _)| *at)
        .collect();
    assert_eq!(ends, vec![BOOST_DURATION_MS]);
}

#[test]
fn each_element_spawns_before_it_is_removed() {
    let plan = plan(5);
    let timeline = plan.timeline();
    let mut spawned = HashMap::new();
    let mut removed = HashMap::new();
    for (at, event) in &timeline.events {
        match event {
            Event::Spawn(i) => assert!(spawned.insert(*i, *at).is_none()),
            Event::Remove(i) => assert!(removed.insert(*i, *at).is_none()),
            _ => {}
        }
    }
    assert_eq!(spawned.len(), plan.spawns.len());
    assert_eq!(removed.len(), plan.spawns.len());
    for (i, at) in &spawned {
        assert!(removed[i] > *at, "element {i} removed before it appeared");
    }
}

#[test]
fn events_are_time_ordered() {
    let timeline = plan(6).timeline();
    assert!(timeline.events.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn staggered_delays() {
    let plan = plan(7);
    let hearts: Vec<u32> = plan
        .spawns
        .iter()
        .filter(|s| s.kind == ParticleKind::Heart)
        .map(|s| s.delay_ms)
        .collect();
    assert_eq!(hearts, (0..10).map(|i| i * 200).collect::<Vec<_>>());
}

#[test]
fn overlay_removal_is_scheduled_first() {
    let timeline = plan(8).timeline();
    let order: Vec<(u32, Event)> = timeline.scheduling_order().collect();
    assert_eq!(order.first(), Some(&(OVERLAY_LIFETIME_MS, Event::RemoveOverlay)));
    assert_eq!(order.len(), timeline.events.len());
    for event in &timeline.events {
        assert!(order.contains(event));
    }
}
