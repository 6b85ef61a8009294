use bouquet_wasm::animation::{AnimationDriver, DriverState, TimeScaling, MAX_FRAME_SCALE, REFERENCE_FRAME_MS};
use bouquet_wasm::Error;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn idle_driver_does_not_tick() {
    let mut driver = AnimationDriver::new(TimeScaling::RealTime);
    assert_eq!(driver.state(), DriverState::Idle);
    assert!(driver.tick(16.0).is_none());
    assert_eq!(driver.frames(), 0);
}

#[test]
fn start_is_idempotent_while_running() {
    let mut driver = AnimationDriver::new(TimeScaling::RealTime);
    driver.start().unwrap();
    driver.start().unwrap();
    assert!(driver.is_running());
}

#[test]
fn cancelled_driver_stays_cancelled() {
    let mut driver = AnimationDriver::new(TimeScaling::PerFrame);
    driver.start().unwrap();
    assert!(driver.tick(0.0).is_some());
    driver.cancel();
    assert_eq!(driver.state(), DriverState::Cancelled);
    assert!(driver.tick(16.0).is_none());
    assert!(matches!(driver.start(), Err(Error::DriverCancelled)));
    assert_eq!(driver.frames(), 1);
}

#[test]
fn cancel_before_start_prevents_any_frame() {
    let mut driver = AnimationDriver::new(TimeScaling::RealTime);
    driver.cancel();
    assert!(driver.start().is_err());
    assert!(driver.tick(100.0).is_none());
}

#[test]
fn real_time_scaling_tracks_frame_gaps() {
    let mut driver = AnimationDriver::new(TimeScaling::RealTime);
    driver.start().unwrap();
    let first = driver.tick(1000.0).unwrap();
    assert_eq!(first.elapsed_ms, 0.0);
    assert!(approx_eq(first.scale, 1.0));

    let second = driver.tick(1000.0 + REFERENCE_FRAME_MS).unwrap();
    assert!(approx_eq(second.scale, 1.0));

    // A 30 Hz display advances twice as far per frame.
    let third = driver.tick(1000.0 + 3.0 * REFERENCE_FRAME_MS).unwrap();
    assert!(approx_eq(third.scale, 2.0));
    assert!((third.elapsed_ms - 3.0 * REFERENCE_FRAME_MS).abs() < 1e-9);

    // Returning from a long stall never jumps more than the clamp.
    let fourth = driver.tick(60_000.0).unwrap();
    assert!(approx_eq(fourth.scale, MAX_FRAME_SCALE));
}

#[test]
fn per_frame_scaling_ignores_timing() {
    let mut driver = AnimationDriver::new(TimeScaling::PerFrame);
    driver.start().unwrap();
    for now in [0.0, 7.0, 100.0, 5_000.0] {
        assert!(approx_eq(driver.tick(now).unwrap().scale, 1.0));
    }
    assert_eq!(driver.frames(), 4);
}

#[test]
fn clock_going_backwards_does_not_rewind() {
    let mut driver = AnimationDriver::new(TimeScaling::RealTime);
    driver.start().unwrap();
    driver.tick(500.0);
    let step = driver.tick(400.0).unwrap();
    assert!(approx_eq(step.scale, 0.0));
}
