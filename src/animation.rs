//! Per-frame animation state.
//!
//! [`AnimationDriver`] is the cancellation token behind every render loop.
//! It turns display-refresh timestamps into [`FrameStep`]s; the browser side
//! (`wasm::raf`) only forwards timestamps and reschedules.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::{Error, Result};

/// Duration of one frame at the refresh rate the per-frame constants were
/// tuned for.
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Upper bound on a single step's scale, so a long stall (tab throttling,
/// breakpoint) doesn't fling objects around.
pub const MAX_FRAME_SCALE: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeScaling {
    /// Per-frame constants are applied once per displayed frame, so speed
    /// follows the refresh rate.
    PerFrame,
    /// Per-frame constants are scaled by elapsed time relative to 60 Hz.
    #[default]
    RealTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Cancelled,
}

/// What a single frame should advance by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStep {
    /// Milliseconds since the driver's first frame.
    pub elapsed_ms: f64,
    /// Multiplier for per-reference-frame increments.
    pub scale: f32,
}

#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    scaling: TimeScaling,
    origin_ms: Option<f64>,
    last_ms: Option<f64>,
    frames: u64,
}

impl AnimationDriver {
    pub fn new(scaling: TimeScaling) -> Self {
        Self {
            state: DriverState::Idle,
            scaling,
            origin_ms: None,
            last_ms: None,
            frames: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// `Idle -> Running`. Restarting a running driver does nothing; a
    /// cancelled driver stays cancelled.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            DriverState::Idle => {
                self.state = DriverState::Running;
                Ok(())
            }
            DriverState::Running => Ok(()),
            DriverState::Cancelled => Err(Error::DriverCancelled),
        }
    }

    pub fn cancel(&mut self) {
        self.state = DriverState::Cancelled;
    }

    /// Advances to the frame presented at `now_ms`. Returns `None` unless
    /// the driver is running.
    pub fn tick(&mut self, now_ms: f64) -> Option<FrameStep> {
        if self.state != DriverState::Running {
            return None;
        }
        let origin = *self.origin_ms.get_or_insert(now_ms);
        let scale = match (self.scaling, self.last_ms) {
            (TimeScaling::PerFrame, _) | (TimeScaling::RealTime, None) => 1.0,
            (TimeScaling::RealTime, Some(last)) => {
                let dt = (now_ms - last).max(0.0);
                ((dt / REFERENCE_FRAME_MS) as f32).min(MAX_FRAME_SCALE)
            }
        };
        self.last_ms = Some(now_ms);
        self.frames += 1;
        Some(FrameStep {
            elapsed_ms: now_ms - origin,
            scale,
        })
    }
}

/// Position, Euler rotation (XYZ order) and uniform scale of a scene root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

/// Constant rotation, in radians per reference frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin(pub Vec3);

impl Spin {
    pub fn apply(&self, transform: &mut Transform, step: FrameStep) {
        transform.rotation += self.0 * step.scale;
    }
}

/// Sinusoidal vertical offset around `base_y`, keyed off elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bob {
    pub base_y: f32,
    pub amplitude: f32,
    /// Radians per millisecond.
    pub frequency: f32,
}

impl Bob {
    pub fn apply(&self, transform: &mut Transform, step: FrameStep) {
        let phase = step.elapsed_ms as f32 * self.frequency;
        transform.position.y = self.base_y + phase.sin() * self.amplitude;
    }
}
