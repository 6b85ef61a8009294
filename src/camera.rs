use glam::{Mat4, Vec3};

/// Perspective camera looking at a fixed target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Camera {
    pub fn new(fov_deg: f32, position: Vec3) -> Self {
        Self {
            fov_deg,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            position,
            target: Vec3::ZERO,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Size of a drawing surface: CSS pixels and device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub css_width: f64,
    pub css_height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Drawing-buffer size in device pixels, at least 1x1.
    pub fn buffer_size(&self) -> (u32, u32) {
        let scale = self.pixel_ratio.max(1.0);
        (
            ((self.css_width * scale).round() as u32).max(1),
            ((self.css_height * scale).round() as u32).max(1),
        )
    }

    /// Pushes the surface's aspect ratio into `camera`. A collapsed surface
    /// (zero height) leaves the previous aspect alone.
    pub fn sync(&self, camera: &mut Camera) {
        if self.css_width > 0.0 && self.css_height > 0.0 {
            camera.aspect = (self.css_width / self.css_height) as f32;
        }
    }
}
