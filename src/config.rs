//! Compiled-in scene parameters.
//!
//! Every visual constant lives here, grouped in [`SceneConfig`] and picked
//! once per page load from the [`DeviceProfile`]. There is no config file.

use crate::animation::TimeScaling;

/// User-agent tokens of low-power mobile browsers.
const LOW_POWER_TOKENS: &[&str] = &[
    "Android",
    "webOS",
    "iPhone",
    "iPad",
    "iPod",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

/// Heuristic used to size the scene: desktop browsers and high-density
/// displays get the detailed variant.
pub fn is_high_performance(user_agent: &str, device_pixel_ratio: f64) -> bool {
    let low_power = LOW_POWER_TOKENS.iter().any(|token| user_agent.contains(token));
    !low_power || device_pixel_ratio >= 2.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceProfile {
    HighPerformance,
    LowPower,
}

impl DeviceProfile {
    pub fn detect(user_agent: &str, device_pixel_ratio: f64) -> Self {
        if is_high_performance(user_agent, device_pixel_ratio) {
            Self::HighPerformance
        } else {
            Self::LowPower
        }
    }
}

/// Background point cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleConfig {
    pub count: usize,
    /// World-space point size before perspective attenuation.
    pub size: f32,
    /// Half-extent of the cube particles are scattered in.
    pub spread: f32,
    pub opacity: f32,
    /// Hue range in turns (0..1). 0.9..1.0 keeps everything pink.
    pub hue: (f32, f32),
    pub saturation: f32,
    pub lightness: (f32, f32),
    /// Rotation per reference frame around x and y, radians.
    pub spin: (f32, f32),
    pub camera_distance: f32,
    pub fov_deg: f32,
}

/// Bouquet scene, including the fallback flowers.
#[derive(Clone, Debug, PartialEq)]
pub struct BouquetConfig {
    pub model_url: String,
    /// Latitude/longitude segments of fallback blossoms.
    pub sphere_segments: u32,
    /// Radial segments of fallback stems.
    pub stem_segments: u32,
    pub spin_y: f32,
    pub bob_amplitude: f32,
    /// Radians per millisecond of wall-clock time.
    pub bob_frequency: f32,
    pub camera_position: [f32; 3],
    pub fov_deg: f32,
    pub ambient: [f32; 3],
    pub light_direction: [f32; 3],
    pub light_color: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub particles: ParticleConfig,
    pub bouquet: BouquetConfig,
    pub time_scaling: TimeScaling,
}

impl SceneConfig {
    pub fn for_device(profile: DeviceProfile) -> Self {
        let mut config = Self::default();
        if profile == DeviceProfile::LowPower {
            config.particles.count = 500;
            config.particles.size = 0.08;
            config.bouquet.sphere_segments = 12;
            config.bouquet.stem_segments = 6;
        }
        config
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            size: 0.05,
            spread: 10.0,
            opacity: 0.7,
            hue: (0.9, 1.0),
            saturation: 0.5,
            lightness: (0.5, 1.0),
            spin: (0.0005, 0.0008),
            camera_distance: 5.0,
            fov_deg: 75.0,
        }
    }
}

impl Default for BouquetConfig {
    fn default() -> Self {
        Self {
            model_url: "bouquet.glb".to_string(),
            sphere_segments: 24,
            stem_segments: 12,
            spin_y: 0.005,
            bob_amplitude: 0.1,
            bob_frequency: 0.001,
            camera_position: [0.0, 1.0, 5.0],
            fov_deg: 45.0,
            ambient: [0.45, 0.4, 0.45],
            light_direction: [-0.5, -1.0, -0.6],
            light_color: [1.0, 0.95, 0.9],
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particles: ParticleConfig::default(),
            bouquet: BouquetConfig::default(),
            time_scaling: TimeScaling::RealTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
    const ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Chrome/120.0 Mobile Safari/537.36";
    const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/121.0";

    #[test]
    fn desktop_is_high_performance() {
        assert!(is_high_performance(DESKTOP, 1.0));
    }

    #[test]
    fn mobile_needs_dense_display() {
        assert!(!is_high_performance(ANDROID, 1.5));
        assert!(is_high_performance(ANDROID, 2.0));
        assert!(is_high_performance(IPHONE, 3.0));
    }

    #[test]
    fn low_power_profile_trades_count_for_size() {
        let low = SceneConfig::for_device(DeviceProfile::detect(ANDROID, 1.0));
        let high = SceneConfig::for_device(DeviceProfile::detect(DESKTOP, 1.0));
        assert_eq!(low.particles.count, 500);
        assert_eq!(low.particles.size, 0.08);
        assert_eq!(high.particles.count, 1000);
        assert_eq!(high.particles.size, 0.05);
        assert!(low.bouquet.sphere_segments < high.bouquet.sphere_segments);
    }

    #[test]
    fn scene_defaults_are_the_high_performance_profile() {
        let config = SceneConfig::default();
        assert_eq!(config.bouquet, BouquetConfig::default());
        assert_eq!(config.particles, ParticleConfig::default());
        assert_eq!(config, SceneConfig::for_device(DeviceProfile::HighPerformance));
        assert_eq!(config.bouquet.model_url, "bouquet.glb");
    }
}
