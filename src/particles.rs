//! Background point cloud.

use palette::{FromColor, Hsl, Srgb};
use rand::Rng;

use crate::config::ParticleConfig;

/// Interleaved-free position and color arrays, ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleCloud {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl ParticleCloud {
    /// Scatters `config.count` points uniformly in a cube of half-extent
    /// `config.spread`, tinted with random pinks.
    pub fn generate(config: &ParticleConfig, rng: &mut impl Rng) -> Self {
        let mut cloud = Self {
            positions: Vec::with_capacity(config.count * 3),
            colors: Vec::with_capacity(config.count * 3),
        };
        for _ in 0..config.count {
            for _ in 0..3 {
                cloud.positions.push(rng.gen_range(-1.0..1.0) * config.spread);
            }
            let hue = sample(rng, config.hue);
            let lightness = sample(rng, config.lightness);
            let hsl: Hsl = Hsl::new(hue * 360.0, config.saturation, lightness);
            let rgb: Srgb = Srgb::from_color(hsl);
            cloud.colors.extend_from_slice(&[rgb.red, rgb.green, rgb.blue]);
        }
        cloud
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn sample(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
