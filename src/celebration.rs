//! Timing of the "happy birthday" overlay.
//!
//! [`CelebrationPlan`] decides what appears, where and when; the DOM side
//! (`wasm::celebration`) just walks its [`Timeline`].

use rand::Rng;

/// Every transient element is gone by this point after the trigger.
pub const ELEMENT_DEADLINE_MS: u32 = 5000;
/// The overlay container and its injected style go at this point.
pub const OVERLAY_LIFETIME_MS: u32 = 6000;
/// How long the bouquet spins faster.
pub const BOOST_DURATION_MS: u32 = 3000;
/// Period of the boost timer.
pub const BOOST_INTERVAL_MS: u32 = 16;
/// Extra rotation per boost tick, radians.
pub const BOOST_STEP: f32 = 0.1;

pub const CONFETTI_COUNT: usize = 50;
pub const SPARKLE_COUNT: usize = 15;
pub const HEART_COUNT: usize = 10;

pub const BANNER_TEXT: &str = "Happy Birthday!";

const CONFETTI_COLORS: &[&str] = &["#ff6b9d", "#ffd93d", "#6bcbff", "#c56cf0", "#ff9f43", "#ffffff"];
const SPARKLE_GLYPHS: &[&str] = &["\u{2728}", "\u{2B50}", "\u{1F31F}"];
const HEART_GLYPHS: &[&str] = &["\u{2764}\u{FE0F}", "\u{1F496}", "\u{1F495}"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Confetti,
    Sparkle,
    Heart,
}

impl ParticleKind {
    /// CSS class, matching the keyframes in the injected style.
    pub fn class(self) -> &'static str {
        match self {
            Self::Confetti => "celebration-confetti",
            Self::Sparkle => "celebration-sparkle",
            Self::Heart => "celebration-heart",
        }
    }
}

/// One decorative element.
#[derive(Clone, Debug, PartialEq)]
pub struct Spawn {
    pub kind: ParticleKind,
    pub delay_ms: u32,
    pub lifetime_ms: u32,
    /// Horizontal position, percent of the viewport width.
    pub left_pct: f32,
    /// Vertical position for glyphs, percent of the viewport height.
    pub top_pct: f32,
    pub size_px: f32,
    /// Background color for confetti, glyph text otherwise.
    pub paint: &'static str,
}

impl Spawn {
    pub fn removed_at_ms(&self) -> u32 {
        self.delay_ms + self.lifetime_ms
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CelebrationPlan {
    pub spawns: Vec<Spawn>,
}

impl CelebrationPlan {
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut spawns = Vec::with_capacity(CONFETTI_COUNT + SPARKLE_COUNT + HEART_COUNT);
        for i in 0..CONFETTI_COUNT {
            let lifetime_ms = rng.gen_range(2500..3500);
            spawns.push(spawn(rng, ParticleKind::Confetti, i as u32 * 40, lifetime_ms, CONFETTI_COLORS));
        }
        for i in 0..SPARKLE_COUNT {
            let lifetime_ms = rng.gen_range(1500..2500);
            spawns.push(spawn(rng, ParticleKind::Sparkle, i as u32 * 100, lifetime_ms, SPARKLE_GLYPHS));
        }
        for i in 0..HEART_COUNT {
            let lifetime_ms = rng.gen_range(2000..3000);
            spawns.push(spawn(rng, ParticleKind::Heart, i as u32 * 200, lifetime_ms, HEART_GLYPHS));
        }
        Self { spawns }
    }

    pub fn count(&self, kind: ParticleKind) -> usize {
        self.spawns.iter().filter(|s| s.kind == kind).count()
    }

    /// Every event of this celebration, ordered by time.
    pub fn timeline(&self) -> Timeline {
        let mut events = Vec::with_capacity(self.spawns.len() * 2 + 2);
        for (index, spawn) in self.spawns.iter().enumerate() {
            events.push((spawn.delay_ms, Event::Spawn(index)));
            events.push((spawn.removed_at_ms(), Event::Remove(index)));
        }
        events.push((BOOST_DURATION_MS, Event::EndBoost));
        events.push((OVERLAY_LIFETIME_MS, Event::RemoveOverlay));
        events.sort_by_key(|(at, _)| *at);
        Timeline { events }
    }
}

fn spawn(
    rng: &mut impl Rng,
    kind: ParticleKind,
    delay_ms: u32,
    lifetime_ms: u32,
    paints: &'static [&'static str],
) -> Spawn {
    let delay_ms = delay_ms.min(ELEMENT_DEADLINE_MS);
    let size_px = match kind {
        ParticleKind::Confetti => rng.gen_range(6.0..12.0),
        ParticleKind::Sparkle => rng.gen_range(16.0..28.0),
        ParticleKind::Heart => rng.gen_range(20.0..34.0),
    };
    Spawn {
        kind,
        delay_ms,
        lifetime_ms: lifetime_ms.min(ELEMENT_DEADLINE_MS - delay_ms),
        left_pct: rng.gen_range(0.0..100.0),
        top_pct: rng.gen_range(10.0..90.0),
        size_px,
        paint: paints[rng.gen_range(0..paints.len())],
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Insert the spawn at this index into the overlay.
    Spawn(usize),
    /// Remove it again.
    Remove(usize),
    EndBoost,
    RemoveOverlay,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    pub events: Vec<(u32, Event)>,
}

impl Timeline {
    pub fn last_at(&self) -> u32 {
        self.events.last().map_or(0, |(at, _)| *at)
    }

    /// Events in the order they are handed to timers. The overlay removal
    /// goes first, so a celebration that is only partly scheduled still
    /// cleans up after itself.
    pub fn scheduling_order(&self) -> impl Iterator<Item = (u32, Event)> + '_ {
        let teardown = self.events.iter().filter(|(_, e)| *e == Event::RemoveOverlay);
        let rest = self.events.iter().filter(|(_, e)| *e != Event::RemoveOverlay);
        teardown.chain(rest).copied()
    }
}

/// Keyframes and classes injected with the overlay.
pub const STYLE: &str = r#"
.celebration-overlay { position: fixed; inset: 0; pointer-events: none; overflow: hidden; z-index: 1000; }
.celebration-banner { position: absolute; top: 18%; width: 100%; text-align: center;
  font: 700 3rem/1.2 "Georgia", serif; color: #ff6b9d; text-shadow: 0 2px 12px rgba(255,255,255,0.8);
  animation: celebration-pop 0.8s ease-out both; }
.celebration-confetti { position: absolute; top: -20px; border-radius: 2px;
  animation-name: celebration-fall; animation-timing-function: linear; animation-fill-mode: forwards; }
.celebration-sparkle { position: absolute;
  animation-name: celebration-twinkle; animation-timing-function: ease-in-out; animation-fill-mode: forwards; }
.celebration-heart { position: absolute;
  animation-name: celebration-rise; animation-timing-function: ease-out; animation-fill-mode: forwards; }
@keyframes celebration-fall { to { transform: translateY(105vh) rotate(720deg); opacity: 0.2; } }
@keyframes celebration-twinkle { 0%, 100% { opacity: 0; transform: scale(0.3); } 50% { opacity: 1; transform: scale(1.2); } }
@keyframes celebration-rise { 0% { opacity: 0; transform: translateY(0); } 20% { opacity: 1; } 100% { opacity: 0; transform: translateY(-40vh); } }
@keyframes celebration-pop { from { opacity: 0; transform: scale(0.5); } to { opacity: 1; transform: scale(1); } }
"#;
