//! Double-activation gesture on the bouquet.

/// Two taps closer than this count as a double tap.
pub const TOUCH_WINDOW_MS: f64 = 300.0;
/// Two clicks closer than this count as a double click.
pub const CLICK_WINDOW_MS: f64 = 400.0;
/// Clicks the browser synthesises after a touch are ignored for this long.
pub const GHOST_CLICK_MS: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Recognises a pair of activations in quick succession.
///
/// Fires once per qualifying pair: after a trigger the next activation
/// starts a new pair rather than completing another one.
#[derive(Debug, Default)]
pub struct DoubleActivation {
    pending: Option<(PointerKind, f64)>,
    last_touch_ms: Option<f64>,
}

impl DoubleActivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an activation at `at_ms`; returns true when it completes a pair.
    pub fn register(&mut self, kind: PointerKind, at_ms: f64) -> bool {
        if kind == PointerKind::Mouse {
            if let Some(touch) = self.last_touch_ms {
                if at_ms - touch < GHOST_CLICK_MS {
                    return false;
                }
            }
        } else {
            self.last_touch_ms = Some(at_ms);
        }

        let window = match kind {
            PointerKind::Mouse => CLICK_WINDOW_MS,
            PointerKind::Touch => TOUCH_WINDOW_MS,
        };
        match self.pending.take() {
            Some((prev_kind, prev_ms)) if prev_kind == kind && at_ms - prev_ms <= window => true,
            _ => {
                self.pending = Some((kind, at_ms));
                false
            }
        }
    }
}
