//! Bouquet content resolution: loaded model or procedural fallback.
//!
//! The browser fetch lives in `wasm::asset`; everything that decides *which*
//! content ends up attached is here so it can be tested off the browser.

use std::future::Future;

use glam::Vec3;

use crate::{Error, Result};

/// Uniform scale applied to a loaded model.
pub const LOADED_SCALE: f32 = 2.0;
/// Where the loaded model's origin is placed.
pub const LOADED_OFFSET: Vec3 = Vec3::new(0.0, -1.0, 0.0);

/// How long to wait for the model loader to become available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval_ms: u32,
    pub timeout_ms: u32,
}

impl ReadinessPolicy {
    /// The sleep between polls, never zero.
    pub fn interval(&self) -> u32 {
        self.interval_ms.max(1)
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            timeout_ms: 10_000,
        }
    }
}

/// Polls `is_available` every `policy.interval()` until it reports true,
/// giving up once `policy.timeout_ms` has been spent sleeping.
pub async fn wait_ready<A, S, Fut>(policy: ReadinessPolicy, mut is_available: A, mut sleep: S) -> Result<()>
where
    A: FnMut() -> bool,
    S: FnMut(u32) -> Fut,
    Fut: Future<Output = ()>,
{
    let interval_ms = policy.interval();
    let mut waited_ms = 0;
    loop {
        if is_available() {
            return Ok(());
        }
        if waited_ms >= policy.timeout_ms {
            return Err(Error::LoaderUnavailable { waited_ms });
        }
        sleep(interval_ms).await;
        waited_ms = waited_ms.saturating_add(interval_ms);
    }
}

/// Download progress, advisory only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl Progress {
    pub fn percent(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f32 / total as f32 * 100.0).min(100.0)),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum LoadOutcome<A> {
    Loaded(A),
    Failed(Error),
}

/// The content attached to the bouquet root.
#[derive(Clone, Debug, PartialEq)]
pub enum BouquetContent<A> {
    Loaded(A),
    Fallback(A),
}

impl<A> BouquetContent<A> {
    pub fn asset(&self) -> &A {
        match self {
            Self::Loaded(asset) | Self::Fallback(asset) => asset,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Proof that the holder owns the slot's single in-flight load.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u32,
}

#[derive(Debug)]
enum SlotState<A> {
    Empty,
    Loading(u32),
    Attached(BouquetContent<A>),
    Closed,
}

/// The bouquet's content slot.
///
/// `Empty -> Loading -> Attached`, or `Closed` once the scene is disposed.
/// Loads cannot be aborted, so a resolution arriving after close is dropped.
#[derive(Debug)]
pub struct AssetSlot<A> {
    state: SlotState<A>,
    generation: u32,
}

impl<A> Default for AssetSlot<A> {
    fn default() -> Self {
        Self {
            state: SlotState::Empty,
            generation: 0,
        }
    }
}

impl<A> AssetSlot<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Result<LoadTicket> {
        match self.state {
            SlotState::Empty => {
                self.generation += 1;
                self.state = SlotState::Loading(self.generation);
                Ok(LoadTicket {
                    generation: self.generation,
                })
            }
            SlotState::Loading(_) => Err(Error::LoadInFlight),
            SlotState::Attached(_) | SlotState::Closed => Err(Error::SlotResolved),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SlotState::Loading(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SlotState::Closed)
    }

    pub fn content(&self) -> Option<&BouquetContent<A>> {
        match &self.state {
            SlotState::Attached(content) => Some(content),
            _ => None,
        }
    }

    /// Attaches exactly one variant for the ticket's load: the loaded asset
    /// (after `place`) or whatever `fallback` builds.
    pub fn resolve(
        &mut self,
        ticket: LoadTicket,
        outcome: LoadOutcome<A>,
        place: impl FnOnce(&mut A),
        fallback: impl FnOnce() -> A,
    ) -> Result<&BouquetContent<A>> {
        match self.state {
            SlotState::Loading(generation) if generation == ticket.generation => {}
            _ => return Err(Error::SlotResolved),
        }
        let content = match outcome {
            LoadOutcome::Loaded(mut asset) => {
                place(&mut asset);
                BouquetContent::Loaded(asset)
            }
            LoadOutcome::Failed(err) => {
                log::warn!("bouquet model unavailable, using fallback: {err}");
                BouquetContent::Fallback(fallback())
            }
        };
        self.state = SlotState::Attached(content);
        match &self.state {
            SlotState::Attached(content) => Ok(content),
            _ => Err(Error::SlotResolved),
        }
    }

    /// Swaps attached loaded content for the fallback, for a model that
    /// parsed but could not be used. Only valid on `Loaded` content.
    pub fn fall_back(&mut self, fallback: impl FnOnce() -> A) -> Result<&BouquetContent<A>> {
        match self.state {
            SlotState::Attached(BouquetContent::Loaded(_)) => {}
            _ => return Err(Error::SlotResolved),
        }
        self.state = SlotState::Attached(BouquetContent::Fallback(fallback()));
        match &self.state {
            SlotState::Attached(content) => Ok(content),
            _ => Err(Error::SlotResolved),
        }
    }

    /// Drops any attached content and refuses later resolutions.
    pub fn close(&mut self) {
        self.state = SlotState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_needs_known_total() {
        assert_eq!(Progress { loaded: 5, total: None }.percent(), None);
        assert_eq!(Progress { loaded: 5, total: Some(0) }.percent(), None);
        assert_eq!(Progress { loaded: 50, total: Some(200) }.percent(), Some(25.0));
    }

    #[test]
    fn stale_ticket_is_rejected() {
        let mut slot: AssetSlot<u8> = AssetSlot::new();
        let ticket = slot.begin().unwrap();
        slot.close();
        let err = slot.resolve(ticket, LoadOutcome::Loaded(1), |_| {}, || 0);
        assert!(matches!(err, Err(Error::SlotResolved)));
        assert!(slot.content().is_none());
    }
}
