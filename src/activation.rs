//! Visibility-driven start/stop of the page's two scenes.

use crate::config::SceneConfig;
use crate::lifecycle::{SceneFactory, SceneHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Rendering is supported; subsystems follow page visibility.
    Enabled,
    /// The capability probe failed at init. Nothing is ever started.
    Disabled,
}

/// Owns at most one live handle per subsystem.
///
/// | state        | event        | action                      |
/// |--------------|--------------|-----------------------------|
/// | both running | page hidden  | dispose both, clear slots   |
/// | both stopped | page visible | construct missing subsystems|
/// | disabled     | any          | nothing                     |
pub struct ActivationController<F: SceneFactory> {
    factory: F,
    config: SceneConfig,
    activation: Activation,
    background: Option<SceneHandle<F::Background>>,
    bouquet: Option<SceneHandle<F::Bouquet>>,
}

impl<F: SceneFactory> ActivationController<F> {
    pub fn new(factory: F, config: SceneConfig, rendering_supported: bool) -> Self {
        let activation = if rendering_supported {
            Activation::Enabled
        } else {
            Activation::Disabled
        };
        Self {
            factory,
            config,
            activation,
            background: None,
            bouquet: None,
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Page load: start everything, if rendering is supported at all.
    pub fn activate(&mut self) {
        self.on_visibility(Visibility::Visible);
    }

    pub fn on_visibility(&mut self, visibility: Visibility) {
        if self.activation == Activation::Disabled {
            return;
        }
        match visibility {
            Visibility::Hidden => self.stop_all(),
            Visibility::Visible => self.start_missing(),
        }
    }

    pub fn is_background_running(&self) -> bool {
        self.background.is_some()
    }

    pub fn is_bouquet_running(&self) -> bool {
        self.bouquet.is_some()
    }

    /// The live bouquet, for components that need to poke at it (the
    /// celebration's rotation boost). `None` while stopped.
    pub fn bouquet(&self) -> Option<F::Bouquet> {
        self.bouquet.as_ref().map(|handle| handle.content().clone())
    }

    fn start_missing(&mut self) {
        if self.background.is_none() {
            match self.factory.start_background(&self.config) {
                Ok(handle) => self.background = Some(handle),
                Err(err) => log::error!("background scene failed to start: {err}"),
            }
        }
        if self.bouquet.is_none() {
            match self.factory.start_bouquet(&self.config) {
                Ok(handle) => self.bouquet = Some(handle),
                Err(err) => log::error!("bouquet scene failed to start: {err}"),
            }
        }
    }

    fn stop_all(&mut self) {
        if let Some(mut handle) = self.background.take() {
            handle.dispose();
        }
        if let Some(mut handle) = self.bouquet.take() {
            handle.dispose();
        }
    }
}

impl<F: SceneFactory> Drop for ActivationController<F> {
    fn drop(&mut self) {
        self.stop_all();
    }
}
