//! The card widget: configuration, last known states and the viewport,
//! drawn onto an injected [`Surface`].
//!
//! Inputs (state updates, gestures, configuration changes) only mark the card
//! dirty. [`Card::flush`] performs at most one render pass per call, so a
//! burst of gestures between two frames costs a single redraw.

use crate::config::{CardConfig, Config, ConfigError, LayoutConfig};
use crate::layout::{Scene, compute_error_scene, compute_scene};
use crate::render::render_svg;
use crate::states::{StateStore, StatesError};
use crate::theme::Theme;
use crate::viewport::{Gesture, ViewportController, ViewportTransform};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("tracked entity {0:?} not found in state store")]
    MissingEntity(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    States(#[from] StatesError),
    #[error(transparent)]
    Surface(#[from] anyhow::Error),
}

/// Drawing capability supplied by the host.
pub trait Surface {
    fn draw(&mut self, scene: &Scene) -> anyhow::Result<()>;
}

/// Keeps the most recent pass as an SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    theme: Theme,
    svg: Option<String>,
}

impl SvgSurface {
    pub fn new(theme: Theme) -> Self {
        Self { theme, svg: None }
    }

    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    pub fn into_svg(self) -> Option<String> {
        self.svg
    }
}

impl Surface for SvgSurface {
    fn draw(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.svg = Some(render_svg(scene, &self.theme));
        Ok(())
    }
}

pub struct Card<S: Surface> {
    config: CardConfig,
    invalid: Option<ConfigError>,
    theme: Theme,
    layout: LayoutConfig,
    viewport: ViewportController,
    states: StateStore,
    surface: S,
    dirty: bool,
}

impl<S: Surface> Card<S> {
    pub fn new(config: CardConfig, settings: &Config, surface: S) -> Self {
        let viewport = ViewportController::new(config.header.default_zoom, settings.layout.viewport);
        let invalid = config.validate().err();
        if let Some(err) = &invalid {
            tracing::warn!(error = %err, "card configuration rejected");
        }
        Self {
            config,
            invalid,
            theme: settings.theme.clone(),
            layout: settings.layout.clone(),
            viewport,
            states: StateStore::new(),
            surface,
            dirty: true,
        }
    }

    /// Replaces the configuration. The viewport keeps its transform.
    pub fn set_config(&mut self, config: CardConfig) {
        self.invalid = config.validate().err();
        if let Some(err) = &self.invalid {
            tracing::warn!(error = %err, "card configuration rejected");
        }
        self.config = config;
        self.dirty = true;
    }

    pub fn update_states(&mut self, states: StateStore) {
        self.states = states;
        self.dirty = true;
    }

    pub fn update_states_json(&mut self, input: &str) -> Result<(), CardError> {
        self.update_states(StateStore::from_json(input)?);
        Ok(())
    }

    /// Seeds the viewport with a transform carried over from a previous
    /// widget instance.
    pub fn restore_viewport(&mut self, transform: ViewportTransform) {
        self.viewport = ViewportController::from_transform(transform, *self.viewport.config());
    }

    pub fn handle_gesture(&mut self, gesture: Gesture) {
        self.viewport.apply(gesture);
    }

    pub fn needs_render(&self) -> bool {
        self.dirty || self.viewport.needs_render()
    }

    /// Renders once if anything changed since the last flush. Returns whether
    /// the surface was drawn. A failed draw leaves the card dirty.
    pub fn flush(&mut self) -> Result<bool, CardError> {
        if !self.needs_render() {
            return Ok(false);
        }
        let scene = self.scene();
        self.surface.draw(&scene)?;
        self.viewport.take_pending();
        self.dirty = false;
        Ok(true)
    }

    /// Builds the scene for the current inputs without drawing it.
    pub fn scene(&self) -> Scene {
        let transform = self.viewport.transform();
        match &self.invalid {
            Some(err) => compute_error_scene(&err.to_string(), transform, &self.theme, &self.layout),
            None => compute_scene(&self.config, &self.states, transform, &self.theme, &self.layout),
        }
    }

    /// Fails when the tracked entity is absent, for hosts that want to treat
    /// it as more than an inline message.
    pub fn check_tracked_entity(&self) -> Result<(), CardError> {
        if let Some(err) = &self.invalid {
            return Err(err.clone().into());
        }
        if self.states.get(&self.config.entity).is_none() {
            return Err(CardError::MissingEntity(self.config.entity.clone()));
        }
        Ok(())
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn validation_error(&self) -> Option<&ConfigError> {
        self.invalid.as_ref()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
