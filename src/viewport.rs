//! Pan/zoom state for the card.
//!
//! [`ViewportController`] is the only writer of the [`ViewportTransform`].
//! Gestures mutate it synchronously; the next render pass reads the
//! controller's state rather than the gesture, so a scene rebuilt from
//! scratch always lands where the user left it.

use serde::{Deserialize, Serialize};

use crate::config::{ScaleCoupling, ViewportConfig};
use crate::ir::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    #[serde(rename = "x")]
    pub translate_x: f32,
    #[serde(rename = "y")]
    pub translate_y: f32,
    #[serde(rename = "k")]
    pub scale: f32,
}

impl ViewportTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// Model space to screen space.
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.translate_x,
            point.y * self.scale + self.translate_y,
        )
    }

    /// Screen space back to model space.
    pub fn invert(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.translate_x) / self.scale,
            (point.y - self.translate_y) / self.scale,
        )
    }

    pub fn zoom_percent(&self) -> i32 {
        (self.scale * 100.0).round() as i32
    }

    /// Header text for the current scale.
    pub fn zoom_label(&self) -> String {
        format!("Zoom: {}%", self.zoom_percent())
    }

    pub fn to_svg(&self) -> String {
        format!(
            "translate({}, {}) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Discrete input from the host's pointer layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gesture {
    Drag { dx: f32, dy: f32 },
    Zoom { factor: f32 },
    ZoomIn,
    ZoomOut,
    /// Absolute transform reported by a composite drag/pinch handler.
    Transform { x: f32, y: f32, k: f32 },
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: ViewportTransform,
    config: ViewportConfig,
    pending: bool,
}

impl ViewportController {
    /// Starts at `default_zoom` percent with no translation.
    pub fn new(default_zoom: f32, config: ViewportConfig) -> Self {
        let mut controller = Self {
            transform: ViewportTransform::IDENTITY,
            config,
            pending: true,
        };
        let scale = if default_zoom.is_finite() && default_zoom > 0.0 {
            default_zoom / 100.0
        } else {
            1.0
        };
        controller.transform.scale = controller.clamp(scale);
        controller
    }

    /// Carries a transform over from a previous widget instance.
    pub fn from_transform(transform: ViewportTransform, config: ViewportConfig) -> Self {
        let mut controller = Self {
            transform,
            config,
            pending: true,
        };
        if !transform.translate_x.is_finite() || !transform.translate_y.is_finite() {
            controller.transform.translate_x = 0.0;
            controller.transform.translate_y = 0.0;
        }
        controller.transform.scale = controller.clamp(transform.scale);
        controller
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Panning is unbounded.
    pub fn apply_drag(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
        self.pending = true;
    }

    pub fn apply_zoom_delta(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.transform.scale = self.clamp(self.transform.scale * factor);
        self.pending = true;
    }

    pub fn zoom_in(&mut self) {
        self.apply_zoom_delta(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        if self.config.zoom_step > 0.0 {
            self.apply_zoom_delta(1.0 / self.config.zoom_step);
        }
    }

    /// Adopts the gesture's translation verbatim. Under
    /// [`ScaleCoupling::Preserve`] the reported scale is ignored so that a
    /// stray trackpad scroll cannot change the zoom level; zoom only moves
    /// through the explicit zoom controls.
    pub fn apply_gesture_transform(&mut self, tx: f32, ty: f32, k: f32) {
        if tx.is_finite() && ty.is_finite() {
            self.transform.translate_x = tx;
            self.transform.translate_y = ty;
        }
        if self.config.scale_coupling == ScaleCoupling::Follow && k.is_finite() && k > 0.0 {
            self.transform.scale = self.clamp(k);
        }
        self.pending = true;
    }

    pub fn apply(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Drag { dx, dy } => self.apply_drag(dx, dy),
            Gesture::Zoom { factor } => self.apply_zoom_delta(factor),
            Gesture::ZoomIn => self.zoom_in(),
            Gesture::ZoomOut => self.zoom_out(),
            Gesture::Transform { x, y, k } => self.apply_gesture_transform(x, y, k),
        }
    }

    pub fn needs_render(&self) -> bool {
        self.pending
    }

    /// Returns the latest transform once per batch of mutations.
    pub fn take_pending(&mut self) -> Option<ViewportTransform> {
        if std::mem::take(&mut self.pending) {
            Some(self.transform)
        } else {
            None
        }
    }

    pub fn zoom_label(&self) -> String {
        self.transform.zoom_label()
    }

    fn clamp(&self, scale: f32) -> f32 {
        if !scale.is_finite() {
            return self.config.min_scale.max(1.0_f32.min(self.config.max_scale));
        }
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(100.0, ViewportConfig::default())
    }
}
