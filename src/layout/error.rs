use crate::config::LayoutConfig;
use crate::ir::{Point, TargetEstimate};
use crate::theme::Theme;
use crate::viewport::ViewportTransform;

use super::{Paint, Primitive, Role, Scene, Shape, TextAnchor};

/// Replacement scene carrying only `message`, used when the card cannot be
/// drawn at all (invalid configuration, tracked entity missing).
pub fn compute_error_scene(
    message: &str,
    transform: ViewportTransform,
    theme: &Theme,
    config: &LayoutConfig,
) -> Scene {
    let width = config.grid_width.max(1.0);
    let height = config.grid_height.max(1.0);
    let text = Primitive::new(
        Role::Message,
        Shape::Text {
            position: Point::new(width / 2.0, height / 2.0),
            text: message.to_string(),
            anchor: TextAnchor::Middle,
            font_size: theme.font_size,
        },
        Paint::fill(&theme.error_color),
    );
    Scene {
        width,
        height,
        transform,
        primitives: vec![text],
        points: Vec::new(),
        estimate: TargetEstimate::Undetermined,
        header: None,
        footer: Vec::new(),
        error: Some(message.to_string()),
    }
}
