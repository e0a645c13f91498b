use serde::Serialize;

use crate::ir::{Point, ReferencePoint, TargetEstimate};
use crate::viewport::ViewportTransform;

/// What a primitive depicts. Hosts use it for hit-testing and styling hooks;
/// the SVG renderer emits it as a class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    BoundingBox,
    Node,
    NodeName,
    NodeDistance,
    Spoke,
    Trilateration,
    ProximityRing,
    Target,
    TargetLabel,
    Message,
}

impl Role {
    pub fn class_name(self) -> &'static str {
        match self {
            Role::BoundingBox => "bounding-box",
            Role::Node => "node",
            Role::NodeName => "node-name",
            Role::NodeDistance => "node-distance",
            Role::Spoke => "spoke",
            Role::Trilateration => "trilateration",
            Role::ProximityRing => "proximity-ring",
            Role::Target => "target",
            Role::TargetLabel => "target-label",
            Role::Message => "message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Circle {
        center: Point,
        radius: f32,
    },
    Line {
        from: Point,
        to: Point,
    },
    Polygon {
        points: Vec<Point>,
    },
    Text {
        position: Point,
        text: String,
        anchor: TextAnchor,
        font_size: f32,
    },
}

impl Shape {
    /// The same shape mapped through `transform`. Lengths scale uniformly.
    pub fn transformed(&self, transform: &ViewportTransform) -> Shape {
        let k = transform.scale;
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                let origin = transform.apply(Point::new(*x, *y));
                Shape::Rect {
                    x: origin.x,
                    y: origin.y,
                    width: width * k,
                    height: height * k,
                }
            }
            Shape::Circle { center, radius } => Shape::Circle {
                center: transform.apply(*center),
                radius: radius * k,
            },
            Shape::Line { from, to } => Shape::Line {
                from: transform.apply(*from),
                to: transform.apply(*to),
            },
            Shape::Polygon { points } => Shape::Polygon {
                points: points.iter().map(|p| transform.apply(*p)).collect(),
            },
            Shape::Text {
                position,
                text,
                anchor,
                font_size,
            } => Shape::Text {
                position: transform.apply(*position),
                text: text.clone(),
                anchor: *anchor,
                font_size: font_size * k,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f32,
}

impl Paint {
    pub fn fill(color: &str) -> Self {
        Self {
            fill: Some(color.to_string()),
            stroke: None,
            stroke_width: 0.0,
        }
    }

    pub fn stroke(color: &str, width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some(color.to_string()),
            stroke_width: width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    pub role: Role,
    pub shape: Shape,
    pub paint: Paint,
    /// Entity a host should open when this primitive is clicked.
    pub entity: Option<String>,
}

impl Primitive {
    pub fn new(role: Role, shape: Shape, paint: Paint) -> Self {
        Self {
            role,
            shape,
            paint,
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Header {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub zoom_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoLine {
    pub entity: String,
    pub text: String,
    pub missing: bool,
}

/// Everything a drawing surface needs for one render pass. Primitive
/// coordinates are in model space; `transform` maps them to the screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub transform: ViewportTransform,
    pub primitives: Vec<Primitive>,
    pub points: Vec<ReferencePoint>,
    pub estimate: TargetEstimate,
    pub header: Option<Header>,
    pub footer: Vec<InfoLine>,
    pub error: Option<String>,
}

impl Scene {
    /// Primitives with the viewport transform already applied, for surfaces
    /// that cannot nest a group transform.
    pub fn screen_primitives(&self) -> Vec<Primitive> {
        self.primitives
            .iter()
            .map(|primitive| Primitive {
                shape: primitive.shape.transformed(&self.transform),
                paint: Paint {
                    stroke_width: primitive.paint.stroke_width * self.transform.scale,
                    ..primitive.paint.clone()
                },
                ..primitive.clone()
            })
            .collect()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.primitives.iter().map(|p| p.role).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(primitives: Vec<Primitive>) -> Scene {
        Scene {
            width: 400.0,
            height: 400.0,
            transform: ViewportTransform {
                translate_x: 10.0,
                translate_y: 20.0,
                scale: 2.0,
            },
            primitives,
            points: Vec::new(),
            estimate: TargetEstimate::Undetermined,
            header: None,
            footer: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn screen_primitives_apply_viewport() {
        let scene = scene(vec![
            Primitive::new(
                Role::Node,
                Shape::Circle {
                    center: Point::new(5.0, 5.0),
                    radius: 3.0,
                },
                Paint::stroke("#000", 1.5),
            )
            .with_entity("sensor.hall"),
            Primitive::new(
                Role::BoundingBox,
                Shape::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 50.0,
                },
                Paint::fill("#fff"),
            ),
            Primitive::new(
                Role::Spoke,
                Shape::Line {
                    from: Point::new(1.0, 2.0),
                    to: Point::new(-4.0, 8.0),
                },
                Paint::stroke("#333", 1.0),
            ),
            Primitive::new(
                Role::NodeName,
                Shape::Text {
                    position: Point::new(50.0, 40.0),
                    text: "Hall".to_string(),
                    anchor: TextAnchor::Start,
                    font_size: 12.0,
                },
                Paint::fill("#222"),
            ),
        ]);
        let screen = scene.screen_primitives();

        assert_eq!(
            screen[0].shape,
            Shape::Circle {
                center: Point::new(20.0, 30.0),
                radius: 6.0
            }
        );
        assert_eq!(screen[0].paint.stroke_width, 3.0);
        assert_eq!(screen[0].entity.as_deref(), Some("sensor.hall"));
        assert_eq!(
            screen[1].shape,
            Shape::Rect {
                x: 10.0,
                y: 20.0,
                width: 200.0,
                height: 100.0
            }
        );
        assert_eq!(
            screen[2].shape,
            Shape::Line {
                from: Point::new(12.0, 24.0),
                to: Point::new(2.0, 36.0)
            }
        );
        assert_eq!(
            screen[3].shape,
            Shape::Text {
                position: Point::new(110.0, 100.0),
                text: "Hall".to_string(),
                anchor: TextAnchor::Start,
                font_size: 24.0
            }
        );
        assert_eq!(screen[3].paint.fill.as_deref(), Some("#222"));
        // Model-space primitives are left untouched.
        assert_eq!(scene.primitives[0].paint.stroke_width, 1.5);
    }

    #[test]
    fn identity_leaves_polygons_in_place() {
        let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(0.0, 4.0)];
        let shape = Shape::Polygon {
            points: points.clone(),
        };
        assert_eq!(shape.transformed(&ViewportTransform::IDENTITY), shape);
        let shifted = shape.transformed(&ViewportTransform {
            translate_x: -1.0,
            translate_y: 1.0,
            scale: 0.5,
        });
        assert_eq!(
            shifted,
            Shape::Polygon {
                points: vec![Point::new(-1.0, 1.0), Point::new(0.5, 1.0), Point::new(-1.0, 3.0)]
            }
        );
    }
}
