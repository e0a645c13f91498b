use crate::ir::{Point, ReferencePoint, TargetEstimate};

use super::{ComposeContext, Paint, Primitive, Role, Shape};

pub(super) fn compose_grid(
    ctx: &ComposeContext<'_>,
    points: &[ReferencePoint],
    visible: &[usize],
    target: &TargetEstimate,
) -> Vec<Primitive> {
    let theme = ctx.theme;
    let config = ctx.config;
    let radius = config.marker_radius;
    let mut primitives = Vec::with_capacity(visible.len() * 3 + 4);

    if ctx.card.map.show_bounding_box {
        primitives.push(Primitive::new(
            Role::BoundingBox,
            Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: ctx.extent.width,
                height: ctx.extent.height,
            },
            Paint::stroke(&theme.bounding_box_color, 1.0),
        ));
    }

    for &idx in visible {
        let point = &points[idx];
        let Point { x, y } = point.position;
        primitives.push(
            Primitive::new(
                Role::Node,
                Shape::Circle {
                    center: point.position,
                    radius,
                },
                Paint::fill(&theme.node_color),
            )
            .with_entity(point.entity_id.as_str()),
        );
        primitives.push(ctx.text(
            Role::NodeName,
            Point::new(x, y - config.name_offset),
            point.name.as_str(),
        ));
        primitives.push(ctx.text(
            Role::NodeDistance,
            Point::new(x, y - config.distance_offset),
            ctx.distance_text(point),
        ));
    }

    if ctx.card.map.show_trilateration {
        let used: Vec<Point> = target.used().iter().map(|&idx| points[idx].position).collect();
        match used.len() {
            2 => primitives.push(Primitive::new(
                Role::Trilateration,
                Shape::Line {
                    from: used[0],
                    to: used[1],
                },
                Paint::stroke(&theme.trilateration_color, 1.0),
            )),
            3 => primitives.push(Primitive::new(
                Role::Trilateration,
                Shape::Polygon { points: used },
                Paint::stroke(&theme.trilateration_color, 1.0),
            )),
            _ => {}
        }
    }

    match target.position() {
        Some(position) => {
            primitives.push(
                Primitive::new(
                    Role::Target,
                    Shape::Circle {
                        center: position,
                        radius,
                    },
                    Paint::fill(&theme.target_color),
                )
                .with_entity(ctx.card.entity.as_str()),
            );
            primitives.push(ctx.text(
                Role::TargetLabel,
                Point::new(position.x, position.y + config.target_label_offset),
                ctx.target_name,
            ));
        }
        None => primitives.push(ctx.no_distance_message()),
    }

    primitives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CardConfig, LayoutConfig};
    use crate::estimate::estimate;
    use crate::normalize::Extent;
    use crate::theme::Theme;

    fn compose(points: &[ReferencePoint], card: &CardConfig) -> Vec<Primitive> {
        let theme = Theme::home_assistant();
        let config = LayoutConfig::default();
        let ctx = ComposeContext {
            card,
            theme: &theme,
            config: &config,
            extent: Extent::new(400.0, 400.0),
            target_name: "Phone",
        };
        let target = estimate(points, &config.estimator);
        let visible: Vec<usize> = (0..points.len()).collect();
        compose_grid(&ctx, points, &visible, &target)
    }

    #[test]
    fn pair_draws_segment_and_labels() {
        let card = CardConfig::stub();
        let points = [
            ReferencePoint::new("Hall", Point::new(50.0, 50.0), Some(10.0)),
            ReferencePoint::new("Den", Point::new(150.0, 50.0), Some(10.0)),
        ];
        let primitives = compose(&points, &card);
        let segment = primitives
            .iter()
            .find(|p| p.role == Role::Trilateration)
            .unwrap();
        assert_eq!(
            segment.shape,
            Shape::Line {
                from: Point::new(50.0, 50.0),
                to: Point::new(150.0, 50.0)
            }
        );
        let distance_label = primitives
            .iter()
            .find(|p| p.role == Role::NodeDistance)
            .unwrap();
        match &distance_label.shape {
            Shape::Text { text, position, .. } => {
                assert_eq!(text, "10ft");
                assert_eq!(*position, Point::new(50.0, 15.0));
            }
            other => panic!("unexpected shape {other:?}"),
        }
        let target = primitives.iter().find(|p| p.role == Role::Target).unwrap();
        assert_eq!(target.entity.as_deref(), Some("sensor.tracked_device"));
        assert_eq!(
            target.shape,
            Shape::Circle {
                center: Point::new(100.0, 50.0),
                radius: 7.5
            }
        );
    }

    #[test]
    fn trilateration_outline_can_be_disabled() {
        let mut card = CardConfig::stub();
        card.map.show_trilateration = false;
        card.map.show_bounding_box = false;
        let points = [
            ReferencePoint::new("A", Point::new(0.0, 0.0), Some(1.0)),
            ReferencePoint::new("B", Point::new(10.0, 0.0), Some(1.0)),
            ReferencePoint::new("C", Point::new(0.0, 10.0), Some(1.0)),
        ];
        let primitives = compose(&points, &card);
        assert!(primitives.iter().all(|p| p.role != Role::Trilateration));
        assert!(primitives.iter().all(|p| p.role != Role::BoundingBox));
        assert_eq!(primitives.first().map(|p| p.role), Some(Role::Node));
    }

    #[test]
    fn unknown_distance_label() {
        let card = CardConfig::stub();
        let points = [ReferencePoint::new("A", Point::new(0.0, 0.0), None)];
        let primitives = compose(&points, &card);
        let texts: Vec<&str> = primitives
            .iter()
            .filter_map(|p| match &p.shape {
                Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["A", "unknown", "No valid distances found"]);
    }
}
