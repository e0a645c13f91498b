use crate::ir::{Point, ReferencePoint, TargetEstimate};

use super::{ComposeContext, Paint, Primitive, Role, Shape};

/// Target-centred layout: spokes from the tracked device out to each node,
/// nodes coloured by distance band.
pub(super) fn compose_radial(
    ctx: &ComposeContext<'_>,
    points: &[ReferencePoint],
    visible: &[usize],
    target: &TargetEstimate,
) -> Vec<Primitive> {
    let theme = ctx.theme;
    let cfg = &ctx.config.radial;
    let centre = ctx.extent.centre();
    let mut primitives = Vec::with_capacity(visible.len() * 4 + 5);

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
        let fill = match point.distance {
            Some(distance) if !point.muted => theme.distance_color(distance),
            _ => theme.muted_node_color.as_str(),
        };
        primitives.push(
            Primitive::new(
                Role::Node,
                Shape::Circle {
                    center: point.position,
                    radius: cfg.node_radius,
                },
                Paint::fill(fill),
            )
            .with_entity(point.entity_id.as_str()),
        );
        primitives.push(ctx.text(
            Role::NodeName,
            Point::new(point.position.x, point.position.y - cfg.label_offset),
            point.name.as_str(),
        ));
        let mid = centre.lerp(point.position, 0.5);
        primitives.push(ctx.text(
            Role::NodeDistance,
            Point::new(mid.x, mid.y - cfg.label_offset / 2.0),
            ctx.distance_text(point),
        ));
    }

    for &idx in visible {
        let Some((from, to)) = spoke(centre, points[idx].position, cfg.centre_radius, cfg.node_radius)
        else {
            continue;
        };
        let stroke = if points[idx].muted {
            theme.muted_node_color.as_str()
        } else {
            theme.spoke_color.as_str()
        };
        primitives.push(Primitive::new(
            Role::Spoke,
            Shape::Line { from, to },
            Paint::stroke(stroke, cfg.spoke_width),
        ));
    }

    match target.used().first().and_then(|&idx| points[idx].distance) {
        Some(nearest) if target.position().is_some() => {
            primitives.push(Primitive::new(
                Role::ProximityRing,
                Shape::Circle {
                    center: centre,
                    radius: nearest.max(0.0) * cfg.pulse_factor,
                },
                Paint::stroke(&theme.centre_color, 1.0),
            ));
            primitives.push(
                Primitive::new(
                    Role::Target,
                    Shape::Circle {
                        center: centre,
                        radius: cfg.centre_radius,
                    },
                    Paint::fill(&theme.centre_color),
                )
                .with_entity(ctx.card.entity.as_str()),
            );
            primitives.push(ctx.text(
                Role::TargetLabel,
                Point::new(centre.x, centre.y + ctx.config.target_label_offset),
                ctx.target_name,
            ));
        }
        _ => primitives.push(ctx.no_distance_message()),
    }

    primitives
}

/// Segment from the edge of the centre marker to the edge of the node
/// marker, or `None` when the two markers overlap.
fn spoke(centre: Point, node: Point, centre_radius: f32, node_radius: f32) -> Option<(Point, Point)> {
    let length = centre.distance_to(node);
    if length <= centre_radius + node_radius {
        return None;
    }
    Some((
        centre.lerp(node, centre_radius / length),
        centre.lerp(node, 1.0 - node_radius / length),
    ))
}
