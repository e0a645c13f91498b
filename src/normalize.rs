//! Turning raw sensor states and layout slots into [`ReferencePoint`]s.
//!
//! Everything in here is a pure function of its inputs, so a render pass can
//! rebuild the reference set from scratch every time.

use crate::config::{CardConfig, MapSize, RadialConfig};
use crate::ir::{Point, ReferencePoint};
use crate::states::StateStore;

const UNKNOWN_SENTINELS: [&str; 2] = ["unknown", "unavailable"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn centre(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A reading is usable when it is a finite number and not one of the host's
/// "no data" sentinels.
pub fn parse_reading(raw: Option<&str>) -> Option<f32> {
    let trimmed = raw?.trim();
    if UNKNOWN_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
    {
        return None;
    }
    trimmed.parse::<f32>().ok().filter(|value| value.is_finite())
}

/// Centre of the `index`-th grid cell, filling rows left to right.
pub fn grid_position(index: usize, size: MapSize, extent: Extent) -> Point {
    let cols = size.cols.max(1);
    let rows = size.rows.max(1);
    let cell_width = extent.width / cols as f32;
    let cell_height = extent.height / rows as f32;
    Point::new(
        (index % cols) as f32 * cell_width + cell_width / 2.0,
        (index / cols) as f32 * cell_height + cell_height / 2.0,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialSlot {
    pub position: Point,
    pub radius: f32,
    pub angle_degrees: f32,
    pub muted: bool,
}

/// Spreads nodes at equal angles around the centre, pushed outwards in
/// proportion to their reading relative to the farthest one.
pub fn radial_positions(distances: &[Option<f32>], extent: Extent, cfg: &RadialConfig) -> Vec<RadialSlot> {
    if distances.is_empty() {
        return Vec::new();
    }
    let centre = extent.centre();
    let max_radius = (extent.width.min(extent.height) / 2.0 - cfg.min_radius).max(cfg.min_radius);
    let max_distance = distances
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f32, f32::max);
    let angle_step = 360.0 / distances.len() as f32;

    distances
        .iter()
        .enumerate()
        .map(|(idx, distance)| {
            let angle_degrees = angle_step * idx as f32;
            let (radius, muted) = match distance {
                Some(d) if max_distance > 0.0 => {
                    ((d.max(0.0) / max_distance * max_radius).max(cfg.min_radius), false)
                }
                // Every reading is zero: keep them legible at the minimum radius.
                Some(_) => (cfg.min_radius, false),
                None => (max_radius * cfg.fallback_ratio, true),
            };
            let radians = angle_degrees.to_radians();
            RadialSlot {
                position: Point::new(
                    centre.x + radius * radians.cos(),
                    centre.y + radius * radians.sin(),
                ),
                radius,
                angle_degrees,
                muted,
            }
        })
        .collect()
}

/// Resolves every configured node against the state store. Positions are
/// grid cells; the radial layout repositions them afterwards.
pub fn normalize_nodes(config: &CardConfig, states: &StateStore, extent: Extent) -> Vec<ReferencePoint> {
    config
        .map
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let state = states.get(&node.sensor_distance);
            if state.is_none() {
                tracing::debug!(sensor = %node.sensor_distance, "distance sensor not in state store");
            }
            let name = node
                .name
                .clone()
                .filter(|name| !name.is_empty())
                .or_else(|| state.and_then(|s| s.attributes.friendly_name.clone()))
                .unwrap_or_else(|| node.sensor_distance.clone());
            ReferencePoint {
                name,
                entity_id: node.sensor_distance.clone(),
                distance: parse_reading(state.map(|s| s.state.as_str())),
                unit: state.and_then(|s| s.attributes.unit_of_measurement.clone()),
                position: grid_position(idx, config.map.map_size, extent),
                muted: false,
            }
        })
        .collect()
}

/// Moves already-normalized points onto their radial slots.
pub fn apply_radial_layout(points: &mut [ReferencePoint], extent: Extent, cfg: &RadialConfig) {
    let distances: Vec<Option<f32>> = points.iter().map(|p| p.distance).collect();
    let slots = radial_positions(&distances, extent, cfg);
    for (point, slot) in points.iter_mut().zip(slots) {
        point.position = slot.position;
        point.muted = slot.muted;
    }
}
