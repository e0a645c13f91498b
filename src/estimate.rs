//! Position estimation from the closest reference points.
//!
//! Up to three of the nearest nodes with a valid reading contribute:
//! one node yields a fixed nudge away from it, two nodes an interpolation along
//! the segment between them, three nodes an inverse-distance-weighted centroid
//! (or, when configured, a guarded closed-form trilateration).

use std::cmp::Ordering;

use crate::config::{EstimatorConfig, EstimatorMethod, SinglePointOffset};
use crate::ir::{EstimateMethod, Point, ReferencePoint, TargetEstimate};

/// Readings below this are treated as this value so `1/d` stays finite.
pub const DISTANCE_FLOOR: f32 = 1e-3;

/// Relative determinant below which three nodes count as collinear.
pub const COLLINEAR_EPSILON: f32 = 1e-6;

pub const MAX_CONTRIBUTORS: usize = 3;

/// Indices of the nodes with a reading, nearest first. Ties keep declaration order.
pub fn closest(points: &[ReferencePoint]) -> Vec<usize> {
    let mut ranked: Vec<(usize, f32)> = points
        .iter()
        .enumerate()
        .filter_map(|(idx, point)| point.distance.map(|d| (idx, d)))
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    ranked.truncate(MAX_CONTRIBUTORS);
    ranked.into_iter().map(|(idx, _)| idx).collect()
}

pub fn estimate(points: &[ReferencePoint], config: &EstimatorConfig) -> TargetEstimate {
    let used = closest(points);
    let sample = |idx: usize| -> (Point, f32) {
        let point = &points[idx];
        (point.position, point.distance.unwrap_or(0.0))
    };

    let (position, method) = match used.as_slice() {
        [] => {
            tracing::debug!("no reference point has a valid reading");
            return TargetEstimate::Undetermined;
        }
        [a] => {
            let (p, d) = sample(*a);
            (single_point(p, d, config), EstimateMethod::Single)
        }
        [a, b] => (
            interpolate(sample(*a), sample(*b)),
            EstimateMethod::Interpolated,
        ),
        [a, b, c, ..] => {
            let samples = [sample(*a), sample(*b), sample(*c)];
            match config.method {
                EstimatorMethod::WeightedCentroid => {
                    (weighted_centroid(&samples), EstimateMethod::WeightedCentroid)
                }
                EstimatorMethod::Trilateration => match trilaterate(&samples) {
                    Some(point) => (point, EstimateMethod::Trilaterated),
                    None => {
                        tracing::debug!("reference points are collinear, using weighted centroid");
                        (weighted_centroid(&samples), EstimateMethod::WeightedCentroid)
                    }
                },
            }
        }
    };

    tracing::debug!(x = position.x, y = position.y, ?method, "target estimated");
    TargetEstimate::Point {
        position,
        method,
        used,
    }
}

fn single_point(position: Point, distance: f32, config: &EstimatorConfig) -> Point {
    let offset = match config.single_point_offset {
        SinglePointOffset::MarkerDiameter => config.marker_radius * 2.0,
        SinglePointOffset::Distance => distance.max(0.0),
    };
    Point::new(position.x + offset, position.y)
}

/// Moves from the first point toward the second by `d1 / (d1 + d2)`.
pub fn interpolate((p1, d1): (Point, f32), (p2, d2): (Point, f32)) -> Point {
    let d1 = d1.max(DISTANCE_FLOOR);
    let d2 = d2.max(DISTANCE_FLOOR);
    p1.lerp(p2, d1 / (d1 + d2))
}

pub fn weighted_centroid(samples: &[(Point, f32)]) -> Point {
    let weights: Vec<f32> = samples
        .iter()
        .map(|(_, d)| 1.0 / d.max(DISTANCE_FLOOR))
        .collect();
    let total: f32 = weights.iter().sum();
    let mut x = 0.0;
    let mut y = 0.0;
    for ((point, _), weight) in samples.iter().zip(&weights) {
        let w = weight / total;
        x += point.x * w;
        y += point.y * w;
    }
    Point::new(x, y)
}

/// Closed-form intersection of three range circles via the linearized
/// 2x2 system. Returns `None` when the nodes are (nearly) collinear or
/// coincide, or when the solve is not finite.
pub fn trilaterate(samples: &[(Point, f32); 3]) -> Option<Point> {
    let [(p1, d1), (p2, d2), (p3, d3)] = *samples;
    let a = 2.0 * (p2.x - p1.x);
    let b = 2.0 * (p2.y - p1.y);
    let c = 2.0 * (p3.x - p1.x);
    let d = 2.0 * (p3.y - p1.y);
    let e = d1 * d1 - d2 * d2 - p1.x * p1.x + p2.x * p2.x - p1.y * p1.y + p2.y * p2.y;
    let f = d1 * d1 - d3 * d3 - p1.x * p1.x + p3.x * p3.x - p1.y * p1.y + p3.y * p3.y;

    let det = a * d - b * c;
    let scale = (a * a + b * b).max(c * c + d * d);
    if scale == 0.0 || det.abs() <= COLLINEAR_EPSILON * scale {
        return None;
    }
    let x = (e * d - b * f) / det;
    let y = (a * f - e * c) / det;
    (x.is_finite() && y.is_finite()).then_some(Point::new(x, y))
}
