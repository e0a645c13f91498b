use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// A stationary node with a fixed model-space position and its latest
/// distance reading to the tracked device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferencePoint {
    pub name: String,
    pub entity_id: String,
    pub distance: Option<f32>,
    pub unit: Option<String>,
    pub position: Point,
    /// Set by the radial layout for nodes drawn at the fallback radius.
    pub muted: bool,
}

impl ReferencePoint {
    pub fn new(name: impl Into<String>, position: Point, distance: Option<f32>) -> Self {
        let name = name.into();
        Self {
            entity_id: name.clone(),
            name,
            distance,
            unit: None,
            position,
            muted: false,
        }
    }

    pub fn has_reading(&self) -> bool {
        self.distance.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMethod {
    Single,
    Interpolated,
    WeightedCentroid,
    Trilaterated,
    /// Radial layouts place the tracked device at the centre.
    Centre,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetEstimate {
    Undetermined,
    Point {
        position: Point,
        method: EstimateMethod,
        /// Indices into the reference point slice, closest first.
        used: Vec<usize>,
    },
}

impl TargetEstimate {
    pub fn position(&self) -> Option<Point> {
        match self {
            TargetEstimate::Undetermined => None,
            TargetEstimate::Point { position, .. } => Some(*position),
        }
    }

    pub fn method(&self) -> Option<EstimateMethod> {
        match self {
            TargetEstimate::Undetermined => None,
            TargetEstimate::Point { method, .. } => Some(*method),
        }
    }

    pub fn used(&self) -> &[usize] {
        match self {
            TargetEstimate::Undetermined => &[],
            TargetEstimate::Point { used, .. } => used,
        }
    }

    pub fn is_undetermined(&self) -> bool {
        matches!(self, TargetEstimate::Undetermined)
    }
}
