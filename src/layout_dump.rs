use crate::ir::{EstimateMethod, Point};
use crate::layout::{Primitive, Scene};
use crate::viewport::ViewportTransform;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub width: f32,
    pub height: f32,
    pub transform: ViewportTransform,
    pub nodes: Vec<NodeDump>,
    pub estimate: EstimateDump,
    pub primitives: Vec<Primitive>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub name: String,
    pub entity_id: String,
    pub x: f32,
    pub y: f32,
    pub distance: Option<f32>,
    pub muted: bool,
}

#[derive(Debug, Serialize)]
pub struct EstimateDump {
    pub determined: bool,
    pub position: Option<[f32; 2]>,
    pub method: Option<EstimateMethod>,
    /// Names of the nodes that contributed, closest first.
    pub used: Vec<String>,
}

impl SceneDump {
    pub fn from_scene(scene: &Scene) -> Self {
        let nodes = scene
            .points
            .iter()
            .map(|point| NodeDump {
                name: point.name.clone(),
                entity_id: point.entity_id.clone(),
                x: point.position.x,
                y: point.position.y,
                distance: point.distance,
                muted: point.muted,
            })
            .collect();

        let estimate = EstimateDump {
            determined: !scene.estimate.is_undetermined(),
            position: scene.estimate.position().map(|Point { x, y }| [x, y]),
            method: scene.estimate.method(),
            used: scene
                .estimate
                .used()
                .iter()
                .filter_map(|&idx| scene.points.get(idx))
                .map(|point| point.name.clone())
                .collect(),
        };

        SceneDump {
            width: scene.width,
            height: scene.height,
            transform: scene.transform,
            nodes,
            estimate,
            primitives: scene.primitives.clone(),
            error: scene.error.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
