use crate::theme::Theme;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

static MAP_SIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s+(\d+)\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Please define an entity")]
    MissingEntity,
    #[error("Invalid map_size {0:?}: expected \"<cols> <rows>\" with both at least 1")]
    InvalidMapSize(String),
    #[error("Title is required when show_title is true.")]
    TitleRequired,
    #[error("Subtitle is required when show_subtitle is true.")]
    SubtitleRequired,
    #[error("At least one info_entity is required when show_info_entities is true.")]
    InfoEntitiesRequired,
    #[error("invalid card configuration: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapSize {
    pub cols: usize,
    pub rows: usize,
}

impl Default for MapSize {
    fn default() -> Self {
        Self { cols: 3, rows: 3 }
    }
}

impl TryFrom<String> for MapSize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let caps = MAP_SIZE_RE
            .captures(&value)
            .ok_or_else(|| ConfigError::InvalidMapSize(value.clone()))?;
        let parse = |idx: usize| -> Option<usize> { caps.get(idx)?.as_str().parse().ok() };
        match (parse(1), parse(2)) {
            (Some(cols), Some(rows)) if cols > 0 && rows > 0 => Ok(Self { cols, rows }),
            _ => Err(ConfigError::InvalidMapSize(value)),
        }
    }
}

impl From<MapSize> for String {
    fn from(value: MapSize) -> Self {
        format!("{} {}", value.cols, value.rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub sensor_distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub map_size: MapSize,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default = "default_true")]
    pub show_all_nodes: bool,
    #[serde(default = "default_true")]
    pub show_bounding_box: bool,
    #[serde(default = "default_true")]
    pub show_trilateration: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderConfig {
    #[serde(default)]
    pub show_title: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub show_subtitle: bool,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub show_zoom: bool,
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            show_title: false,
            title: None,
            show_subtitle: false,
            subtitle: None,
            show_zoom: false,
            default_zoom: default_zoom(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoEntityConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub entity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterConfig {
    #[serde(default)]
    pub show_info_entities: bool,
    #[serde(default)]
    pub info_entities: Vec<InfoEntityConfig>,
}

/// Card configuration with every optional field filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub entity: String,
    #[serde(default)]
    pub entity_name: Option<String>,
    pub map: MapConfig,
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default)]
    pub footer: FooterConfig,
}

impl CardConfig {
    /// Parses a card definition (JSON or JSON5). Structural problems such as a
    /// missing `map.nodes` or a malformed `map_size` fail here.
    pub fn from_json5(input: &str) -> Result<Self, ConfigError> {
        let config: CardConfig =
            json5::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
        if config.entity.trim().is_empty() {
            return Err(ConfigError::MissingEntity);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json5(&contents)?)
    }

    /// Cross-field checks. A failure here replaces the whole card with an
    /// error view instead of aborting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let header = &self.header;
        if header.show_title && header.title.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::TitleRequired);
        }
        if header.show_subtitle && header.subtitle.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::SubtitleRequired);
        }
        if self.footer.show_info_entities && self.footer.info_entities.is_empty() {
            return Err(ConfigError::InfoEntitiesRequired);
        }
        Ok(())
    }

    pub fn stub() -> Self {
        Self {
            entity: "sensor.tracked_device".to_string(),
            entity_name: Some("Tracked Device".to_string()),
            map: MapConfig {
                nodes: vec![
                    NodeConfig {
                        name: Some("Node 1".to_string()),
                        sensor_distance: "sensor.node_1_distance".to_string(),
                    },
                    NodeConfig {
                        name: Some("Node 2".to_string()),
                        sensor_distance: "sensor.node_2_distance".to_string(),
                    },
                ],
                map_size: MapSize::default(),
                layout: LayoutMode::Grid,
                show_all_nodes: true,
                show_bounding_box: true,
                show_trilateration: true,
            },
            header: HeaderConfig {
                show_title: true,
                title: Some("Network Visualization".to_string()),
                show_subtitle: false,
                subtitle: None,
                show_zoom: true,
                default_zoom: 100.0,
            },
            footer: FooterConfig {
                show_info_entities: true,
                info_entities: vec![
                    InfoEntityConfig {
                        name: Some("Node 1 Distance".to_string()),
                        entity: "sensor.node_1_distance".to_string(),
                    },
                    InfoEntityConfig {
                        name: Some("Node 2 Distance".to_string()),
                        entity: "sensor.node_2_distance".to_string(),
                    },
                ],
            },
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_zoom() -> f32 {
    100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorMethod {
    #[default]
    WeightedCentroid,
    Trilateration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinglePointOffset {
    /// Two marker radii to the right of the node.
    #[default]
    MarkerDiameter,
    /// The node's own reading, interpreted in model units.
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub method: EstimatorMethod,
    pub single_point_offset: SinglePointOffset,
    pub marker_radius: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            method: EstimatorMethod::WeightedCentroid,
            single_point_offset: SinglePointOffset::MarkerDiameter,
            marker_radius: 7.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleCoupling {
    /// Absolute gesture transforms only move the view; zoom stays put.
    #[default]
    Preserve,
    Follow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_step: f32,
    pub scale_coupling: ScaleCoupling,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 5.0,
            zoom_step: 1.2,
            scale_coupling: ScaleCoupling::Preserve,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialConfig {
    pub width: f32,
    pub height: f32,
    pub min_radius: f32,
    pub fallback_ratio: f32,
    pub node_radius: f32,
    pub centre_radius: f32,
    pub spoke_width: f32,
    pub label_offset: f32,
    pub pulse_factor: f32,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 600.0,
            min_radius: 60.0,
            fallback_ratio: 0.65,
            node_radius: 10.0,
            centre_radius: 10.0,
            spoke_width: 2.0,
            label_offset: 20.0,
            pulse_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub grid_width: f32,
    pub grid_height: f32,
    pub marker_radius: f32,
    pub name_offset: f32,
    pub distance_offset: f32,
    pub target_label_offset: f32,
    pub default_unit: String,
    pub no_distance_message: String,
    pub missing_entity_message: String,
    pub estimator: EstimatorConfig,
    pub viewport: ViewportConfig,
    pub radial: RadialConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_width: 400.0,
            grid_height: 400.0,
            marker_radius: 7.5,
            name_offset: 22.0,
            distance_offset: 35.0,
            target_label_offset: 25.0,
            default_unit: "ft".to_string(),
            no_distance_message: "No valid distances found".to_string(),
            missing_entity_message: "Error: Tracked device not found.".to_string(),
            estimator: EstimatorConfig::default(),
            viewport: ViewportConfig::default(),
            radial: RadialConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::home_assistant(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    node_color: Option<String>,
    muted_node_color: Option<String>,
    target_color: Option<String>,
    trilateration_color: Option<String>,
    bounding_box_color: Option<String>,
    error_color: Option<String>,
    spoke_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EstimatorConfigFile {
    method: Option<EstimatorMethod>,
    single_point_offset: Option<SinglePointOffset>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ViewportConfigFile {
    min_scale: Option<f32>,
    max_scale: Option<f32>,
    zoom_step: Option<f32>,
    scale_coupling: Option<ScaleCoupling>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    grid_width: Option<f32>,
    grid_height: Option<f32>,
    marker_radius: Option<f32>,
    default_unit: Option<String>,
    no_distance_message: Option<String>,
    radial_width: Option<f32>,
    radial_height: Option<f32>,
    radial_min_radius: Option<f32>,
    radial_fallback_ratio: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    estimator: Option<EstimatorConfigFile>,
    viewport: Option<ViewportConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" {
            config.theme = Theme::dark();
        } else if theme_name == "css" || theme_name == "host" {
            config.theme = Theme::css_variables();
        } else if theme_name == "default" || theme_name == "light" {
            config.theme = Theme::home_assistant();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.node_color {
            config.theme.node_color = v;
        }
        if let Some(v) = vars.muted_node_color {
            config.theme.muted_node_color = v;
        }
        if let Some(v) = vars.target_color {
            config.theme.target_color = v;
        }
        if let Some(v) = vars.trilateration_color {
            config.theme.trilateration_color = v;
        }
        if let Some(v) = vars.bounding_box_color {
            config.theme.bounding_box_color = v;
        }
        if let Some(v) = vars.error_color {
            config.theme.error_color = v;
        }
        if let Some(v) = vars.spoke_color {
            config.theme.spoke_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.grid_width {
            config.layout.grid_width = v.max(1.0);
        }
        if let Some(v) = layout.grid_height {
            config.layout.grid_height = v.max(1.0);
        }
        if let Some(v) = layout.marker_radius {
            config.layout.marker_radius = v;
            config.layout.estimator.marker_radius = v;
        }
        if let Some(v) = layout.default_unit {
            config.layout.default_unit = v;
        }
        if let Some(v) = layout.no_distance_message {
            config.layout.no_distance_message = v;
        }
        if let Some(v) = layout.radial_width {
            config.layout.radial.width = v.max(1.0);
        }
        if let Some(v) = layout.radial_height {
            config.layout.radial.height = v.max(1.0);
        }
        if let Some(v) = layout.radial_min_radius {
            config.layout.radial.min_radius = v;
        }
        if let Some(v) = layout.radial_fallback_ratio {
            config.layout.radial.fallback_ratio = v.clamp(0.0, 1.0);
        }
    }

    if let Some(estimator) = parsed.estimator {
        if let Some(v) = estimator.method {
            config.layout.estimator.method = v;
        }
        if let Some(v) = estimator.single_point_offset {
            config.layout.estimator.single_point_offset = v;
        }
    }

    if let Some(viewport) = parsed.viewport {
        if let Some(v) = viewport.min_scale {
            config.layout.viewport.min_scale = v;
        }
        if let Some(v) = viewport.max_scale {
            config.layout.viewport.max_scale = v;
        }
        if let Some(v) = viewport.zoom_step {
            config.layout.viewport.zoom_step = v;
        }
        if let Some(v) = viewport.scale_coupling {
            config.layout.viewport.scale_coupling = v;
        }
        let ViewportConfig {
            min_scale,
            max_scale,
            ..
        } = config.layout.viewport;
        if min_scale > max_scale {
            config.layout.viewport.min_scale = max_scale;
            config.layout.viewport.max_scale = min_scale;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        entity: "sensor.phone",
        map: { nodes: [{ sensor_distance: "sensor.a" }] },
    }"#;

    #[test]
    fn fills_defaults() {
        let config = CardConfig::from_json5(MINIMAL).unwrap();
        assert_eq!(config.map.map_size, MapSize { cols: 3, rows: 3 });
        assert!(config.map.show_all_nodes);
        assert!(config.map.show_bounding_box);
        assert!(config.map.show_trilateration);
        assert_eq!(config.map.layout, LayoutMode::Grid);
        assert_eq!(config.header.default_zoom, 100.0);
        assert!(!config.footer.show_info_entities);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_map_size() {
        let size = MapSize::try_from(" 4   2 ".to_string()).unwrap();
        assert_eq!(size, MapSize { cols: 4, rows: 2 });
        assert!(MapSize::try_from("0 3".to_string()).is_err());
        assert!(MapSize::try_from("3x3".to_string()).is_err());
        assert_eq!(String::from(size), "4 2");
    }

    #[test]
    fn rejects_structural_errors_at_parse_time() {
        let missing_nodes = r#"{ entity: "sensor.phone", map: {} }"#;
        assert!(matches!(
            CardConfig::from_json5(missing_nodes),
            Err(ConfigError::Parse(_))
        ));
        let bad_size = r#"{ entity: "sensor.phone", map: { nodes: [], map_size: "three" } }"#;
        assert!(CardConfig::from_json5(bad_size).is_err());
        let blank_entity = r#"{ entity: " ", map: { nodes: [] } }"#;
        assert_eq!(
            CardConfig::from_json5(blank_entity),
            Err(ConfigError::MissingEntity)
        );
    }

    #[test]
    fn validates_header_and_footer_flags() {
        let mut config = CardConfig::from_json5(MINIMAL).unwrap();
        config.header.show_title = true;
        assert_eq!(config.validate(), Err(ConfigError::TitleRequired));
        config.header.title = Some("Upstairs".to_string());
        config.header.show_subtitle = true;
        assert_eq!(config.validate(), Err(ConfigError::SubtitleRequired));
        config.header.show_subtitle = false;
        config.footer.show_info_entities = true;
        assert_eq!(config.validate(), Err(ConfigError::InfoEntitiesRequired));
        assert!(CardConfig::stub().validate().is_ok());
    }

    #[test]
    fn overlays_tool_config() {
        let config = parse_config(
            r##"{
                "theme": "dark",
                "themeVariables": { "targetColor": "#ff00ff" },
                "estimator": { "method": "trilateration", "singlePointOffset": "distance" },
                "viewport": { "minScale": 8.0, "maxScale": 2.0 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.target_color, "#ff00ff");
        assert_eq!(config.theme.background, Theme::dark().background);
        assert_eq!(config.layout.estimator.method, EstimatorMethod::Trilateration);
        assert_eq!(
            config.layout.estimator.single_point_offset,
            SinglePointOffset::Distance
        );
        assert_eq!(config.layout.viewport.min_scale, 2.0);
        assert_eq!(config.layout.viewport.max_scale, 8.0);
    }
}
