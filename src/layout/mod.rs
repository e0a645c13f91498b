mod error;
mod grid;
mod radial;
pub(crate) mod types;
pub use error::compute_error_scene;
pub use types::*;
use grid::*;
use radial::*;

use crate::config::{CardConfig, LayoutConfig, LayoutMode};
use crate::estimate::{closest, estimate};
use crate::ir::{EstimateMethod, Point, ReferencePoint, TargetEstimate};
use crate::normalize::{apply_radial_layout, normalize_nodes, Extent};
use crate::states::StateStore;
use crate::theme::Theme;
use crate::viewport::ViewportTransform;

/// Builds the full scene for one render pass. The card configuration is
/// expected to have passed [`CardConfig::validate`] already.
///
/// The result depends only on its arguments: calling it twice with the same
/// inputs yields equal scenes.
pub fn compute_scene(
    card: &CardConfig,
    states: &StateStore,
    transform: ViewportTransform,
    theme: &Theme,
    config: &LayoutConfig,
) -> Scene {
    let Some(tracked) = states.get(&card.entity) else {
        tracing::warn!(entity = %card.entity, "tracked device not found in state store");
        let mut scene = compute_error_scene(&config.missing_entity_message, transform, theme, config);
        scene.header = build_header(card, transform);
        scene.footer = build_footer(card, states);
        return scene;
    };
    let target_name = card
        .entity_name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| tracked.attributes.friendly_name.clone())
        .unwrap_or_else(|| card.entity.clone());

    let (extent, points, target) = match card.map.layout {
        LayoutMode::Grid => {
            let extent = Extent::new(config.grid_width, config.grid_height);
            let points = normalize_nodes(card, states, extent);
            let target = estimate(&points, &config.estimator);
            (extent, points, target)
        }
        LayoutMode::Radial => {
            let extent = Extent::new(config.radial.width, config.radial.height);
            let mut points = normalize_nodes(card, states, extent);
            apply_radial_layout(&mut points, extent, &config.radial);
            let used = closest(&points);
            // The radial layout is centred on the tracked device.
            let target = if used.is_empty() {
                TargetEstimate::Undetermined
            } else {
                TargetEstimate::Point {
                    position: extent.centre(),
                    method: EstimateMethod::Centre,
                    used,
                }
            };
            (extent, points, target)
        }
    };

    let visible = visible_points(&points, card.map.show_all_nodes);
    let ctx = ComposeContext {
        card,
        theme,
        config,
        extent,
        target_name: &target_name,
    };
    let primitives = match card.map.layout {
        LayoutMode::Grid => compose_grid(&ctx, &points, &visible, &target),
        LayoutMode::Radial => compose_radial(&ctx, &points, &visible, &target),
    };
    tracing::debug!(
        nodes = points.len(),
        visible = visible.len(),
        primitives = primitives.len(),
        "scene composed"
    );

    Scene {
        width: extent.width,
        height: extent.height,
        transform,
        primitives,
        points,
        estimate: target,
        header: build_header(card, transform),
        footer: build_footer(card, states),
        error: None,
    }
}

pub(super) struct ComposeContext<'a> {
    pub card: &'a CardConfig,
    pub theme: &'a Theme,
    pub config: &'a LayoutConfig,
    pub extent: Extent,
    pub target_name: &'a str,
}

impl ComposeContext<'_> {
    pub fn text(&self, role: Role, position: Point, text: impl Into<String>) -> Primitive {
        Primitive::new(
            role,
            Shape::Text {
                position,
                text: text.into(),
                anchor: TextAnchor::Middle,
                font_size: self.theme.font_size,
            },
            Paint::fill(&self.theme.text_color),
        )
    }

    pub fn distance_text(&self, point: &ReferencePoint) -> String {
        match point.distance {
            Some(distance) => format!(
                "{}{}",
                distance,
                point.unit.as_deref().unwrap_or(&self.config.default_unit)
            ),
            None => "unknown".to_string(),
        }
    }

    pub fn no_distance_message(&self) -> Primitive {
        self.text(
            Role::Message,
            self.extent.centre(),
            self.config.no_distance_message.as_str(),
        )
    }
}

/// Indices of the nodes that should be drawn. Hiding nodes never affects
/// which nodes the estimator considers.
pub fn visible_points(points: &[ReferencePoint], show_all_nodes: bool) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| show_all_nodes || point.has_reading())
        .map(|(idx, _)| idx)
        .collect()
}

fn build_header(card: &CardConfig, transform: ViewportTransform) -> Option<Header> {
    let header = &card.header;
    if !header.show_title {
        return None;
    }
    Some(Header {
        title: header.title.clone(),
        subtitle: header
            .subtitle
            .clone()
            .filter(|_| header.show_subtitle),
        zoom_label: header.show_zoom.then(|| transform.zoom_label()),
    })
}

fn build_footer(card: &CardConfig, states: &StateStore) -> Vec<InfoLine> {
    if !card.footer.show_info_entities {
        return Vec::new();
    }
    card.footer
        .info_entities
        .iter()
        .map(|info| match states.get(&info.entity) {
            Some(state) => {
                let name = [info.name.as_deref(), state.attributes.friendly_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .find(|name| !name.is_empty())
                    .unwrap_or(&info.entity);
                let unit = state
                    .attributes
                    .unit_of_measurement
                    .as_deref()
                    .map(|unit| format!(" {unit}"))
                    .unwrap_or_default();
                InfoLine {
                    entity: info.entity.clone(),
                    text: format!("{name}: {}{unit}", state.state),
                    missing: false,
                }
            }
            None => InfoLine {
                entity: info.entity.clone(),
                text: format!("Error: {} not found", info.entity),
                missing: true,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::EntityState;

    fn card(source: &str) -> CardConfig {
        CardConfig::from_json5(source).unwrap()
    }

    fn three_node_card() -> CardConfig {
        card(
            r#"{
                entity: "device_tracker.phone",
                entity_name: "Phone",
                map: {
                    map_size: "3 3",
                    nodes: [
                        { name: "A", sensor_distance: "sensor.a" },
                        { name: "B", sensor_distance: "sensor.b" },
                        { name: "C", sensor_distance: "sensor.c" },
                        { name: "D", sensor_distance: "sensor.d" },
                    ],
                },
                header: { show_title: true, title: "Upstairs", show_zoom: true },
                footer: { show_info_entities: true, info_entities: [
                    { entity: "sensor.a" }, { name: "Gone", entity: "sensor.gone" },
                ] },
            }"#,
        )
    }

    fn states(readings: &[(&str, &str)]) -> StateStore {
        let mut store = StateStore::new();
        store.insert("device_tracker.phone", EntityState::new("home"));
        for (id, value) in readings {
            store.insert(*id, EntityState::new(*value).with_friendly_name(id.to_uppercase()));
        }
        store
    }

    #[test]
    fn composition_order_puts_target_last() {
        let card = three_node_card();
        let store = states(&[("sensor.a", "2"), ("sensor.b", "3"), ("sensor.c", "4")]);
        let scene = compute_scene(
            &card,
            &store,
            ViewportTransform::IDENTITY,
            &Theme::home_assistant(),
            &LayoutConfig::default(),
        );
        let roles = scene.roles();
        assert_eq!(roles.first(), Some(&Role::BoundingBox));
        assert_eq!(roles[roles.len() - 2], Role::Target);
        assert_eq!(roles[roles.len() - 1], Role::TargetLabel);
        let last_node = roles.iter().rposition(|r| *r == Role::NodeDistance).unwrap();
        let triangle = roles.iter().position(|r| *r == Role::Trilateration).unwrap();
        assert!(last_node < triangle);
        assert_eq!(roles.iter().filter(|r| **r == Role::Node).count(), 4);
        assert_eq!(scene.estimate.method(), Some(EstimateMethod::WeightedCentroid));
    }

    #[test]
    fn hidden_nodes_do_not_change_estimate() {
        let mut card = three_node_card();
        let store = states(&[("sensor.a", "2"), ("sensor.b", "unknown"), ("sensor.c", "4")]);
        let theme = Theme::home_assistant();
        let config = LayoutConfig::default();
        let shown = compute_scene(&card, &store, ViewportTransform::IDENTITY, &theme, &config);
        card.map.show_all_nodes = false;
        let hidden = compute_scene(&card, &store, ViewportTransform::IDENTITY, &theme, &config);

        let count = |scene: &Scene| scene.roles().iter().filter(|r| **r == Role::Node).count();
        assert_eq!(count(&shown), 4);
        assert_eq!(count(&hidden), 2);
        assert_eq!(shown.estimate, hidden.estimate);
    }

    #[test]
    fn undetermined_shows_message() {
        let card = three_node_card();
        let store = states(&[]);
        let scene = compute_scene(
            &card,
            &store,
            ViewportTransform::IDENTITY,
            &Theme::home_assistant(),
            &LayoutConfig::default(),
        );
        assert!(scene.estimate.is_undetermined());
        let last = scene.primitives.last().unwrap();
        assert_eq!(last.role, Role::Message);
        match &last.shape {
            Shape::Text { text, position, .. } => {
                assert_eq!(text, "No valid distances found");
                assert_eq!(*position, Point::new(200.0, 200.0));
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert!(!scene.roles().contains(&Role::Target));
    }

    #[test]
    fn missing_tracked_entity_is_inline_error() {
        let card = three_node_card();
        let store = StateStore::new();
        let scene = compute_scene(
            &card,
            &store,
            ViewportTransform::IDENTITY,
            &Theme::home_assistant(),
            &LayoutConfig::default(),
        );
        assert_eq!(scene.error.as_deref(), Some("Error: Tracked device not found."));
        assert_eq!(scene.primitives.len(), 1);
    }

    #[test]
    fn header_and_footer() {
        let card = three_node_card();
        let mut store = states(&[("sensor.a", "2")]);
        store.insert(
            "sensor.a",
            EntityState::new("2")
                .with_friendly_name("Hall")
                .with_unit("ft"),
        );
        let transform = ViewportTransform {
            scale: 1.44,
            ..ViewportTransform::IDENTITY
        };
        let scene = compute_scene(
            &card,
            &store,
            transform,
            &Theme::home_assistant(),
            &LayoutConfig::default(),
        );
        let header = scene.header.unwrap();
        assert_eq!(header.title.as_deref(), Some("Upstairs"));
        assert_eq!(header.subtitle, None);
        assert_eq!(header.zoom_label.as_deref(), Some("Zoom: 144%"));
        assert_eq!(scene.footer[0].text, "Hall: 2 ft");
        assert!(scene.footer[1].missing);
        assert_eq!(scene.footer[1].text, "Error: sensor.gone not found");
    }

    #[test]
    fn radial_layout_centres_target() {
        let mut card = three_node_card();
        card.map.layout = LayoutMode::Radial;
        let store = states(&[("sensor.a", "12"), ("sensor.b", "3"), ("sensor.c", "40")]);
        let config = LayoutConfig::default();
        let scene = compute_scene(
            &card,
            &store,
            ViewportTransform::IDENTITY,
            &Theme::home_assistant(),
            &config,
        );
        assert_eq!(scene.width, 900.0);
        assert_eq!(scene.estimate.position(), Some(Point::new(450.0, 300.0)));
        assert_eq!(scene.estimate.used(), &[1, 0, 2]);
        assert!(scene.points[3].muted);
        assert_eq!(scene.roles().last(), Some(&Role::TargetLabel));
        assert!(scene.roles().contains(&Role::ProximityRing));
    }

    #[test]
    fn empty_footer_name_falls_back_to_friendly_name() {
        let mut card = three_node_card();
        card.footer.info_entities[0].name = Some(String::new());
        let mut store = states(&[]);
        store.insert(
            "sensor.a",
            EntityState::new("3").with_friendly_name("Hall").with_unit("ft"),
        );
        let scene = compute_scene(
            &card,
            &store,
            ViewportTransform::IDENTITY,
            &Theme::home_assistant(),
            &LayoutConfig::default(),
        );
        assert_eq!(scene.footer[0].text, "Hall: 3 ft");

        store.insert("sensor.a", EntityState::new("3").with_friendly_name(""));
        let scene = compute_scene(
            &card,
            &store,
            ViewportTransform::IDENTITY,
            &Theme::home_assistant(),
            &LayoutConfig::default(),
        );
        assert_eq!(scene.footer[0].text, "sensor.a: 3");
    }

    #[test]
    fn radial_spokes_ignore_trilateration_toggle() {
        let mut card = three_node_card();
        card.map.layout = LayoutMode::Radial;
        card.map.show_trilateration = false;
        let store = states(&[("sensor.a", "12"), ("sensor.b", "3"), ("sensor.c", "40")]);
        let scene = compute_scene(
            &card,
            &store,
            ViewportTransform::IDENTITY,
            &Theme::home_assistant(),
            &LayoutConfig::default(),
        );
        let spokes = scene.roles().iter().filter(|r| **r == Role::Spoke).count();
        assert_eq!(spokes, scene.points.len());
        assert!(!scene.roles().contains(&Role::Trilateration));
    }

    #[test]
    fn repeated_passes_are_identical() {
        let card = three_node_card();
        let store = states(&[("sensor.a", "2.5"), ("sensor.c", "7")]);
        let transform = ViewportTransform {
            translate_x: 13.0,
            translate_y: -4.0,
            scale: 2.0,
        };
        let theme = Theme::home_assistant();
        let config = LayoutConfig::default();
        let first = compute_scene(&card, &store, transform, &theme, &config);
        let second = compute_scene(&card, &store, transform, &theme, &config);
        assert_eq!(first, second);
    }
}
