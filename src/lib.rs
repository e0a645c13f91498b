pub mod card;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod estimate;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod normalize;
pub mod render;
pub mod states;
pub mod theme;
pub mod viewport;

pub use card::{Card, CardError, Surface, SvgSurface};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{CardConfig, Config, ConfigError, LayoutConfig, RenderConfig};
pub use layout::{Scene, compute_error_scene, compute_scene};
pub use render::render_svg;
pub use states::StateStore;
pub use theme::Theme;
pub use viewport::{Gesture, ViewportController, ViewportTransform};

/// Everything a one-shot render needs besides the card and the states.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// Transform carried over from a previous render.
    pub transform: Option<ViewportTransform>,
    /// Gestures replayed through a fresh viewport controller before drawing.
    pub gestures: Vec<Gesture>,
}

impl RenderOptions {
    pub fn home_assistant() -> Self {
        Self::from_config(Config::default())
    }

    pub fn dark() -> Self {
        Self {
            theme: Theme::dark(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
            transform: None,
            gestures: Vec::new(),
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
            transform: None,
            gestures: Vec::new(),
        }
    }

    fn to_config(&self) -> Config {
        Config {
            theme: self.theme.clone(),
            layout: self.layout.clone(),
            render: self.render.clone(),
        }
    }
}

/// Card source (JSON5) and a state snapshot (JSON) in, SVG out. A card that
/// parses but fails validation renders as an error card rather than failing.
pub fn render_with_options(card: &str, states: &str, options: RenderOptions) -> anyhow::Result<String> {
    let scene = scene_with_options(card, states, &options)?;
    Ok(render_svg(&scene, &options.theme))
}

pub fn scene_with_options(card: &str, states: &str, options: &RenderOptions) -> anyhow::Result<Scene> {
    let card = CardConfig::from_json5(card)?;
    let states = StateStore::from_json(states)?;
    let settings = options.to_config();
    let mut widget = Card::new(card, &settings, SvgSurface::new(settings.theme.clone()));
    widget.update_states(states);
    if let Some(transform) = options.transform {
        widget.restore_viewport(transform);
    }
    for gesture in &options.gestures {
        widget.handle_gesture(*gesture);
    }
    Ok(widget.scene())
}
