use serde::Deserialize;
use trilateration_renderer::viewport::ViewportTransform;
use trilateration_renderer::{Gesture, RenderOptions, render_with_options};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    /// Transform persisted by the host from the previous widget instance.
    transform: Option<ViewportTransform>,
    #[serde(default)]
    gestures: Vec<Gesture>,
}

fn build_render_options(options: CardRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("dark") {
        RenderOptions::dark()
    } else {
        RenderOptions::home_assistant()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    render_options.transform = options.transform;
    render_options.gestures = options.gestures;

    render_options
}

#[wasm_bindgen]
pub fn render_card_svg(card: &str, states: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<CardRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        CardRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(card, states, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}
