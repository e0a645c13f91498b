use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    /// Point size used for every label on the card.
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub node_color: String,
    pub muted_node_color: String,
    pub target_color: String,
    pub trilateration_color: String,
    pub bounding_box_color: String,
    pub error_color: String,
    pub spoke_color: String,
    pub centre_color: String,
    /// Upper bounds for the radial distance colour bands, in reading units.
    pub distance_thresholds: Vec<f32>,
    /// One more entry than `distance_thresholds`; the last colour covers
    /// everything beyond the final threshold.
    pub distance_colors: Vec<String>,
}

impl Theme {
    pub fn home_assistant() -> Self {
        Self {
            font_family: "Roboto, Noto, sans-serif".to_string(),
            font_size: 10.0,
            background: "#FFFFFF".to_string(),
            text_color: "#212121".to_string(),
            node_color: "#727272".to_string(),
            muted_node_color: "#BDBDBD".to_string(),
            target_color: "#03A9F4".to_string(),
            trilateration_color: "#43A047".to_string(),
            bounding_box_color: "#E0E0E0".to_string(),
            error_color: "#DB4437".to_string(),
            spoke_color: "grey".to_string(),
            centre_color: "lightblue".to_string(),
            distance_thresholds: default_thresholds(),
            distance_colors: default_distance_colors(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Roboto, Noto, sans-serif".to_string(),
            font_size: 10.0,
            background: "#1C1C1C".to_string(),
            text_color: "#E1E1E1".to_string(),
            node_color: "#9B9B9B".to_string(),
            muted_node_color: "#4A4A4A".to_string(),
            target_color: "#03A9F4".to_string(),
            trilateration_color: "#43A047".to_string(),
            bounding_box_color: "rgba(225, 225, 225, 0.12)".to_string(),
            error_color: "#EF5350".to_string(),
            spoke_color: "#6F6F6F".to_string(),
            centre_color: "#4FC3F7".to_string(),
            distance_thresholds: default_thresholds(),
            distance_colors: default_distance_colors(),
        }
    }

    /// Colours that defer to the host dashboard's CSS custom properties.
    /// Only meaningful for SVG embedded in a page; rasterizers fall back to black.
    pub fn css_variables() -> Self {
        Self {
            font_family: "var(--paper-font-body1_-_font-family, Roboto, sans-serif)".to_string(),
            font_size: 10.0,
            background: "var(--ha-card-background, var(--card-background-color, white))"
                .to_string(),
            text_color: "var(--primary-text-color)".to_string(),
            node_color: "var(--secondary-text-color)".to_string(),
            muted_node_color: "var(--disabled-text-color)".to_string(),
            target_color: "var(--primary-color)".to_string(),
            trilateration_color: "var(--success-color)".to_string(),
            bounding_box_color: "var(--divider-color)".to_string(),
            error_color: "var(--error-color, red)".to_string(),
            spoke_color: "var(--secondary-text-color)".to_string(),
            centre_color: "var(--primary-color)".to_string(),
            distance_thresholds: default_thresholds(),
            distance_colors: default_distance_colors(),
        }
    }

    /// Threshold colour scale: the first band whose bound exceeds the reading.
    pub fn distance_color(&self, distance: f32) -> &str {
        let idx = self
            .distance_thresholds
            .iter()
            .position(|bound| distance < *bound)
            .unwrap_or(self.distance_thresholds.len());
        self.distance_colors
            .get(idx)
            .or_else(|| self.distance_colors.last())
            .map(String::as_str)
            .unwrap_or(self.node_color.as_str())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::home_assistant()
    }
}

fn default_thresholds() -> Vec<f32> {
    vec![3.0, 15.0, 50.0, 100.0]
}

fn default_distance_colors() -> Vec<String> {
    ["lightgreen", "yellow", "orange", "red", "grey"]
        .iter()
        .map(|value| value.to_string())
        .collect()
}
