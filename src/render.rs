use crate::config::RenderConfig;
use crate::layout::{Header, InfoLine, Primitive, Scene, Shape};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Height of one header or footer row, in multiples of the label font size.
const ROW_HEIGHT: f32 = 2.0;
const TITLE_SCALE: f32 = 1.6;
const CARD_PADDING: f32 = 16.0;

pub fn render_svg(scene: &Scene, theme: &Theme) -> String {
    let mut svg = String::new();
    let row = theme.font_size * ROW_HEIGHT;
    let header_height = scene.header.as_ref().map_or(0.0, |header| {
        header_rows(header) as f32 * row * TITLE_SCALE + CARD_PADDING
    });
    let footer_height = if scene.footer.is_empty() {
        0.0
    } else {
        scene.footer.len() as f32 * row + CARD_PADDING / 2.0
    };
    let width = scene.width.max(1.0);
    let height = header_height + scene.height.max(1.0) + footer_height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<defs><clipPath id=\"map-clip\"><rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\"/></clipPath></defs>",
        scene.width, scene.height
    ));

    if let Some(header) = &scene.header {
        svg.push_str(&header_svg(header, width, theme));
    }

    // The viewport group is the only place the pan/zoom transform is applied.
    svg.push_str(&format!(
        "<g class=\"map\" transform=\"translate(0, {header_height:.2})\" clip-path=\"url(#map-clip)\">"
    ));
    svg.push_str(&format!(
        "<g class=\"viewport\" transform=\"{}\">",
        scene.transform.to_svg()
    ));
    for primitive in &scene.primitives {
        svg.push_str(&primitive_svg(primitive, theme));
    }
    svg.push_str("</g></g>");

    if !scene.footer.is_empty() {
        let top = header_height + scene.height;
        svg.push_str(&footer_svg(&scene.footer, top, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn header_rows(header: &Header) -> usize {
    [
        header.title.is_some(),
        header.subtitle.is_some(),
        header.zoom_label.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count()
}

fn header_svg(header: &Header, width: f32, theme: &Theme) -> String {
    let mut out = String::from("<g class=\"header\">");
    let row = theme.font_size * ROW_HEIGHT * TITLE_SCALE;
    let mut y = CARD_PADDING / 2.0;
    if let Some(title) = &header.title {
        y += row;
        out.push_str(&label_svg(
            "title",
            CARD_PADDING,
            y,
            "start",
            theme.font_size * TITLE_SCALE,
            &theme.text_color,
            title,
            theme,
        ));
    }
    if let Some(subtitle) = &header.subtitle {
        y += row;
        out.push_str(&label_svg(
            "subtitle",
            CARD_PADDING,
            y,
            "start",
            theme.font_size * 1.2,
            &theme.text_color,
            subtitle,
            theme,
        ));
    }
    if let Some(zoom) = &header.zoom_label {
        y += row;
        out.push_str(&label_svg(
            "zoom-label",
            width - CARD_PADDING,
            y,
            "end",
            theme.font_size,
            &theme.text_color,
            zoom,
            theme,
        ));
    }
    out.push_str("</g>");
    out
}

fn footer_svg(lines: &[InfoLine], top: f32, theme: &Theme) -> String {
    let mut out = String::from("<g class=\"footer\">");
    let row = theme.font_size * ROW_HEIGHT;
    for (idx, line) in lines.iter().enumerate() {
        let y = top + row * (idx + 1) as f32;
        let fill = if line.missing {
            &theme.error_color
        } else {
            &theme.text_color
        };
        out.push_str(&format!(
            "<text class=\"info-entity\" data-entity=\"{}\" x=\"{CARD_PADDING:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{fill}\">{}</text>",
            escape_xml(&line.entity),
            theme.font_family,
            theme.font_size,
            escape_xml(&line.text)
        ));
    }
    out.push_str("</g>");
    out
}

#[allow(clippy::too_many_arguments)]
fn label_svg(
    class: &str,
    x: f32,
    y: f32,
    anchor: &str,
    font_size: f32,
    fill: &str,
    text: &str,
    theme: &Theme,
) -> String {
    format!(
        "<text class=\"{class}\" x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{fill}\">{}</text>",
        theme.font_family,
        escape_xml(text)
    )
}

fn primitive_svg(primitive: &Primitive, theme: &Theme) -> String {
    let mut attrs = format!("class=\"{}\"", primitive.role.class_name());
    if let Some(entity) = &primitive.entity {
        attrs.push_str(&format!(" data-entity=\"{}\"", escape_xml(entity)));
    }
    let paint = &primitive.paint;
    let fill = paint.fill.as_deref().unwrap_or("none");
    match &paint.stroke {
        Some(stroke) => attrs.push_str(&format!(
            " fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{}\"",
            paint.stroke_width
        )),
        None => attrs.push_str(&format!(" fill=\"{fill}\"")),
    }

    match &primitive.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => format!(
            "<rect {attrs} x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\"/>"
        ),
        Shape::Circle { center, radius } => format!(
            "<circle {attrs} cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius:.2}\"/>",
            center.x, center.y
        ),
        Shape::Line { from, to } => format!(
            "<line {attrs} x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>",
            from.x, from.y, to.x, to.y
        ),
        Shape::Polygon { points } => {
            let list = points
                .iter()
                .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(" ");
            format!("<polygon {attrs} points=\"{list}\"/>")
        }
        Shape::Text {
            position,
            text,
            anchor,
            font_size,
        } => format!(
            "<text {attrs} x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{font_size}\">{}</text>",
            position.x,
            position.y,
            anchor.as_str(),
            theme.font_family,
            escape_xml(text)
        ),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
