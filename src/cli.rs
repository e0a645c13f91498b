use crate::card::{Card, SvgSurface};
use crate::config::{CardConfig, load_config};
use crate::layout_dump::write_layout_dump;
use crate::render::{write_output_png, write_output_svg};
use crate::states::StateStore;
use crate::viewport::Gesture;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "trilat", version, about = "Render a trilateration card to SVG or PNG")]
pub struct Args {
    /// Card definition (JSON or JSON5)
    #[arg(short = 'c', long = "card")]
    pub card: PathBuf,

    /// Entity states (JSON list or map), or '-' for stdin
    #[arg(short = 's', long = "states")]
    pub states: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Tool config JSON file (theme, themeVariables, layout, estimator, viewport)
    #[arg(long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 800.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Gestures to replay before rendering: a JSON array, or a path to one
    #[arg(short = 'g', long = "gestures")]
    pub gestures: Option<String>,

    /// Write the computed scene as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    execute(&args)
}

pub fn execute(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let card = CardConfig::load(&args.card)?;
    let states = StateStore::from_json(&read_input(args.states.as_deref())?)?;
    let gestures = read_gestures(args.gestures.as_deref())?;
    tracing::debug!(
        entity = %card.entity,
        nodes = card.map.nodes.len(),
        states = states.len(),
        gestures = gestures.len(),
        "rendering card"
    );

    let mut widget = Card::new(card, &config, SvgSurface::new(config.theme.clone()));
    widget.update_states(states);
    for gesture in gestures {
        widget.handle_gesture(gesture);
    }

    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, &widget.scene())?;
    }

    widget.flush()?;
    let svg = widget
        .into_surface()
        .into_svg()
        .ok_or_else(|| anyhow::anyhow!("Card produced no output"))?;

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_gestures(source: Option<&str>) -> Result<Vec<Gesture>> {
    let Some(source) = source else {
        return Ok(Vec::new());
    };
    let trimmed = source.trim_start();
    let json = if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        std::fs::read_to_string(source)?
    };
    Ok(serde_json::from_str(&json)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("trilat-cli-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "trilat",
            "-c",
            "card.json5",
            "-s",
            "-",
            "-e",
            "png",
            "-o",
            "out.png",
            "--configFile",
            "tool.json",
            "-g",
            "[]",
            "--dumpLayout",
            "scene.json",
            "-v",
        ]);
        assert_eq!(args.card, PathBuf::from("card.json5"));
        assert_eq!(args.states, Some(PathBuf::from("-")));
        assert_eq!(args.output_format, OutputFormat::Png);
        assert_eq!(args.config, Some(PathBuf::from("tool.json")));
        assert_eq!(args.dump_layout, Some(PathBuf::from("scene.json")));
        assert!(args.verbose);
        assert_eq!(args.width, 800.0);
    }

    #[test]
    fn reads_inline_gestures() {
        let gestures = read_gestures(Some(
            r#"[{"type": "drag", "dx": 3, "dy": -1}, {"type": "zoom_in"}, {"type": "transform", "x": 1, "y": 2, "k": 3}]"#,
        ))
        .unwrap();
        assert_eq!(
            gestures,
            vec![
                Gesture::Drag { dx: 3.0, dy: -1.0 },
                Gesture::ZoomIn,
                Gesture::Transform {
                    x: 1.0,
                    y: 2.0,
                    k: 3.0
                },
            ]
        );
        assert!(read_gestures(None).unwrap().is_empty());
        assert!(read_gestures(Some(r#"[{"type": "spin"}]"#)).is_err());
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("a.png")), "png").unwrap(),
            PathBuf::from("a.png")
        );
    }

    #[test]
    fn renders_svg_and_dump_to_files() {
        let card = scratch(
            "card.json5",
            r#"{ entity: "device_tracker.phone", map: { nodes: [
                { name: "Hall", sensor_distance: "sensor.hall" },
            ] } }"#,
        );
        let states = scratch(
            "states.json",
            r#"{"device_tracker.phone": {"state": "home"}, "sensor.hall": {"state": "6"}}"#,
        );
        let output = std::env::temp_dir().join(format!("trilat-cli-{}-out.svg", std::process::id()));
        let dump = std::env::temp_dir().join(format!("trilat-cli-{}-dump.json", std::process::id()));
        let path = |p: &PathBuf| p.to_str().unwrap().to_string();
        let args = Args::parse_from([
            "trilat".to_string(),
            "-c".to_string(),
            path(&card),
            "-s".to_string(),
            path(&states),
            "-o".to_string(),
            path(&output),
            "--dumpLayout".to_string(),
            path(&dump),
            "-g".to_string(),
            r#"[{"type": "drag", "dx": 10, "dy": 0}]"#.to_string(),
        ]);
        execute(&args).unwrap();

        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains("translate(10, 0) scale(1)"));
        assert!(svg.contains(">6ft</text>"));
        let scene: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dump).unwrap()).unwrap();
        assert_eq!(scene["estimate"]["method"], "single");
        assert_eq!(scene["transform"]["x"], 10.0);

        for path in [card, states, output, dump] {
            let _ = std::fs::remove_file(path);
        }
    }
}
