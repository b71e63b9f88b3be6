use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lineal_core::{ElementId, ElementTree, SceneFile};
use lineal_render::{InputEvent, RecordingRenderer, RenderCommand};
use lineal_runtime::LinealApp;

#[derive(Debug, Clone, ValueEnum)]
enum Format {
    Tree,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the .json scene to lay out
    #[arg(value_name = "FILE")]
    scene_file: String,

    /// Viewport width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Override the scene's content scale
    #[arg(long)]
    scale: Option<f32>,

    /// Output format
    #[arg(long, value_enum, default_value = "tree")]
    format: Format,

    /// Also print the draw commands of one frame
    #[arg(long)]
    commands: bool,

    /// Replay a pointer move to this position and print the notifications, as "x,y"
    #[arg(long, value_parser = parse_point)]
    pointer: Option<Vec2>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.debug { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if !Path::new(&args.scene_file).exists() {
        anyhow::bail!("Scene file not found: {}", args.scene_file);
    }
    if !args.scene_file.ends_with(".json") {
        warn!("File doesn't have .json extension: {}", args.scene_file);
    }

    info!("Loading scene: {}", args.scene_file);
    let source = fs::read_to_string(&args.scene_file)
        .with_context(|| format!("Failed to read {}", args.scene_file))?;
    let mut scene: SceneFile = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse scene {}", args.scene_file))?;
    if let Some(scale) = args.scale {
        scene.config.content_scale = scale;
    }

    let viewport = Vec2::new(args.width as f32, args.height as f32);
    let mut app = LinealApp::from_scene(&scene, RecordingRenderer::new(viewport))?;
    info!("Laid out {} elements in a {}x{} viewport", app.tree().len(), args.width, args.height);

    let output = match args.format {
        Format::Tree => {
            let mut output = String::new();
            write_tree(&mut output, app.tree(), app.root(), 0)?;
            output
        }
        Format::Json => {
            let value = json_tree(app.tree(), app.root())?;
            serde_json::to_string_pretty(&value).context("Failed to serialize layout")?
        }
    };
    print!("{}", output);

    if args.commands {
        app.render()?;
        println!();
        for command in app.renderer().backend().last_frame() {
            println!("{}", describe_command(command));
        }
    }

    if let Some(position) = args.pointer {
        app.handle_input(InputEvent::MouseMove { position })?;
        println!();
        for event in app.drain_pointer_events() {
            let name = app.tree().get(event.target).map(|e| e.name.clone()).unwrap_or_default();
            println!(
                "{:?} {} {} local=({:.1}, {:.1})",
                event.kind, event.target, name, event.local.x, event.local.y
            );
        }
    }

    Ok(())
}

fn parse_point(value: &str) -> std::result::Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{value}\""))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Vec2::new(x, y))
}

fn write_tree(output: &mut String, tree: &ElementTree, id: ElementId, depth: usize) -> Result<()> {
    let element = tree
        .get(id)
        .with_context(|| format!("Element {} missing from tree", id))?;
    let bounds = element.bounds;
    let label = if element.name.is_empty() { "-" } else { element.name.as_str() };
    writeln!(
        output,
        "{}{} {} pos=({:.1}, {:.1}) size=({:.1}, {:.1}){}",
        "  ".repeat(depth),
        id,
        label,
        bounds.position.x,
        bounds.position.y,
        bounds.size.x,
        bounds.size.y,
        if element.enabled { "" } else { " [disabled]" }
    )?;
    for &child in &element.children {
        write_tree(output, tree, child, depth + 1)?;
    }
    Ok(())
}

fn json_tree(tree: &ElementTree, id: ElementId) -> Result<serde_json::Value> {
    let element = tree
        .get(id)
        .with_context(|| format!("Element {} missing from tree", id))?;
    let children = element
        .children
        .iter()
        .map(|&child| json_tree(tree, child))
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::json!({
        "id": id.0,
        "name": element.name,
        "enabled": element.enabled,
        "position": [element.bounds.position.x, element.bounds.position.y],
        "size": [element.bounds.size.x, element.bounds.size.y],
        "content_size": [element.content_size.x, element.content_size.y],
        "children": children,
    }))
}

fn describe_command(command: &RenderCommand) -> String {
    match command {
        RenderCommand::DrawRect { position, size, color } => format!(
            "rect ({:.1}, {:.1}) {:.1}x{:.1} rgba({:.2}, {:.2}, {:.2}, {:.2})",
            position.x, position.y, size.x, size.y, color.x, color.y, color.z, color.w
        ),
        RenderCommand::SetClip { position, size } => format!(
            "clip ({:.1}, {:.1}) {:.1}x{:.1}",
            position.x, position.y, size.x, size.y
        ),
        RenderCommand::ClearClip => "clear-clip".to_string(),
    }
}
