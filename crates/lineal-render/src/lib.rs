// crates/lineal-render/src/lib.rs

use glam::{Vec2, Vec4};
use lineal_core::{ElementId, ElementKind, ElementTree, Rect};
use tracing::debug;

pub mod dispatch;
pub mod events;

pub use dispatch::*;
pub use events::*;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Core rendering trait that all backends must implement
pub trait Renderer {
    type Context;

    /// Begin a new frame
    fn begin_frame(&mut self, clear_color: Vec4) -> RenderResult<Self::Context>;

    /// End the current frame and present it
    fn end_frame(&mut self, context: Self::Context) -> RenderResult<()>;

    /// Handle window resize
    fn resize(&mut self, new_size: Vec2) -> RenderResult<()>;

    /// Get current viewport size
    fn viewport_size(&self) -> Vec2;
}

/// High-level rendering commands
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    DrawRect {
        position: Vec2,
        size: Vec2,
        color: Vec4,
    },
    SetClip {
        position: Vec2,
        size: Vec2,
    },
    ClearClip,
}

/// Trait for backends that use command-based rendering
pub trait CommandRenderer: Renderer {
    /// Execute a batch of render commands
    fn execute_commands(
        &mut self,
        context: &mut Self::Context,
        commands: &[RenderCommand],
    ) -> RenderResult<()>;
}

/// Backend that keeps the commands of the last frame in memory.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    viewport_size: Vec2,
    last_frame: Vec<RenderCommand>,
    frames: u64,
}

impl RecordingRenderer {
    pub fn new(viewport_size: Vec2) -> Self {
        Self {
            viewport_size,
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> &[RenderCommand] {
        &self.last_frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for RecordingRenderer {
    type Context = Vec<RenderCommand>;

    fn begin_frame(&mut self, _clear_color: Vec4) -> RenderResult<Self::Context> {
        Ok(Vec::new())
    }

    fn end_frame(&mut self, context: Self::Context) -> RenderResult<()> {
        self.last_frame = context;
        self.frames += 1;
        Ok(())
    }

    fn resize(&mut self, new_size: Vec2) -> RenderResult<()> {
        self.viewport_size = new_size;
        Ok(())
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }
}

impl CommandRenderer for RecordingRenderer {
    fn execute_commands(
        &mut self,
        context: &mut Self::Context,
        commands: &[RenderCommand],
    ) -> RenderResult<()> {
        context.extend_from_slice(commands);
        Ok(())
    }
}

/// High-level renderer that converts elements to commands
pub struct ElementRenderer<R: CommandRenderer> {
    backend: R,
    viewport_size: Vec2,
}

impl<R: CommandRenderer> ElementRenderer<R> {
    pub fn new(backend: R) -> Self {
        let viewport_size = backend.viewport_size();
        Self {
            backend,
            viewport_size,
        }
    }

    pub fn render_frame(
        &mut self,
        tree: &ElementTree,
        root_id: ElementId,
        clear_color: Vec4,
    ) -> RenderResult<()> {
        let commands = collect_commands(tree, root_id, self.viewport_size)?;
        debug!("Rendering frame with {} commands", commands.len());

        let mut context = self.backend.begin_frame(clear_color)?;
        self.backend.execute_commands(&mut context, &commands)?;
        self.backend.end_frame(context)?;
        Ok(())
    }

    pub fn resize(&mut self, new_size: Vec2) -> RenderResult<()> {
        self.viewport_size = new_size;
        self.backend.resize(new_size)
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }
}

/// Walk the tree under `root_id` in paint order and produce its draw list.
///
/// Invisible and disabled subtrees are skipped. Children of a linear container are visited in
/// placement order and the walk stops at the first one that starts past the viewport.
pub fn collect_commands(
    tree: &ElementTree,
    root_id: ElementId,
    viewport_size: Vec2,
) -> RenderResult<Vec<RenderCommand>> {
    let mut commands = Vec::new();
    let mut clips = Vec::new();
    draw_element(tree, root_id, viewport_size, &mut clips, &mut commands)?;
    Ok(commands)
}

fn draw_element(
    tree: &ElementTree,
    id: ElementId,
    viewport_size: Vec2,
    clips: &mut Vec<Rect>,
    commands: &mut Vec<RenderCommand>,
) -> RenderResult<()> {
    let element = tree.get(id).ok_or(RenderError::ElementNotFound(id))?;
    if !element.visible || !element.enabled {
        return Ok(());
    }

    let bounds = element.bounds;
    if element.background_color.w > 0.0 {
        commands.push(RenderCommand::DrawRect {
            position: bounds.position,
            size: bounds.size,
            color: element.background_color,
        });
    }

    if element.clip_children {
        let clip = clips
            .last()
            .map(|outer| intersect(outer, &bounds))
            .unwrap_or(bounds);
        commands.push(RenderCommand::SetClip {
            position: clip.position,
            size: clip.size,
        });
        clips.push(clip);
    }

    match &element.kind {
        ElementKind::Linear(linear) => {
            let limit = linear.orientation.of(viewport_size);
            let children = if linear.placed().is_empty() {
                element.children.as_slice()
            } else {
                linear.placed()
            };
            for &child in children {
                let start = tree
                    .get(child)
                    .map(|c| c.bounds.start(linear.orientation))
                    .ok_or(RenderError::ElementNotFound(child))?;
                if start > limit {
                    break;
                }
                draw_element(tree, child, viewport_size, clips, commands)?;
            }
        }
        _ => {
            for &child in &element.children {
                draw_element(tree, child, viewport_size, clips, commands)?;
            }
        }
    }

    if element.clip_children {
        clips.pop();
        match clips.last() {
            Some(outer) => commands.push(RenderCommand::SetClip {
                position: outer.position,
                size: outer.size,
            }),
            None => commands.push(RenderCommand::ClearClip),
        }
    }
    Ok(())
}

fn intersect(a: &Rect, b: &Rect) -> Rect {
    let min = a.min().max(b.min());
    let max = a.max().min(b.max());
    Rect::from_position_size(min, (max - min).max(Vec2::ZERO))
}
