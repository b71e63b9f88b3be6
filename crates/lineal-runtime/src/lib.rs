// crates/lineal-runtime/src/lib.rs

use std::time::{Duration, Instant};

use anyhow::Context;
use glam::{Vec2, Vec4};
use lineal_core::{ElementId, ElementTree, LayoutConfig, SceneFile};
use lineal_layout::{LayoutEngine, LinearLayoutEngine};
use lineal_render::{CommandRenderer, ElementRenderer, InputEvent, PointerDispatcher, PointerEvent};
use tracing::debug;

pub struct LinealApp<R: CommandRenderer> {
    // Core data
    tree: ElementTree,
    root: ElementId,
    config: LayoutConfig,

    // Systems
    layout_engine: Box<dyn LayoutEngine>,
    renderer: ElementRenderer<R>,
    dispatcher: PointerDispatcher,

    // State
    viewport_size: Vec2,
    needs_layout: bool,
    needs_render: bool,
    pending_events: Vec<PointerEvent>,

    // Timing
    last_frame_time: Instant,
    frame_count: u64,
}

impl<R: CommandRenderer> LinealApp<R> {
    pub fn new(tree: ElementTree, config: LayoutConfig, renderer: R) -> anyhow::Result<Self> {
        Self::new_with_layout_engine(tree, config, renderer, None)
    }

    pub fn from_scene(scene: &SceneFile, renderer: R) -> anyhow::Result<Self> {
        let tree = scene.build().context("Failed to build scene")?;
        Self::new(tree, scene.config, renderer)
    }

    pub fn new_with_layout_engine(
        tree: ElementTree,
        config: LayoutConfig,
        renderer: R,
        layout_engine: Option<Box<dyn LayoutEngine>>,
    ) -> anyhow::Result<Self> {
        let root = tree.root().context("Element tree has no root")?;
        let renderer = ElementRenderer::new(renderer);
        let viewport_size = renderer.viewport_size();
        let layout_engine =
            layout_engine.unwrap_or_else(|| Box::new(LinearLayoutEngine::new().with_debug(true)));

        let mut app = Self {
            tree,
            root,
            config,
            layout_engine,
            renderer,
            dispatcher: PointerDispatcher::new(),
            viewport_size,
            needs_layout: true,
            needs_render: true,
            pending_events: Vec::new(),
            last_frame_time: Instant::now(),
            frame_count: 0,
        };

        app.update_layout()?;
        Ok(app)
    }

    /// Run the layout pass if anything asked for one. At most one pass per call.
    pub fn update(&mut self, _delta_time: Duration) -> anyhow::Result<()> {
        if self.needs_layout || self.tree.needs_layout() {
            self.update_layout()?;
        }
        Ok(())
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        if !self.needs_render && !self.tree.needs_redraw() {
            return Ok(());
        }

        let clear_color = Vec4::new(0.1, 0.1, 0.1, 1.0);
        self.renderer
            .render_frame(&self.tree, self.root, clear_color)
            .context("Failed to render frame")?;
        self.tree.clear_redraw();
        self.needs_render = false;
        self.frame_count += 1;

        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;

        if self.frame_count % 60 == 0 {
            let fps = 1.0 / frame_time.as_secs_f32().max(f32::EPSILON);
            debug!("FPS: {:.1}", fps);
        }
        Ok(())
    }

    pub fn handle_input(&mut self, event: InputEvent) -> anyhow::Result<()> {
        match event {
            InputEvent::Resize { size } => {
                self.viewport_size = size;
                self.renderer.resize(size)?;
                self.tree.mark_layout_dirty(self.root);
                self.needs_layout = true;
            }
            _ => {
                let events = self.dispatcher.dispatch(&mut self.tree, &event);
                self.pending_events.extend(events);
            }
        }
        Ok(())
    }

    fn update_layout(&mut self) -> anyhow::Result<()> {
        let ctx = self.config.resolve_context(self.viewport_size);
        let size = self
            .layout_engine
            .compute_layout(&mut self.tree, self.root, self.viewport_size, &ctx)
            .context("Layout pass failed")?;
        debug!("Layout updated: viewport={:?}, root={:?}", self.viewport_size, size);

        self.tree.clear_layout_dirty();
        self.needs_layout = false;
        self.needs_render = true;
        Ok(())
    }

    /// Pointer notifications produced since the last call, oldest first.
    pub fn drain_pointer_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Mutate the tree through its setters; they record what needs a new pass.
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout || self.tree.needs_layout()
    }

    pub fn mark_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    pub fn mark_needs_render(&mut self) {
        self.needs_render = true;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn renderer(&self) -> &ElementRenderer<R> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut ElementRenderer<R> {
        &mut self.renderer
    }
}
