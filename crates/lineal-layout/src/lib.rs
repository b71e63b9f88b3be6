// crates/lineal-layout/src/lib.rs

use glam::Vec2;
use lineal_core::{
    ElementId, ElementKind, ElementTree, MeasureInput, Rect, ResolveContext, Result,
};
use tracing::{debug, trace, warn};

pub mod constraints;
pub mod hit_test;
mod linear;

pub use constraints::*;
pub use hit_test::*;

pub trait LayoutEngine {
    /// Lay out the tree under `root` inside a viewport of the given size. Returns the root's size.
    fn compute_layout(
        &mut self,
        tree: &mut ElementTree,
        root: ElementId,
        viewport_size: Vec2,
        ctx: &ResolveContext,
    ) -> Result<Vec2>;
}

#[derive(Debug, Default)]
pub struct LinearLayoutEngine {
    debug: bool,
    passes: u64,
}

impl LinearLayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Number of completed layout passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl LayoutEngine for LinearLayoutEngine {
    fn compute_layout(
        &mut self,
        tree: &mut ElementTree,
        root: ElementId,
        viewport_size: Vec2,
        ctx: &ResolveContext,
    ) -> Result<Vec2> {
        let size = recompute_layout(
            tree,
            root,
            ConstraintBox::viewport(viewport_size),
            Vec2::ZERO,
            ctx,
        )?;
        self.passes += 1;

        if self.debug {
            debug!(
                "Layout pass {} finished: viewport={:?}, root size={:?}",
                self.passes, viewport_size, size
            );
        }
        Ok(size)
    }
}

/// Lay out `id` and its subtree, writing absolute bounds into the tree.
///
/// `parent_position` is the parent's absolute top-left corner; the element's own `position` is
/// added to it. Returns the size the element actually took, which may differ from what the
/// constraints asked for when it ignores an enforced dimension.
pub fn recompute_layout(
    tree: &mut ElementTree,
    id: ElementId,
    constraints: ConstraintBox,
    parent_position: Vec2,
    ctx: &ResolveContext,
) -> Result<Vec2> {
    let element = tree.element(id)?;
    let origin = absolute_position(&element.position, parent_position, constraints.size, ctx);
    layout_at(tree, id, constraints, origin, ctx)
}

/// Same as [`recompute_layout`], but with the element's absolute corner already decided.
pub(crate) fn layout_at(
    tree: &mut ElementTree,
    id: ElementId,
    constraints: ConstraintBox,
    origin: Vec2,
    ctx: &ResolveContext,
) -> Result<Vec2> {
    let element = tree.element(id)?;
    match &element.kind {
        ElementKind::Linear(_) => linear::layout_linear(tree, id, constraints, origin, ctx),
        ElementKind::Measured(measure) => {
            let measure = measure.clone();
            let (size, max) = own_size(tree, id, &constraints, ctx)?;
            let input = MeasureInput {
                available: size,
                max,
                enforced_width: constraints.enforced_width,
                enforced_height: constraints.enforced_height,
            };
            let measured = measure.measure(&input);
            if !measured.is_finite() {
                warn!("Element {} measured a non-finite size {:?}", id, measured);
            }

            let element = tree.element_mut(id)?;
            element.bounds = Rect::from_position_size(origin, measured);
            trace!("Measured {} at {:?}: {:?}", id, origin, measured);
            Ok(measured)
        }
        ElementKind::Plain => {
            let (size, max) = own_size(tree, id, &constraints, ctx)?;
            let children: Vec<ElementId> = tree.children(id).to_vec();
            for child in children {
                if !tree.element(child)?.enabled {
                    continue;
                }
                recompute_layout(tree, child, ConstraintBox::new(size, max), origin, ctx)?;
            }

            tree.element_mut(id)?.bounds = Rect::from_position_size(origin, size);
            Ok(size)
        }
    }
}

/// The element's direct size and max size, with enforced dimensions applied to both.
pub(crate) fn own_size(
    tree: &ElementTree,
    id: ElementId,
    constraints: &ConstraintBox,
    ctx: &ResolveContext,
) -> Result<(Vec2, Vec2)> {
    let element = tree.element(id)?;
    let size = direct_size(&element.layout, &element.position, constraints, ctx);
    let max = max_size(&element.layout, constraints.size, ctx);
    Ok((constraints.apply_enforced(size), constraints.apply_enforced(max)))
}
