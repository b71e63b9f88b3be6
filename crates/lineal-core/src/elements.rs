// crates/lineal-core/src/elements.rs
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use glam::{Vec2, Vec4};
use tracing::debug;

use crate::{
    Alignment, Arrangement, Axis, ContainerSizing, Dimension2, ElementLayout, LinealError, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Absolute pixel bounds of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.size.x
            && point.y >= self.position.y
            && point.y <= self.position.y + self.size.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.position.x + self.size.x < other.position.x
            || other.position.x + other.size.x < self.position.x
            || self.position.y + self.size.y < other.position.y
            || other.position.y + other.size.y < self.position.y)
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::from_position_size(self.position + offset, self.size)
    }

    pub fn min(&self) -> Vec2 {
        self.position
    }

    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Start of the bounds along `axis`.
    pub fn start(&self, axis: Axis) -> f32 {
        axis.of(self.position)
    }

    /// End of the bounds along `axis`.
    pub fn end(&self, axis: Axis) -> f32 {
        axis.of(self.position) + axis.of(self.size)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.size.is_finite()
    }
}

bitflags! {
    /// Invalidation state. Flags only ever travel upward, from an element to its ancestors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u8 {
        /// This element's own layout inputs changed.
        const LAYOUT = 0b0001;
        /// A descendant's layout inputs changed.
        const CHILD_LAYOUT = 0b0010;
        /// Only visuals changed; bounds are still valid.
        const REDRAW = 0b0100;
    }
}

/// What a measured leaf is asked to fit in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureInput {
    /// The element's own resolved size from its layout.
    pub available: Vec2,
    pub max: Vec2,
    pub enforced_width: Option<f32>,
    pub enforced_height: Option<f32>,
}

/// Intrinsic-size callback for leaves whose size depends on content (text, images).
///
/// Implementations should return the enforced dimension when one is given; the parent logs a
/// warning and carries on when they don't.
#[derive(Clone)]
pub struct MeasureFn(Arc<dyn Fn(&MeasureInput) -> Vec2 + Send + Sync>);

impl MeasureFn {
    pub fn new(f: impl Fn(&MeasureInput) -> Vec2 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn measure(&self, input: &MeasureInput) -> Vec2 {
        (self.0)(input)
    }
}

impl fmt::Debug for MeasureFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MeasureFn(..)")
    }
}

/// Binary-search cache used for pointer dispatch inside a linear container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitCursor {
    pub last_checked_index: usize,
    pub last_pointer_position: Vec2,
}

/// A row (horizontal) or column (vertical) container.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearContainer {
    pub orientation: Axis,
    pub arrangement: Arrangement,
    /// Cross-axis alignment for children without their own override.
    pub preferred_alignment: Alignment,
    placed: Vec<ElementId>,
    cursor: HitCursor,
}

impl LinearContainer {
    pub fn new(orientation: Axis, arrangement: Arrangement) -> Self {
        Self {
            orientation,
            arrangement,
            preferred_alignment: Alignment::Start,
            placed: Vec::new(),
            cursor: HitCursor::default(),
        }
    }

    /// Children that received bounds in the last pass, in main-axis order.
    pub fn placed(&self) -> &[ElementId] {
        &self.placed
    }

    pub fn set_placed(&mut self, placed: Vec<ElementId>) {
        self.placed = placed;
    }

    pub fn cursor(&self) -> HitCursor {
        self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut HitCursor {
        &mut self.cursor
    }
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Stacks its children at its own origin, each offset by its `position`.
    Plain,
    /// Arranges its children along one axis.
    Linear(LinearContainer),
    /// A leaf whose size comes from a [`MeasureFn`].
    Measured(MeasureFn),
}

impl ElementKind {
    pub fn as_linear(&self) -> Option<&LinearContainer> {
        match self {
            ElementKind::Linear(linear) => Some(linear),
            _ => None,
        }
    }

    pub fn as_linear_mut(&mut self) -> Option<&mut LinearContainer> {
        match self {
            ElementKind::Linear(linear) => Some(linear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub kind: ElementKind,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,

    // Layout inputs
    pub layout: ElementLayout,
    pub position: Dimension2,
    pub container_sizing: Option<ContainerSizing>,
    pub enabled: bool,

    // Layout outputs
    pub bounds: Rect,
    /// Size of the laid-out children of a linear container before clamping to its own limits.
    pub content_size: Vec2,

    // Visual properties
    pub background_color: Vec4,
    pub visible: bool,
    pub clip_children: bool,

    // Interaction
    pub pointer_inside: bool,
    pub dirty: DirtyFlags,
}

impl Default for Element {
    fn default() -> Self {
        Self::new(ElementKind::Plain)
    }
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            name: String::new(),
            kind,
            parent: None,
            children: Vec::new(),
            layout: ElementLayout::default(),
            position: Dimension2::UNSET,
            container_sizing: None,
            enabled: true,
            bounds: Rect::default(),
            content_size: Vec2::ZERO,
            background_color: Vec4::ZERO,
            visible: true,
            clip_children: false,
            pointer_inside: false,
            dirty: DirtyFlags::LAYOUT,
        }
    }

    pub fn plain() -> Self {
        Self::new(ElementKind::Plain)
    }

    pub fn row(arrangement: Arrangement) -> Self {
        Self::new(ElementKind::Linear(LinearContainer::new(Axis::Horizontal, arrangement)))
    }

    pub fn column(arrangement: Arrangement) -> Self {
        Self::new(ElementKind::Linear(LinearContainer::new(Axis::Vertical, arrangement)))
    }

    pub fn measured(measure: MeasureFn) -> Self {
        Self::new(ElementKind::Measured(measure))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_layout(mut self, layout: ElementLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_sizing(mut self, sizing: ContainerSizing) -> Self {
        self.container_sizing = Some(sizing);
        self
    }

    pub fn with_position(mut self, position: Dimension2) -> Self {
        self.position = position;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_background(mut self, color: Vec4) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_clip(mut self, clip_children: bool) -> Self {
        self.clip_children = clip_children;
        self
    }

    /// Preferred cross-axis alignment; only meaningful for linear containers.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        if let Some(linear) = self.kind.as_linear_mut() {
            linear.preferred_alignment = alignment;
        }
        self
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Linear(_))
    }
}

/// Arena owning every element, keyed by [`ElementId`].
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    elements: HashMap<ElementId, Element>,
    next_id: u32,
    root: Option<ElementId>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;

        let mut element = element;
        element.parent = None;
        element.children.clear();
        element.dirty |= DirtyFlags::LAYOUT;
        self.elements.insert(id, element);
        id
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn set_root(&mut self, id: ElementId) -> Result<()> {
        self.ensure(id)?;
        self.root = Some(id);
        self.mark_layout_dirty(id);
        Ok(())
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Direct access for layout output and interaction state. Use the `set_*` methods for layout
    /// inputs so invalidation is recorded.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.elements.get(&id).ok_or(LinealError::ElementNotFound(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements.get_mut(&id).ok_or(LinealError::ElementNotFound(id))
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(&id)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    pub fn find_by_name(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, element)| element.name == name)
            .map(|(id, _)| *id)
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.ensure(parent)?;
        let child_element = self.element_mut(child)?;
        if child_element.parent.is_some() {
            return Err(LinealError::AlreadyParented { child });
        }
        child_element.parent = Some(parent);
        self.element_mut(parent)?.children.push(child);
        self.mark_layout_dirty(parent);
        Ok(())
    }

    /// Detach and drop `id` together with its whole subtree.
    pub fn remove(&mut self, id: ElementId) -> Result<Element> {
        let parent = self.element(id)?.parent;
        if let Some(parent) = parent {
            if let Some(parent_element) = self.elements.get_mut(&parent) {
                parent_element.children.retain(|&c| c != id);
            }
            self.mark_layout_dirty(parent);
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut stack = self.children(id).to_vec();
        while let Some(next) = stack.pop() {
            if let Some(removed) = self.elements.remove(&next) {
                stack.extend(removed.children);
            }
        }
        debug!("Removed element {} and its subtree", id);
        self.elements
            .remove(&id)
            .ok_or(LinealError::ElementNotFound(id))
    }

    pub fn set_layout(&mut self, id: ElementId, layout: ElementLayout) -> Result<()> {
        self.element_mut(id)?.layout = layout;
        self.mark_layout_dirty(id);
        Ok(())
    }

    /// Edit the layout in place; invalidation is recorded afterwards.
    pub fn update_layout(&mut self, id: ElementId, f: impl FnOnce(&mut ElementLayout)) -> Result<()> {
        f(&mut self.element_mut(id)?.layout);
        self.mark_layout_dirty(id);
        Ok(())
    }

    pub fn set_enabled(&mut self, id: ElementId, enabled: bool) -> Result<()> {
        let element = self.element_mut(id)?;
        if element.enabled == enabled {
            return Ok(());
        }
        element.enabled = enabled;
        self.mark_layout_dirty(id);
        Ok(())
    }

    pub fn set_container_sizing(
        &mut self,
        id: ElementId,
        sizing: Option<ContainerSizing>,
    ) -> Result<()> {
        let sizing = sizing.map(ContainerSizing::validate).transpose()?;
        self.element_mut(id)?.container_sizing = sizing;
        self.mark_layout_dirty(id);
        Ok(())
    }

    pub fn set_position(&mut self, id: ElementId, position: Dimension2) -> Result<()> {
        self.element_mut(id)?.position = position;
        self.mark_layout_dirty(id);
        Ok(())
    }

    pub fn set_arrangement(&mut self, id: ElementId, arrangement: Arrangement) -> Result<()> {
        let linear = self
            .element_mut(id)?
            .kind
            .as_linear_mut()
            .ok_or(LinealError::NotAContainer(id))?;
        linear.arrangement = arrangement;
        self.mark_layout_dirty(id);
        Ok(())
    }

    pub fn set_preferred_alignment(&mut self, id: ElementId, alignment: Alignment) -> Result<()> {
        let linear = self
            .element_mut(id)?
            .kind
            .as_linear_mut()
            .ok_or(LinealError::NotAContainer(id))?;
        linear.preferred_alignment = alignment;
        self.mark_layout_dirty(id);
        Ok(())
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        let element = self.element_mut(id)?;
        element.visible = visible;
        element.dirty |= DirtyFlags::REDRAW;
        Ok(())
    }

    pub fn set_background(&mut self, id: ElementId, color: Vec4) -> Result<()> {
        let element = self.element_mut(id)?;
        element.background_color = color;
        element.dirty |= DirtyFlags::REDRAW;
        Ok(())
    }

    /// Flag `id` and tell its ancestors that something below them changed.
    ///
    /// Only flags are set here; nothing is recomputed, so a notification can never re-enter layout.
    pub fn mark_layout_dirty(&mut self, id: ElementId) {
        let mut parent = match self.elements.get_mut(&id) {
            Some(element) => {
                element.dirty |= DirtyFlags::LAYOUT;
                element.parent
            }
            None => return,
        };

        while let Some(current) = parent {
            let Some(element) = self.elements.get_mut(&current) else {
                break;
            };
            if element.dirty.contains(DirtyFlags::CHILD_LAYOUT) {
                break;
            }
            element.dirty |= DirtyFlags::CHILD_LAYOUT;
            parent = element.parent;
        }
    }

    /// True when anything reachable from the root needs a layout pass.
    pub fn needs_layout(&self) -> bool {
        self.root
            .and_then(|root| self.elements.get(&root))
            .map(|root| root.dirty.intersects(DirtyFlags::LAYOUT | DirtyFlags::CHILD_LAYOUT))
            .unwrap_or(false)
    }

    pub fn needs_redraw(&self) -> bool {
        self.elements
            .values()
            .any(|element| element.dirty.contains(DirtyFlags::REDRAW))
    }

    pub fn clear_layout_dirty(&mut self) {
        for element in self.elements.values_mut() {
            element.dirty.remove(DirtyFlags::LAYOUT | DirtyFlags::CHILD_LAYOUT);
        }
    }

    pub fn clear_redraw(&mut self) {
        for element in self.elements.values_mut() {
            element.dirty.remove(DirtyFlags::REDRAW);
        }
    }

    /// Shift the bounds of every enabled descendant of `id` (not `id` itself) by `offset`.
    ///
    /// Disabled subtrees are left alone: they were not laid out, so their bounds are not relative
    /// to anything this pass produced.
    pub fn translate_descendants(&mut self, id: ElementId, offset: Vec2) {
        if offset == Vec2::ZERO {
            return;
        }
        let mut stack = self.children(id).to_vec();
        while let Some(next) = stack.pop() {
            if let Some(element) = self.elements.get_mut(&next) {
                if !element.enabled {
                    continue;
                }
                element.bounds = element.bounds.translated(offset);
                stack.extend(element.children.iter().copied());
            }
        }
    }

    fn ensure(&self, id: ElementId) -> Result<()> {
        self.element(id).map(|_| ())
    }
}
