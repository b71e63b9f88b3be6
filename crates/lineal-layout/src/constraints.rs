// crates/lineal-layout/src/constraints.rs

use glam::Vec2;
use lineal_core::{Axis, AxisLayout, Dimension, Dimension2, ElementLayout, LayoutMode, ResolveContext};

/// What a parent hands to a child when asking it to lay itself out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintBox {
    /// The parent's preferred size; percentages resolve against it.
    pub size: Vec2,
    /// The parent's max size. Offsets are subtracted before it limits a stretching child.
    pub max_size: Vec2,
    /// Widths and heights the child must take, regardless of its own layout.
    pub enforced_width: Option<f32>,
    pub enforced_height: Option<f32>,
}

impl ConstraintBox {
    pub fn new(size: Vec2, max_size: Vec2) -> Self {
        Self {
            size,
            max_size,
            enforced_width: None,
            enforced_height: None,
        }
    }

    /// Constraints for the root: the viewport is both the preferred and the max size.
    pub fn viewport(size: Vec2) -> Self {
        Self::new(size, size)
    }

    pub fn with_enforced(mut self, width: Option<f32>, height: Option<f32>) -> Self {
        self.enforced_width = width;
        self.enforced_height = height;
        self
    }

    /// Enforce `value` on `axis` only.
    pub fn with_enforced_axis(self, axis: Axis, value: f32) -> Self {
        let (width, height) = axis.enforce(value);
        self.with_enforced(width, height)
    }

    pub fn enforced(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::Horizontal => self.enforced_width,
            Axis::Vertical => self.enforced_height,
        }
    }

    pub fn is_enforced(&self) -> bool {
        self.enforced_width.is_some() || self.enforced_height.is_some()
    }

    /// Overwrite `size` with the enforced dimensions, axis by axis.
    pub fn apply_enforced(&self, size: Vec2) -> Vec2 {
        Vec2::new(
            self.enforced_width.unwrap_or(size.x),
            self.enforced_height.unwrap_or(size.y),
        )
    }
}

/// Resolved size an element asks for, given its parent's constraints.
///
/// `position` is the element's own offset; a stretching axis may not run past the parent's max.
pub fn direct_size(
    layout: &ElementLayout,
    position: &Dimension2,
    constraints: &ConstraintBox,
    ctx: &ResolveContext,
) -> Vec2 {
    let offset = position.resolve(constraints.size, ctx);
    let available = constraints.max_size - offset;

    Vec2::new(
        direct_axis(&layout.axis(Axis::Horizontal), constraints.size.x, available.x, ctx),
        direct_axis(&layout.axis(Axis::Vertical), constraints.size.y, available.y, ctx),
    )
}

fn direct_axis(axis: &AxisLayout, reference: f32, available: f32, ctx: &ResolveContext) -> f32 {
    let resolve = |dim: Option<Dimension>| Dimension::resolve_opt(dim, reference, ctx);

    match axis.mode {
        LayoutMode::Fixed => resolve(axis.preferred),
        LayoutMode::MinMax if axis.prefers_max => {
            let stretched = resolve(axis.suggested()).min(available);
            if axis.has_min() {
                stretched.max(resolve(axis.min))
            } else {
                stretched
            }
        }
        LayoutMode::MinMax => {
            let suggested = resolve(axis.suggested());
            if axis.has_max() {
                suggested.min(resolve(axis.max))
            } else {
                suggested
            }
        }
        LayoutMode::MinMaxAndPreferred => {
            let max = if axis.has_max() {
                resolve(axis.max).min(available)
            } else {
                f32::INFINITY
            };
            // min wins over max when they cross
            let preferred = resolve(axis.preferred).min(max);
            if axis.has_min() {
                preferred.max(resolve(axis.min))
            } else {
                preferred
            }
        }
    }
}

/// Upper bound of an element's size: the preferred size when Fixed, otherwise its max (or infinity).
pub fn max_size(layout: &ElementLayout, parent_size: Vec2, ctx: &ResolveContext) -> Vec2 {
    Vec2::new(
        max_axis(&layout.axis(Axis::Horizontal), parent_size.x, ctx),
        max_axis(&layout.axis(Axis::Vertical), parent_size.y, ctx),
    )
}

fn max_axis(axis: &AxisLayout, reference: f32, ctx: &ResolveContext) -> f32 {
    match axis.mode {
        LayoutMode::Fixed => Dimension::resolve_opt(axis.preferred, reference, ctx),
        _ => Dimension::resolve_max(axis.max, reference, ctx),
    }
}

/// Absolute top-left corner of an element offset by `position` from its parent's corner.
pub fn absolute_position(
    position: &Dimension2,
    parent_position: Vec2,
    parent_size: Vec2,
    ctx: &ResolveContext,
) -> Vec2 {
    if position.is_unset() {
        parent_position
    } else {
        parent_position + position.resolve(parent_size, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ResolveContext {
        ResolveContext::new(Vec2::new(800.0, 600.0))
    }

    fn parent() -> ConstraintBox {
        ConstraintBox::new(Vec2::new(400.0, 300.0), Vec2::new(400.0, 300.0))
    }

    #[test]
    fn test_fixed_and_percent_sizes() {
        let layout = ElementLayout::fixed(Dimension::percent(50.0), Dimension::px(20.0));
        let size = direct_size(&layout, &Dimension2::UNSET, &parent(), &ctx());
        assert_eq!(size, Vec2::new(200.0, 20.0));
        assert_eq!(max_size(&layout, Vec2::new(400.0, 300.0), &ctx()), size);
    }

    #[test]
    fn test_stretching_axis_respects_offset() {
        let mut layout = ElementLayout::new();
        layout.set_min_max_width(Dimension::UNSET, Dimension::UNSET, Some(true));
        let position = Dimension2::new(Dimension::px(100.0), Dimension::ZERO);

        let size = direct_size(&layout, &position, &parent(), &ctx());
        assert_eq!(size.x, 300.0);
        assert_eq!(size.y, 0.0);
    }

    #[test]
    fn test_stretching_axis_keeps_min() {
        let mut layout = ElementLayout::new();
        layout.set_min_max_width(Dimension::px(500.0), Dimension::UNSET, Some(true));
        let size = direct_size(&layout, &Dimension2::UNSET, &parent(), &ctx());
        assert_eq!(size.x, 500.0);
    }

    #[test]
    fn test_min_max_sits_at_min_below_max() {
        let mut layout = ElementLayout::new();
        layout.set_min_max_height(Dimension::px(80.0), Dimension::px(50.0), None);
        let size = direct_size(&layout, &Dimension2::UNSET, &parent(), &ctx());
        assert_eq!(size.y, 50.0);
    }

    #[test]
    fn test_preferred_is_clamped() {
        let mut layout = ElementLayout::new();
        layout.set_min_max_and_preferred_width(Dimension::px(600.0), Dimension::px(10.0), Dimension::px(1000.0));
        layout.set_min_max_and_preferred_height(Dimension::px(5.0), Dimension::px(10.0), Dimension::UNSET);

        let size = direct_size(&layout, &Dimension2::UNSET, &parent(), &ctx());
        assert_eq!(size, Vec2::new(400.0, 10.0));
    }

    #[test]
    fn test_crossed_min_and_max_do_not_panic() {
        let mut layout = ElementLayout::new();
        layout.set_min_max_and_preferred_width(Dimension::px(50.0), Dimension::px(90.0), Dimension::px(40.0));
        let size = direct_size(&layout, &Dimension2::UNSET, &parent(), &ctx());
        assert_eq!(size.x, 90.0);
    }

    #[test]
    fn test_unset_max_is_infinite() {
        let layout = ElementLayout::new();
        let max = max_size(&layout, Vec2::new(400.0, 300.0), &ctx());
        assert!(max.x.is_infinite() && max.y.is_infinite());
    }

    #[test]
    fn test_enforced_overrides_axis() {
        let constraints = parent().with_enforced_axis(Axis::Vertical, 12.0);
        assert_eq!(constraints.enforced(Axis::Horizontal), None);
        assert_eq!(constraints.apply_enforced(Vec2::new(1.0, 2.0)), Vec2::new(1.0, 12.0));
        assert!(constraints.is_enforced());
    }

    #[test]
    fn test_absolute_position() {
        let position = Dimension2::new(Dimension::percent(10.0), Dimension::px(5.0));
        let abs = absolute_position(&position, Vec2::new(1.0, 1.0), Vec2::new(200.0, 100.0), &ctx());
        assert_eq!(abs, Vec2::new(21.0, 6.0));
        assert_eq!(
            absolute_position(&Dimension2::UNSET, Vec2::new(3.0, 4.0), Vec2::ZERO, &ctx()),
            Vec2::new(3.0, 4.0)
        );
    }
}
