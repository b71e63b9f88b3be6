// crates/lineal-layout/src/linear.rs
//! Row and column layout, written once over a main/cross [`Axis`] pair.
//!
//! The first pass estimates how much room the enabled children want along the main axis. The
//! container then decides its own main size, the gap and the share each growing child gets. The
//! second pass lays the children out at the origin with whatever they were granted and moves them
//! into place. Cross-axis alignment waits until the container knows its final cross size.

use glam::Vec2;
use lineal_core::{
    Alignment, Axis, AxisLayout, Dimension, ElementId, ElementLayout, ElementTree,
    Justification, LayoutMode, Rect, ResolveContext, Result,
};
use tracing::{debug, trace, warn};

use crate::{direct_size, layout_at, own_size, ConstraintBox};

/// Deviations below this are float noise, not a disobeying child.
const ENFORCE_TOLERANCE: f32 = 0.01;
/// Accumulated deviation that corrects the running estimate and taints the pass.
const TAINT_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
enum Role {
    /// Takes a share of the leftover main-axis space.
    Grower { factor: f32, min: f32, max: f32 },
    /// Keeps its declared size, unless the container has to squeeze it.
    Sized {
        declared: Vec2,
        min: f32,
        shrinkable: bool,
        fully_fixed: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct Plan {
    id: ElementId,
    role: Role,
    alignment: Option<Alignment>,
}

#[derive(Debug, Default)]
struct Estimate {
    /// Preferred main size of the content, including gaps. Saturates at +infinity.
    estimated: f32,
    /// Smallest main size the content could be squeezed to.
    minimum: f32,
    /// Main size claimed by non-growing children at their preferred size.
    sized_preferred: f32,
    /// Minimums of the growing children.
    grower_min: f32,
    /// Total room sized children could give up when shrinking.
    slack: f32,
    total_growth: f32,
    can_respect_positioning: bool,
}

struct Placed {
    id: ElementId,
    main_position: f32,
    size: Vec2,
    alignment: Option<Alignment>,
}

pub(crate) fn layout_linear(
    tree: &mut ElementTree,
    id: ElementId,
    constraints: ConstraintBox,
    origin: Vec2,
    ctx: &ResolveContext,
) -> Result<Vec2> {
    let element = tree.element(id)?;
    let Some(container) = element.kind.as_linear() else {
        return Ok(element.bounds.size);
    };
    let main = container.orientation;
    let cross = main.cross();
    let arrangement = container.arrangement;
    let preferred_alignment = container.preferred_alignment;
    let layout = element.layout.clone();

    let (this_size, this_max) = own_size(tree, id, &constraints, ctx)?;

    let enabled: Vec<ElementId> = tree
        .children(id)
        .iter()
        .copied()
        .filter(|child| tree.get(*child).map(|c| c.enabled).unwrap_or(false))
        .collect();

    if enabled.is_empty() {
        let element = tree.element_mut(id)?;
        element.bounds = Rect::from_position_size(origin, this_size);
        element.content_size = Vec2::ZERO;
        if let Some(linear) = element.kind.as_linear_mut() {
            linear.set_placed(Vec::new());
        }
        return Ok(this_size);
    }

    let count = enabled.len();
    let gaps = (count - 1) as f32;
    let mut spacing = if arrangement.is_spacing_relevant() {
        arrangement.spacing.resolve(main.of(this_size), ctx)
    } else {
        0.0
    };

    // Pass 1: estimate.
    // A child stretching on the cross axis fills the container, not the container's max.
    let child_max = cross.with(this_max, cross.of(this_max).min(cross.of(this_size)));
    let child_constraints = ConstraintBox::new(this_size, child_max);
    let mut plans = Vec::with_capacity(count);
    let mut estimate = Estimate {
        can_respect_positioning: true,
        ..Estimate::default()
    };
    for &child in &enabled {
        plans.push(plan_child(tree, child, main, &child_constraints, ctx, &mut estimate)?);
    }
    estimate.estimated += spacing * gaps;
    estimate.minimum += spacing * gaps;
    estimate.sized_preferred += spacing * gaps;

    // Resolve the container's main size against the estimate.
    let main_layout = layout.axis(main);
    let main_enforced = constraints.enforced(main).is_some();
    let mut container_dim = main.of(this_size);
    if !container_dim.is_finite() {
        container_dim = if estimate.estimated.is_finite() {
            estimate.estimated
        } else {
            0.0
        };
    }
    if !main_enforced
        && main_layout.mode == LayoutMode::MinMax
        && !main_layout.prefers_max
        && estimate.estimated.is_finite()
        && estimate.estimated > container_dim
    {
        container_dim = estimate.estimated.min(main.of(this_max)).max(container_dim);
    }

    let mut estimated = estimate.estimated;
    if estimate.can_respect_positioning {
        if container_dim < estimated {
            estimate.can_respect_positioning = false;
        }
    } else if container_dim > estimated {
        estimated = container_dim;
    }

    if estimate.can_respect_positioning && count > 1 {
        let leftover = container_dim - estimated;
        match arrangement.justification {
            Justification::SpaceAround => spacing = leftover / count as f32,
            Justification::SpaceBetween => spacing = leftover / gaps,
            Justification::SpaceEvenly => spacing = leftover / (count + 1) as f32,
            _ => {}
        }
    }

    let needs_forced_shrinking = container_dim < estimated && container_dim >= estimate.minimum;
    let deficit = if needs_forced_shrinking {
        (estimate.sized_preferred + estimate.grower_min - container_dim).max(0.0)
    } else {
        0.0
    };
    let shrink_ratio = if deficit > 0.0 && estimate.slack > 0.0 {
        (deficit / estimate.slack).min(1.0)
    } else {
        0.0
    };

    // Main size the sized children will take, gaps included.
    let allocated_dim = plans
        .iter()
        .map(|plan| match plan.role {
            Role::Sized { declared, min, shrinkable, .. } => {
                shrunk_size(main.of(declared), min, shrinkable, shrink_ratio)
            }
            Role::Grower { .. } => 0.0,
        })
        .sum::<f32>()
        + spacing * gaps;
    let growth_section_dim = if estimate.total_growth > 0.0 {
        ((container_dim - allocated_dim) / estimate.total_growth).max(0.0)
    } else {
        0.0
    };

    // Shrunk children no longer add up to the estimate; position the run by what it will occupy.
    let free = if needs_forced_shrinking {
        let granted_growth: f32 = plans
            .iter()
            .map(|plan| match plan.role {
                Role::Grower { factor, min, max } => grant(factor, growth_section_dim, min, max),
                Role::Sized { .. } => 0.0,
            })
            .sum();
        (container_dim - allocated_dim - granted_growth).max(0.0)
    } else {
        container_dim - estimated
    };
    let free = if free.is_finite() { free } else { 0.0 };
    let start = if arrangement.justification.is_space_distributing() && count <= 1 {
        free / 2.0
    } else {
        match arrangement.justification {
            Justification::Start | Justification::SpaceBetween => 0.0,
            Justification::Center => free / 2.0,
            Justification::End => free,
            Justification::SpaceAround => spacing / 2.0,
            Justification::SpaceEvenly => spacing,
        }
    };

    // Pass 2: lay out and place.
    let mut cursor = start;
    let mut content_main = 0.0;
    let mut content_cross: f32 = 0.0;
    let mut deviation = 0.0;
    let mut tainted = false;
    let mut placed = Vec::with_capacity(count);

    for plan in &plans {
        let (child_box, expected) = match plan.role {
            Role::Grower { factor, min, max } => {
                let granted = grant(factor, growth_section_dim, min, max);
                (child_constraints.with_enforced_axis(main, granted), granted)
            }
            Role::Sized { declared, min, shrinkable, fully_fixed } => {
                if estimate.can_respect_positioning || !needs_forced_shrinking {
                    (child_constraints, main.of(declared))
                } else if fully_fixed {
                    let squeezed = ConstraintBox::new(this_size, this_size)
                        .with_enforced(Some(declared.x), Some(declared.y));
                    (squeezed, main.of(declared))
                } else if shrinkable {
                    let shrunk = shrunk_size(main.of(declared), min, true, shrink_ratio);
                    let squeezed = ConstraintBox::new(this_size, this_size).with_enforced_axis(main, shrunk);
                    (squeezed, shrunk)
                } else {
                    (ConstraintBox::new(this_size, this_size), main.of(declared))
                }
            }
        };

        let actual = layout_at(tree, plan.id, child_box, Vec2::ZERO, ctx)?;
        check_enforced(plan.id, &child_box, actual);

        deviation += main.of(actual) - expected;
        if deviation.abs() > TAINT_THRESHOLD {
            estimated += deviation;
            deviation = 0.0;
            tainted = true;
        }

        trace!(
            "Placed {} in {}: main={} size={:?}",
            plan.id,
            id,
            cursor,
            actual
        );
        placed.push(Placed {
            id: plan.id,
            main_position: cursor,
            size: actual,
            alignment: plan.alignment,
        });
        cursor += main.of(actual) + spacing;
        content_main += main.of(actual);
        content_cross = content_cross.max(cross.of(actual));
    }
    content_main += spacing * gaps;

    // Finalize.
    let final_main = final_dim(
        &main_layout,
        content_main,
        container_dim,
        main.of(this_max),
        constraints.enforced(main),
    );
    let final_cross = final_dim(
        &layout.axis(cross),
        content_cross,
        cross.of(this_size),
        cross.of(this_max),
        constraints.enforced(cross),
    );

    for entry in &placed {
        let alignment = entry.alignment.unwrap_or(preferred_alignment);
        let cross_offset = alignment.offset(final_cross, cross.of(entry.size));
        let position = origin + main.compose(entry.main_position, cross_offset);

        tree.element_mut(entry.id)?.bounds = Rect::from_position_size(position, entry.size);
        tree.translate_descendants(entry.id, position);
    }

    let size = main.compose(final_main, final_cross);
    let element = tree.element_mut(id)?;
    element.bounds = Rect::from_position_size(origin, size);
    element.content_size = main.compose(content_main, content_cross);
    if let Some(linear) = element.kind.as_linear_mut() {
        linear.set_placed(placed.iter().map(|entry| entry.id).collect());
    }

    debug!(
        "Linear {} ({:?}): {} children, container={}, estimated={}, content={}, gap={}, shrink={}, tainted={}",
        id,
        main,
        count,
        container_dim,
        estimated,
        content_main,
        spacing,
        needs_forced_shrinking,
        tainted
    );

    Ok(size)
}

fn plan_child(
    tree: &ElementTree,
    child: ElementId,
    main: Axis,
    constraints: &ConstraintBox,
    ctx: &ResolveContext,
    estimate: &mut Estimate,
) -> Result<Plan> {
    let element = tree.element(child)?;
    let child_layout: &ElementLayout = &element.layout;
    let axis_layout = child_layout.axis(main);
    let reference = main.of(constraints.size);
    let resolve = |dim: Option<Dimension>| Dimension::resolve_opt(dim, reference, ctx);

    let alignment = element
        .container_sizing
        .and_then(|sizing| sizing.alignment_for(main));

    if let Some(factor) = element
        .container_sizing
        .and_then(|sizing| sizing.growth_for(main))
    {
        // explicit grower minimums are relative to the container's max, not its current size
        let max_reference = main.of(constraints.max_size);
        let min = if max_reference.is_finite() {
            Dimension::resolve_opt(axis_layout.min, max_reference, ctx)
        } else {
            resolve(axis_layout.min)
        };
        estimate.total_growth += factor;
        estimate.minimum += min;
        estimate.estimated += min;
        estimate.grower_min += min;
        estimate.can_respect_positioning = false;
        return Ok(Plan {
            id: child,
            role: Role::Grower {
                factor,
                min,
                max: f32::INFINITY,
            },
            alignment,
        });
    }

    if axis_layout.is_stretching() {
        let min = resolve(axis_layout.min);
        let max = Dimension::resolve_max(axis_layout.max, reference, ctx);
        estimate.total_growth += 1.0;
        estimate.minimum += min;
        estimate.grower_min += min;
        if max.is_finite() {
            estimate.estimated += max;
        } else {
            estimate.estimated += min;
            estimate.can_respect_positioning = false;
        }
        return Ok(Plan {
            id: child,
            role: Role::Grower {
                factor: 1.0,
                min,
                max,
            },
            alignment,
        });
    }

    let declared = direct_size(child_layout, &element.position, constraints, ctx);
    let preferred = main.of(declared);
    let shrinkable = axis_layout.mode == LayoutMode::MinMaxAndPreferred;
    let min = if shrinkable {
        min_of(&axis_layout, reference, ctx).min(preferred)
    } else {
        preferred
    };

    estimate.minimum += min;
    estimate.estimated += preferred;
    estimate.sized_preferred += preferred;
    estimate.slack += preferred - min;

    Ok(Plan {
        id: child,
        role: Role::Sized {
            declared,
            min,
            shrinkable,
            fully_fixed: child_layout.is_fully_fixed(),
        },
        alignment,
    })
}

fn grant(factor: f32, section: f32, min: f32, max: f32) -> f32 {
    (factor * section).max(min).min(max)
}

fn min_of(axis: &AxisLayout, reference: f32, ctx: &ResolveContext) -> f32 {
    if axis.has_min() {
        Dimension::resolve_opt(axis.min, reference, ctx)
    } else {
        0.0
    }
}

/// Give up `ratio` of the room between preferred and min.
fn shrunk_size(preferred: f32, min: f32, shrinkable: bool, ratio: f32) -> f32 {
    if shrinkable {
        preferred - (preferred - min) * ratio
    } else {
        preferred
    }
}

fn check_enforced(child: ElementId, constraints: &ConstraintBox, actual: Vec2) {
    if !constraints.is_enforced() {
        return;
    }
    let disobeyed = |enforced: Option<f32>, got: f32| {
        enforced.is_some_and(|value| (value - got).abs() > ENFORCE_TOLERANCE)
    };
    if disobeyed(constraints.enforced_width, actual.x) || disobeyed(constraints.enforced_height, actual.y) {
        warn!(
            "Element {} ignored its enforced size ({:?}, {:?}) and took {:?}; the layout may overflow",
            child, constraints.enforced_width, constraints.enforced_height, actual
        );
    }
}

/// The container's final size along one axis.
///
/// Fixed and stretching axes keep their own size. Everything else hugs the content between its
/// resolved size and its max.
fn final_dim(axis: &AxisLayout, content: f32, own: f32, max: f32, enforced: Option<f32>) -> f32 {
    if let Some(value) = enforced {
        return value;
    }
    if axis.mode != LayoutMode::Fixed && !axis.prefers_max {
        content.max(own).min(max)
    } else {
        own
    }
}
