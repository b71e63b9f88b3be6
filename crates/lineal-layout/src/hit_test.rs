// crates/lineal-layout/src/hit_test.rs
//! Pointer lookup inside linear containers.
//!
//! Children of a linear container are sorted along the main axis, so the child under the pointer
//! is found with a binary search. The search starts at the child found last time, which makes
//! repeated queries over the same child a single comparison.

use glam::Vec2;
use lineal_core::{ElementId, ElementTree, LinearContainer, Rect};
use tracing::trace;

/// How far past the pointer travel the exit sweep looks, as a multiple of that travel.
const SWEEP_FACTOR: f32 = 1.5;

/// Index into the container's placed children of the best candidate for `point`.
///
/// The candidate is the child whose main-axis span contains the point, or the closest one when the
/// point falls into a gap. Returns `None` only when nothing was placed.
pub fn candidate_index(tree: &mut ElementTree, container: ElementId, point: Vec2) -> Option<usize> {
    let (orientation, placed, start) = {
        let linear = tree.get(container)?.kind.as_linear()?;
        (linear.orientation, linear.placed().to_vec(), linear.cursor().last_checked_index)
    };
    if placed.is_empty() {
        return None;
    }

    let bounds_of = |index: usize| -> Rect {
        tree.get(placed[index])
            .map(|element| element.bounds)
            .unwrap_or_default()
    };
    let target = orientation.of(point);

    let start = if start >= placed.len() { placed.len() / 2 } else { start };
    let mut index = start as isize;
    let mut left: isize = 0;
    let mut right: isize = placed.len() as isize - 1;
    let mut probes = 1;

    while left < right {
        let bounds = bounds_of(index as usize);
        let begin = bounds.start(orientation);
        let end = bounds.end(orientation);
        if begin <= target && target <= end {
            break;
        }

        if end < target {
            left = index + 1;
        } else {
            right = index - 1;
        }
        index = ((left + right) / 2).clamp(0, placed.len() as isize - 1);
        probes += 1;
    }

    let index = index as usize;
    trace!(
        "Hit search in {} settled on index {} after {} probes",
        container,
        index,
        probes
    );
    if let Some(linear) = linear_mut(tree, container) {
        linear.cursor_mut().last_checked_index = index;
    }
    Some(index)
}

/// The placed child whose bounds contain `point`, if any.
pub fn hit_child(tree: &mut ElementTree, container: ElementId, point: Vec2) -> Option<ElementId> {
    let index = candidate_index(tree, container, point)?;
    let child = tree
        .get(container)?
        .kind
        .as_linear()?
        .placed()
        .get(index)
        .copied()?;
    let bounds = tree.get(child)?.bounds;
    bounds.contains_point(point).then_some(child)
}

/// Children near the cached index that the pointer may have crossed since the previous query.
///
/// Walks outward in both directions until the main-axis distance covered reaches 1.5 times the
/// pointer travel. Coalesced move samples can jump over a child entirely; those children still
/// need their exit notification. The candidate itself is not included.
pub fn sweep_neighbors(tree: &mut ElementTree, container: ElementId, point: Vec2) -> Vec<ElementId> {
    let Some(index) = candidate_index(tree, container, point) else {
        return Vec::new();
    };
    let Some(linear) = linear_mut(tree, container) else {
        return Vec::new();
    };

    let orientation = linear.orientation;
    let previous = linear.cursor().last_pointer_position;
    linear.cursor_mut().last_pointer_position = point;
    let placed = linear.placed().to_vec();

    let required = (orientation.of(point) - orientation.of(previous)).abs() * SWEEP_FACTOR;
    let start_of = |id: ElementId| {
        tree.get(id)
            .map(|element| element.bounds.start(orientation))
            .unwrap_or_default()
    };
    let anchor = start_of(placed[index]);

    let mut neighbors = Vec::new();

    let mut covered = 0.0;
    let mut next = index + 1;
    while covered < required && next < placed.len() {
        neighbors.push(placed[next]);
        covered = (start_of(placed[next]) - anchor).abs();
        next += 1;
    }

    let mut covered = 0.0;
    let mut next = index;
    while covered < required && next > 0 {
        next -= 1;
        neighbors.push(placed[next]);
        covered = (anchor - start_of(placed[next])).abs();
    }

    neighbors
}

fn linear_mut(tree: &mut ElementTree, container: ElementId) -> Option<&mut LinearContainer> {
    tree.get_mut(container)?.kind.as_linear_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayoutEngine, LinearLayoutEngine};
    use lineal_core::{Arrangement, Dimension, Element, ElementLayout, Justification, ResolveContext};

    /// A 500px row of ten 40px children with 10px gaps: child `i` spans [50i, 50i + 40].
    fn row_of_ten() -> (ElementTree, ElementId, Vec<ElementId>) {
        let mut tree = ElementTree::new();
        let row = tree.insert(
            Element::row(Arrangement::spaced_by(Dimension::px(10.0), Justification::Start))
                .with_layout(ElementLayout::fixed(Dimension::px(500.0), Dimension::px(40.0))),
        );
        tree.set_root(row).unwrap();
        let children = (0..10)
            .map(|_| {
                let id = tree.insert(
                    Element::plain().with_layout(ElementLayout::fixed(Dimension::px(40.0), Dimension::px(40.0))),
                );
                tree.append_child(row, id).unwrap();
                id
            })
            .collect();

        LinearLayoutEngine::new()
            .compute_layout(&mut tree, row, Vec2::new(500.0, 40.0), &ResolveContext::default())
            .unwrap();
        (tree, row, children)
    }

    fn cursor_index(tree: &ElementTree, row: ElementId) -> usize {
        tree.get(row).unwrap().kind.as_linear().unwrap().cursor().last_checked_index
    }

    #[test]
    fn test_finds_child_under_pointer() {
        let (mut tree, row, children) = row_of_ten();
        for (i, child) in children.iter().enumerate() {
            let point = Vec2::new(50.0 * i as f32 + 20.0, 20.0);
            assert_eq!(hit_child(&mut tree, row, point), Some(*child));
            assert_eq!(cursor_index(&tree, row), i);
        }
    }

    #[test]
    fn test_gap_and_cross_axis_miss() {
        let (mut tree, row, _) = row_of_ten();
        assert_eq!(hit_child(&mut tree, row, Vec2::new(145.0, 20.0)), None);
        assert_eq!(hit_child(&mut tree, row, Vec2::new(120.0, 80.0)), None);
    }

    #[test]
    fn test_repeated_query_hits_cache() {
        let (mut tree, row, children) = row_of_ten();
        assert_eq!(hit_child(&mut tree, row, Vec2::new(355.0, 5.0)), Some(children[7]));
        assert_eq!(cursor_index(&tree, row), 7);
        assert_eq!(candidate_index(&mut tree, row, Vec2::new(360.0, 5.0)), Some(7));
    }

    #[test]
    fn test_stale_cursor_is_reset() {
        let (mut tree, row, children) = row_of_ten();
        if let Some(linear) = tree.get_mut(row).unwrap().kind.as_linear_mut() {
            linear.cursor_mut().last_checked_index = 99;
        }
        assert_eq!(hit_child(&mut tree, row, Vec2::new(5.0, 5.0)), Some(children[0]));
    }

    #[test]
    fn test_sweep_covers_travel_in_both_directions() {
        let (mut tree, row, children) = row_of_ten();
        sweep_neighbors(&mut tree, row, Vec2::new(20.0, 20.0));

        // 100px of travel: look 150px to each side of child 2.
        let swept = sweep_neighbors(&mut tree, row, Vec2::new(120.0, 20.0));
        for expected in [children[3], children[4], children[5], children[1], children[0]] {
            assert!(swept.contains(&expected), "missing {expected:?} in {swept:?}");
        }
        assert!(!swept.contains(&children[2]));
        assert!(!swept.contains(&children[7]));

        let back = sweep_neighbors(&mut tree, row, Vec2::new(20.0, 20.0));
        assert!(back.contains(&children[1]) && back.contains(&children[2]));
    }

    #[test]
    fn test_no_travel_sweeps_nothing() {
        let (mut tree, row, _) = row_of_ten();
        sweep_neighbors(&mut tree, row, Vec2::new(220.0, 20.0));
        assert!(sweep_neighbors(&mut tree, row, Vec2::new(220.0, 30.0)).is_empty());
    }
}
