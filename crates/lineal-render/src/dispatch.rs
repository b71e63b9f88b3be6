// crates/lineal-render/src/dispatch.rs
//! Turns raw pointer input into per-element enter/exit/move/down/up notifications.

use std::collections::HashSet;

use glam::Vec2;
use lineal_core::{ElementId, ElementTree};
use lineal_layout::{hit_child, sweep_neighbors};
use tracing::trace;

use crate::{InputEvent, MouseButton};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Enter,
    Exit,
    Move,
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub target: ElementId,
    pub kind: PointerEventKind,
    /// Pointer position relative to the target's top-left corner.
    pub local: Vec2,
    pub absolute: Vec2,
    pub button: Option<MouseButton>,
}

/// Tracks which elements hold the pointer and which received a press.
#[derive(Debug, Default)]
pub struct PointerDispatcher {
    last_position: Option<Vec2>,
    pressed: Vec<ElementId>,
}

impl PointerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }

    /// Dispatch one input event. The returned events are ordered deepest element first within
    /// each kind, exits before enters before moves.
    pub fn dispatch(&mut self, tree: &mut ElementTree, event: &InputEvent) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        match *event {
            InputEvent::MouseMove { position } => {
                let path = self.track(tree, position, &mut events);
                for &id in path.iter().rev() {
                    push_event(tree, &mut events, id, PointerEventKind::Move, position, None);
                }
            }
            InputEvent::MousePress { position, button } => {
                let path = self.track(tree, position, &mut events);
                for &id in path.iter().rev() {
                    push_event(tree, &mut events, id, PointerEventKind::Down, position, Some(button));
                }
                self.pressed = path;
            }
            InputEvent::MouseRelease { position, button } => {
                let path = self.track(tree, position, &mut events);
                let mut targets: Vec<ElementId> = path.iter().rev().copied().collect();
                // elements pressed earlier still hear the release, even after the pointer left them
                for id in std::mem::take(&mut self.pressed).into_iter().rev() {
                    if !targets.contains(&id) {
                        targets.push(id);
                    }
                }
                for id in targets {
                    push_event(tree, &mut events, id, PointerEventKind::Up, position, Some(button));
                }
            }
            InputEvent::MouseLeave => {
                let position = self.last_position.unwrap_or(Vec2::splat(f32::NEG_INFINITY));
                if let Some(root) = tree.root() {
                    collect_exits(tree, root, position, &HashSet::new(), false, &mut events);
                }
                self.last_position = None;
            }
            InputEvent::Resize { .. } => {}
        }

        trace!("Dispatched {:?} as {} pointer events", event, events.len());
        events
    }

    /// Update the `pointer_inside` flags for a pointer at `position`, emitting exits and enters.
    /// Returns the hit path from the root down.
    fn track(
        &mut self,
        tree: &mut ElementTree,
        position: Vec2,
        events: &mut Vec<PointerEvent>,
    ) -> Vec<ElementId> {
        let path = hit_path(tree, position);
        let on_path: HashSet<ElementId> = path.iter().copied().collect();

        if let Some(root) = tree.root() {
            collect_exits(tree, root, position, &on_path, true, events);
        }

        for &id in path.iter().rev() {
            let Some(element) = tree.get_mut(id) else {
                continue;
            };
            if element.pointer_inside {
                continue;
            }
            element.pointer_inside = true;
            push_event(tree, events, id, PointerEventKind::Enter, position, None);
        }

        self.last_position = Some(position);
        path
    }
}

/// The chain of elements under `point`, from the root down to the deepest one.
///
/// Inside linear containers the child is found with the cached binary search; elsewhere the
/// last (topmost) matching child wins.
pub fn hit_path(tree: &mut ElementTree, point: Vec2) -> Vec<ElementId> {
    let mut path = Vec::new();
    let Some(root) = tree.root() else {
        return path;
    };
    if !is_hit(tree, root, point) {
        return path;
    }

    let mut current = root;
    path.push(current);
    loop {
        let is_container = tree.get(current).is_some_and(|element| element.is_container());
        let next = if is_container {
            hit_child(tree, current, point).filter(|child| is_hit(tree, *child, point))
        } else {
            tree.children(current)
                .iter()
                .rev()
                .copied()
                .find(|child| is_hit(tree, *child, point))
        };

        match next {
            Some(child) => {
                path.push(child);
                current = child;
            }
            None => break,
        }
    }
    path
}

fn is_hit(tree: &ElementTree, id: ElementId, point: Vec2) -> bool {
    tree.get(id).is_some_and(|element| {
        element.enabled && element.visible && element.bounds.contains_point(point)
    })
}

/// Clear `pointer_inside` on everything under `id` that is no longer on the hit path.
///
/// A linear container that still holds the pointer only revisits its cached child and the
/// neighbors the pointer may have crossed; anything else checks all of its children.
fn collect_exits(
    tree: &mut ElementTree,
    id: ElementId,
    point: Vec2,
    on_path: &HashSet<ElementId>,
    sweep: bool,
    events: &mut Vec<PointerEvent>,
) {
    let Some(element) = tree.get(id) else {
        return;
    };
    if !element.pointer_inside {
        return;
    }
    let stays = on_path.contains(&id);

    let candidates = if stays && sweep && element.is_container() {
        let mut candidates = sweep_neighbors(tree, id, point);
        if let Some(linear) = tree.get(id).and_then(|element| element.kind.as_linear()) {
            if let Some(&cached) = linear.placed().get(linear.cursor().last_checked_index) {
                candidates.push(cached);
            }
        }
        candidates
    } else {
        tree.children(id).to_vec()
    };

    for child in candidates {
        collect_exits(tree, child, point, on_path, sweep, events);
    }

    if !stays {
        if let Some(element) = tree.get_mut(id) {
            element.pointer_inside = false;
        }
        push_event(tree, events, id, PointerEventKind::Exit, point, None);
    }
}

fn push_event(
    tree: &ElementTree,
    events: &mut Vec<PointerEvent>,
    target: ElementId,
    kind: PointerEventKind,
    absolute: Vec2,
    button: Option<MouseButton>,
) {
    let origin = tree
        .get(target)
        .map(|element| element.bounds.position)
        .unwrap_or_default();
    events.push(PointerEvent {
        target,
        kind,
        local: absolute - origin,
        absolute,
        button,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineal_core::{Arrangement, Dimension, Element, ElementLayout, Justification, Rect};

    /// Root column (300x300) with a row at the top holding three 100px buttons, plus a
    /// plain panel below it with two overlapping children.
    struct Scene {
        tree: ElementTree,
        root: ElementId,
        row: ElementId,
        buttons: Vec<ElementId>,
        panel: ElementId,
        under: ElementId,
        over: ElementId,
    }

    fn place(tree: &mut ElementTree, id: ElementId, rect: Rect) {
        tree.get_mut(id).unwrap().bounds = rect;
    }

    fn scene() -> Scene {
        let mut tree = ElementTree::new();
        let root = tree.insert(Element::column(Arrangement::default()));
        let row = tree.insert(Element::row(Arrangement::justified(Justification::Start)));
        let panel = tree.insert(Element::plain());
        tree.set_root(root).unwrap();
        tree.append_child(root, row).unwrap();
        tree.append_child(root, panel).unwrap();

        let buttons: Vec<ElementId> = (0..3)
            .map(|_| {
                let id = tree.insert(Element::plain().with_layout(ElementLayout::fixed(
                    Dimension::px(100.0),
                    Dimension::px(100.0),
                )));
                tree.append_child(row, id).unwrap();
                id
            })
            .collect();
        let under = tree.insert(Element::plain());
        let over = tree.insert(Element::plain());
        tree.append_child(panel, under).unwrap();
        tree.append_child(panel, over).unwrap();

        place(&mut tree, root, Rect::new(0.0, 0.0, 300.0, 300.0));
        place(&mut tree, row, Rect::new(0.0, 0.0, 300.0, 100.0));
        for (i, id) in buttons.iter().enumerate() {
            place(&mut tree, *id, Rect::new(100.0 * i as f32, 0.0, 100.0, 100.0));
        }
        place(&mut tree, panel, Rect::new(0.0, 100.0, 300.0, 200.0));
        place(&mut tree, under, Rect::new(0.0, 100.0, 200.0, 200.0));
        place(&mut tree, over, Rect::new(100.0, 100.0, 200.0, 200.0));
        if let Some(linear) = tree.get_mut(row).unwrap().kind.as_linear_mut() {
            linear.set_placed(buttons.clone());
        }
        if let Some(linear) = tree.get_mut(root).unwrap().kind.as_linear_mut() {
            linear.set_placed(vec![row, panel]);
        }

        Scene { tree, root, row, buttons, panel, under, over }
    }

    fn kinds_for(events: &[PointerEvent], kind: PointerEventKind) -> Vec<ElementId> {
        events.iter().filter(|e| e.kind == kind).map(|e| e.target).collect()
    }

    #[test]
    fn test_enter_is_deepest_first() {
        let mut s = scene();
        let mut dispatcher = PointerDispatcher::new();
        let events = dispatcher.dispatch(&mut s.tree, &InputEvent::MouseMove { position: Vec2::new(150.0, 50.0) });

        assert_eq!(kinds_for(&events, PointerEventKind::Enter), vec![s.buttons[1], s.row, s.root]);
        assert_eq!(kinds_for(&events, PointerEventKind::Move), vec![s.buttons[1], s.row, s.root]);
        let local = events.iter().find(|e| e.target == s.buttons[1]).unwrap().local;
        assert_eq!(local, Vec2::new(50.0, 50.0));
        assert!(s.tree.get(s.buttons[1]).unwrap().pointer_inside);
    }

    #[test]
    fn test_moving_between_siblings_exits_then_enters() {
        let mut s = scene();
        let mut dispatcher = PointerDispatcher::new();
        dispatcher.dispatch(&mut s.tree, &InputEvent::MouseMove { position: Vec2::new(50.0, 50.0) });
        let events = dispatcher.dispatch(&mut s.tree, &InputEvent::MouseMove { position: Vec2::new(150.0, 50.0) });

        assert_eq!(kinds_for(&events, PointerEventKind::Exit), vec![s.buttons[0]]);
        assert_eq!(kinds_for(&events, PointerEventKind::Enter), vec![s.buttons[1]]);
        let exit_at = events.iter().position(|e| e.kind == PointerEventKind::Exit).unwrap();
        let enter_at = events.iter().position(|e| e.kind == PointerEventKind::Enter).unwrap();
        assert!(exit_at < enter_at);
    }

    #[test]
    fn test_jump_across_children_still_exits() {
        let mut s = scene();
        let mut dispatcher = PointerDispatcher::new();
        dispatcher.dispatch(&mut s.tree, &InputEvent::MouseMove { position: Vec2::new(50.0, 50.0) });
        let events = dispatcher.dispatch(&mut s.tree, &InputEvent::MouseMove { position: Vec2::new(250.0, 50.0) });

        assert_eq!(kinds_for(&events, PointerEventKind::Exit), vec![s.buttons[0]]);
        assert!(!s.tree.get(s.buttons[0]).unwrap().pointer_inside);
        assert!(s.tree.get(s.buttons[2]).unwrap().pointer_inside);
    }

    #[test]
    fn test_plain_container_picks_topmost_child() {
        let mut s = scene();
        let mut dispatcher = PointerDispatcher::new();
        let events = dispatcher.dispatch(&mut s.tree, &InputEvent::MouseMove { position: Vec2::new(150.0, 200.0) });

        let entered = kinds_for(&events, PointerEventKind::Enter);
        assert_eq!(entered, vec![s.over, s.panel, s.root]);
        assert!(!entered.contains(&s.under));
    }

    #[test]
    fn test_leaving_window_exits_everything() {
        let mut s = scene();
        let mut dispatcher = PointerDispatcher::new();
        dispatcher.dispatch(&mut s.tree, &InputEvent::MouseMove { position: Vec2::new(50.0, 50.0) });
        let events = dispatcher.dispatch(&mut s.tree, &InputEvent::MouseLeave);

        assert_eq!(kinds_for(&events, PointerEventKind::Exit), vec![s.buttons[0], s.row, s.root]);
        assert!(dispatcher.last_position().is_none());
    }

    #[test]
    fn test_release_reaches_pressed_element_after_drag_out() {
        let mut s = scene();
        let mut dispatcher = PointerDispatcher::new();
        let press = InputEvent::MousePress { position: Vec2::new(50.0, 50.0), button: MouseButton::Left };
        let events = dispatcher.dispatch(&mut s.tree, &press);
        assert_eq!(kinds_for(&events, PointerEventKind::Down), vec![s.buttons[0], s.row, s.root]);

        let release = InputEvent::MouseRelease { position: Vec2::new(250.0, 250.0), button: MouseButton::Left };
        let events = dispatcher.dispatch(&mut s.tree, &release);
        let ups = kinds_for(&events, PointerEventKind::Up);
        assert!(ups.contains(&s.buttons[0]));
        assert!(ups.contains(&s.over));
        assert_eq!(ups[0], s.over);
    }

    #[test]
    fn test_disabled_elements_are_not_hit() {
        let mut s = scene();
        s.tree.get_mut(s.buttons[1]).unwrap().enabled = false;
        let path = hit_path(&mut s.tree, Vec2::new(150.0, 50.0));
        assert_eq!(path, vec![s.root, s.row]);
    }
}
