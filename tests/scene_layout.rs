use glam::Vec2;
use lineal_core::{Rect, SceneFile};
use lineal_render::{InputEvent, PointerEventKind, RecordingRenderer, RenderCommand};
use lineal_runtime::LinealApp;

fn lay_out(json: &str, viewport: Vec2) -> LinealApp<RecordingRenderer> {
    let scene: SceneFile = serde_json::from_str(json).expect("Failed to parse scene");
    LinealApp::from_scene(&scene, RecordingRenderer::new(viewport)).expect("Failed to build app")
}

fn bounds(app: &LinealApp<RecordingRenderer>, name: &str) -> Rect {
    let id = app
        .tree()
        .find_by_name(name)
        .unwrap_or_else(|| panic!("no element named {name}"));
    app.tree().get(id).unwrap().bounds
}

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

#[test]
fn test_three_fixed_children_with_spacing() {
    let app = lay_out(
        r#"{ "root": {
            "name": "row", "kind": "row", "width": "300px", "height": "40px",
            "arrangement": { "spacing": "10px", "justification": "start" },
            "children": [
                { "name": "a", "width": "50px", "height": "40px" },
                { "name": "b", "width": "50px", "height": "40px" },
                { "name": "c", "width": "50px", "height": "40px" }
            ]
        } }"#,
        VIEWPORT,
    );

    assert_eq!(bounds(&app, "a").position.x, 0.0);
    assert_eq!(bounds(&app, "b").position.x, 60.0);
    assert_eq!(bounds(&app, "c").position.x, 120.0);

    let root = app.tree().get(app.root()).unwrap();
    assert_eq!(root.content_size.x, 170.0);
    assert_eq!(root.bounds.size, Vec2::new(300.0, 40.0));
}

#[test]
fn test_grower_takes_leftover_space() {
    let app = lay_out(
        r#"{ "root": {
            "kind": "row", "width": "200px", "height": "40px",
            "children": [
                { "name": "fixed", "width": "50px", "height": "40px" },
                { "name": "grow", "sizing": { "type": "row_growth", "factor": 1.0 } }
            ]
        } }"#,
        VIEWPORT,
    );

    assert_eq!(bounds(&app, "grow").size.x, 150.0);
    assert_eq!(bounds(&app, "grow").position.x, 50.0);
}

#[test]
fn test_growth_is_proportional() {
    let app = lay_out(
        r#"{ "root": {
            "kind": "row", "width": "400px", "height": "40px",
            "children": [
                { "name": "one", "sizing": { "type": "row_growth", "factor": 1.0 } },
                { "name": "three", "sizing": { "type": "row_growth", "factor": 3.0 } }
            ]
        } }"#,
        VIEWPORT,
    );

    let one = bounds(&app, "one").size.x;
    let three = bounds(&app, "three").size.x;
    assert_eq!(one, 100.0);
    assert_eq!(three, 3.0 * one);
}

#[test]
fn test_forced_shrink_splits_the_deficit() {
    let child = r#"{ "mode": "min_max_and_preferred", "preferred": "50px", "min": "30px" }"#;
    let json = format!(
        r#"{{ "root": {{
            "kind": "row", "width": "80px", "height": "40px",
            "children": [
                {{ "name": "left", "width": {child}, "height": "40px" }},
                {{ "name": "right", "width": {child}, "height": "40px" }}
            ]
        }} }}"#
    );
    let app = lay_out(&json, VIEWPORT);

    assert_eq!(bounds(&app, "left"), Rect::new(0.0, 0.0, 40.0, 40.0));
    assert_eq!(bounds(&app, "right"), Rect::new(40.0, 0.0, 40.0, 40.0));
}

#[test]
fn test_space_between_pushes_children_to_the_ends() {
    let app = lay_out(
        r#"{ "root": {
            "kind": "row", "width": "300px", "height": "40px",
            "arrangement": { "justification": "space_between" },
            "children": [
                { "name": "first", "width": "50px", "height": "40px" },
                { "name": "second", "width": "50px", "height": "40px" }
            ]
        } }"#,
        VIEWPORT,
    );

    assert_eq!(bounds(&app, "first").position.x, 0.0);
    assert_eq!(bounds(&app, "second").position.x, 250.0);
}

#[test]
fn test_content_scale_applies_to_dp() {
    let app = lay_out(
        r#"{ "config": { "content_scale": 2.0 }, "root": {
            "kind": "row", "width": "600px", "height": "100px",
            "children": [
                { "name": "scaled", "width": 50, "height": 20 },
                { "name": "raw", "width": "50px", "height": "20px" }
            ]
        } }"#,
        VIEWPORT,
    );

    assert_eq!(bounds(&app, "scaled").size, Vec2::new(100.0, 40.0));
    assert_eq!(bounds(&app, "raw").size, Vec2::new(50.0, 20.0));
    assert_eq!(bounds(&app, "raw").position.x, 100.0);
}

#[test]
fn test_disabled_child_is_skipped() {
    let app = lay_out(
        r#"{ "root": {
            "kind": "row", "width": "300px", "height": "40px",
            "arrangement": { "spacing": "10px" },
            "children": [
                { "name": "a", "width": "50px", "height": "40px" },
                { "name": "off", "width": "50px", "height": "40px", "enabled": false },
                { "name": "b", "width": "50px", "height": "40px" }
            ]
        } }"#,
        VIEWPORT,
    );

    assert_eq!(bounds(&app, "b").position.x, 60.0);
    assert_eq!(bounds(&app, "off"), Rect::default());
    assert_eq!(app.tree().get(app.root()).unwrap().content_size.x, 110.0);
}

#[test]
fn test_nested_containers_use_absolute_positions() {
    let app = lay_out(
        r#"{ "root": {
            "kind": "column", "width": "400px", "height": "300px",
            "arrangement": { "spacing": "20px" },
            "children": [
                { "name": "banner", "width": "400px", "height": "100px" },
                { "name": "toolbar", "kind": "row", "width": "400px", "height": "50px",
                  "children": [
                      { "name": "open", "width": "100px", "height": "50px" },
                      { "name": "save", "width": "100px", "height": "50px" }
                  ] }
            ]
        } }"#,
        VIEWPORT,
    );

    assert_eq!(bounds(&app, "toolbar"), Rect::new(0.0, 120.0, 400.0, 50.0));
    assert_eq!(bounds(&app, "open"), Rect::new(0.0, 120.0, 100.0, 50.0));
    assert_eq!(bounds(&app, "save"), Rect::new(100.0, 120.0, 100.0, 50.0));
}

#[test]
fn test_layout_is_idempotent() {
    let mut app = lay_out(
        r#"{ "root": {
            "kind": "row", "width": "333px", "height": "40px",
            "arrangement": { "spacing": "7px", "justification": "space_evenly" },
            "children": [
                { "name": "a", "width": "31px", "height": "40px" },
                { "name": "b", "sizing": { "type": "row_growth", "factor": 0.5 } },
                { "name": "c", "width": "17px", "height": "40px" }
            ]
        } }"#,
        VIEWPORT,
    );
    let before: Vec<Rect> = ["a", "b", "c"].iter().map(|name| bounds(&app, name)).collect();

    app.mark_needs_layout();
    app.update(std::time::Duration::ZERO).unwrap();
    let after: Vec<Rect> = ["a", "b", "c"].iter().map(|name| bounds(&app, name)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_pointer_moves_between_children() {
    let mut app = lay_out(
        r#"{ "root": {
            "name": "row", "kind": "row", "width": "300px", "height": "40px",
            "arrangement": { "spacing": "10px" },
            "children": [
                { "name": "a", "width": "50px", "height": "40px" },
                { "name": "b", "width": "50px", "height": "40px" },
                { "name": "c", "width": "50px", "height": "40px" }
            ]
        } }"#,
        VIEWPORT,
    );
    let b = app.tree().find_by_name("b").unwrap();
    let c = app.tree().find_by_name("c").unwrap();

    app.handle_input(InputEvent::MouseMove { position: Vec2::new(70.0, 20.0) }).unwrap();
    let events = app.drain_pointer_events();
    assert_eq!(events[0].target, b);
    assert_eq!(events[0].kind, PointerEventKind::Enter);
    assert_eq!(events[0].local, Vec2::new(10.0, 20.0));

    app.handle_input(InputEvent::MouseMove { position: Vec2::new(130.0, 20.0) }).unwrap();
    let events = app.drain_pointer_events();
    let exit = events.iter().position(|e| e.target == b && e.kind == PointerEventKind::Exit);
    let enter = events.iter().position(|e| e.target == c && e.kind == PointerEventKind::Enter);
    assert!(exit.is_some() && enter.is_some());
    assert!(exit < enter);
}

#[test]
fn test_frame_draws_backgrounds_in_order() {
    let mut app = lay_out(
        r#"{ "root": {
            "kind": "row", "width": "300px", "height": "40px", "background": [0.0, 0.0, 0.0, 1.0],
            "children": [
                { "name": "a", "width": "50px", "height": "40px", "background": [1.0, 0.0, 0.0, 1.0] },
                { "name": "b", "width": "50px", "height": "40px" }
            ]
        } }"#,
        VIEWPORT,
    );
    app.render().unwrap();

    let frame = app.renderer().backend().last_frame();
    assert_eq!(frame.len(), 2);
    assert_eq!(
        frame[1],
        RenderCommand::DrawRect {
            position: Vec2::ZERO,
            size: Vec2::new(50.0, 40.0),
            color: glam::Vec4::new(1.0, 0.0, 0.0, 1.0),
        }
    );
}
