//! Black-box scenarios, exercised only through the public API.

use orbit_flex::prelude::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn row_flex_grow_split() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_flex_direction(FlexDirection::Row);
    root.set_width(Value::Point(200.0));
    root.set_height(Value::Point(100.0));

    let a = Node::new(&config);
    a.set_flex_grow(OptionalFloat::defined(1.0));
    let b = Node::new(&config);
    b.set_flex_grow(OptionalFloat::defined(2.0));
    root.insert_child(a.clone(), 0).unwrap();
    root.insert_child(b.clone(), 1).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(a.computed_left(), 0.0));
    assert!(approx(a.computed_width(), 66.666));
    assert!(approx(a.computed_height(), 100.0));
    assert!(approx(b.computed_left(), 66.666));
    assert!(approx(b.computed_width(), 133.333));
    assert!(approx(b.computed_height(), 100.0));
}

#[test]
fn percent_dimension_with_no_content() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_width(Value::Point(100.0));
    root.set_height(Value::Point(100.0));

    let a = Node::new(&config);
    a.set_width(Value::Percent(50.0));
    root.insert_child(a.clone(), 0).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(a.computed_width(), 50.0));
    assert!(approx(a.computed_height(), 0.0));
}

#[test]
fn rtl_row_reverses_layout_order() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_flex_direction(FlexDirection::Row);
    root.set_direction(Direction::RTL);
    root.set_width(Value::Point(100.0));
    root.set_height(Value::Point(50.0));

    let a = Node::new(&config);
    a.set_width(Value::Point(30.0));
    let b = Node::new(&config);
    b.set_width(Value::Point(40.0));
    root.insert_child(a.clone(), 0).unwrap();
    root.insert_child(b.clone(), 1).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(a.computed_left(), 70.0));
    assert!(approx(b.computed_left(), 30.0));
}

#[test]
fn absolute_positioning_ignores_flow() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_width(Value::Point(100.0));
    root.set_height(Value::Point(100.0));

    let a = Node::new(&config);
    a.set_position_type(PositionType::Absolute);
    a.set_position_edge(Edge::Left, Value::Point(10.0));
    a.set_position_edge(Edge::Top, Value::Point(20.0));
    a.set_width(Value::Point(30.0));
    a.set_height(Value::Point(40.0));
    root.insert_child(a.clone(), 0).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(a.computed_left(), 10.0));
    assert!(approx(a.computed_top(), 20.0));
    assert!(approx(a.computed_width(), 30.0));
    assert!(approx(a.computed_height(), 40.0));
    assert!(approx(root.computed_width(), 100.0));
    assert!(approx(root.computed_height(), 100.0));
}

#[test]
fn aspect_ratio_derives_the_undefined_axis() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_width(Value::Point(100.0));

    let child = Node::new(&config);
    child.set_width(Value::Percent(50.0));
    child.set_aspect_ratio(OptionalFloat::defined(2.0));
    root.insert_child(child.clone(), 0).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(child.computed_width(), 50.0));
    assert!(approx(child.computed_height(), 25.0));
}

#[test]
fn wrap_starts_a_new_line_when_main_axis_overflows() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_flex_direction(FlexDirection::Row);
    root.set_flex_wrap(FlexWrap::Wrap);
    root.set_width(Value::Point(100.0));

    let children: Vec<Node> = (0..3)
        .map(|i| {
            let n = Node::new(&config);
            n.set_width(Value::Point(40.0));
            root.insert_child(n.clone(), i).unwrap();
            n
        })
        .collect();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(children[0].computed_left(), 0.0));
    assert!(approx(children[1].computed_left(), 40.0));
    assert!(approx(children[2].computed_left(), 0.0));
    assert_ne!(children[0].layout().line_index, children[2].layout().line_index);
}

#[test]
fn pixel_grid_rounding_snaps_to_the_nearest_half() {
    let config = Config::new();
    config.borrow_mut().set_point_scale_factor(2.0).unwrap();
    let root = Node::new(&config);
    root.set_width(Value::Point(3.7));

    let child = Node::new(&config);
    child.set_position_type(PositionType::Absolute);
    child.set_position_edge(Edge::Left, Value::Point(1.1));
    child.set_width(Value::Point(1.6));
    root.insert_child(child.clone(), 0).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(root.computed_width(), 3.5));
    assert!(approx(child.computed_left(), 1.0));
    assert!(approx(child.computed_width(), 1.5));
}

#[test]
fn reinvoking_calculate_is_idempotent() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_flex_direction(FlexDirection::Row);
    root.set_width(Value::Point(200.0));
    root.set_height(Value::Point(100.0));
    let a = Node::new(&config);
    a.set_flex_grow(OptionalFloat::defined(1.0));
    root.insert_child(a.clone(), 0).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();
    let first = (a.computed_left(), a.computed_width(), a.computed_height());
    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();
    let second = (a.computed_left(), a.computed_width(), a.computed_height());

    assert_eq!(first, second);
}

#[test]
fn style_round_trips_through_json() {
    let config = Config::new();
    let node = Node::new(&config);
    node.set_flex_direction(FlexDirection::Column);
    node.set_justify_content(JustifyContent::SpaceBetween);
    node.set_width(Value::Percent(75.0));
    node.set_flex_grow(OptionalFloat::defined(2.0));

    let style = node.style();
    let json = serde_json::to_string(&style).unwrap();
    let restored: Style = serde_json::from_str(&json).unwrap();

    assert_eq!(style, restored);
}

#[test]
fn display_none_child_is_zero_sized_and_excluded_from_flow() {
    let config = Config::new();
    let root = Node::new(&config);
    root.set_flex_direction(FlexDirection::Row);
    root.set_width(Value::Point(100.0));
    root.set_height(Value::Point(50.0));

    let hidden = Node::new(&config);
    hidden.set_width(Value::Point(40.0));
    hidden.set_display(Display::None);
    let visible = Node::new(&config);
    visible.set_width(Value::Point(30.0));
    root.insert_child(hidden.clone(), 0).unwrap();
    root.insert_child(visible.clone(), 1).unwrap();

    calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();

    assert!(approx(hidden.computed_width(), 0.0));
    assert!(approx(hidden.computed_height(), 0.0));
    assert!(approx(visible.computed_left(), 0.0));
    assert!(approx(visible.computed_width(), 30.0));
}

#[test]
fn round_trip_remove_child_restores_owner_and_count() {
    let config = Config::new();
    let root = Node::new(&config);
    let child = Node::new(&config);
    let original_count = root.child_count();

    root.insert_child(child.clone(), 0).unwrap();
    root.remove_child(&child);

    assert_eq!(root.child_count(), original_count);
    assert!(child.parent().is_none());
}
