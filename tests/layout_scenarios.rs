use std::cell::Cell;
use std::rc::Rc;

use room_flex::{
    Align, Config, Direction, Edge, FlexDirection, Justify, LayoutTree, LogLevel, Logger,
    MemorySink, NodeId, NodeTemplate, PositionType, Size, Unit, Value, Wrap,
};
use serde_json::json;

fn row(tree: &mut LayoutTree, width: f32, height: f32) -> NodeId {
    let id = tree.new_node();
    tree.style_mut(id)
        .unwrap()
        .set_flex_direction(FlexDirection::Row)
        .set_width(width)
        .set_height(height);
    id
}

fn sized_child(tree: &mut LayoutTree, parent: NodeId, width: f32, height: f32) -> NodeId {
    let id = tree.new_node();
    tree.style_mut(id).unwrap().set_width(width).set_height(height);
    tree.append_child(parent, id).unwrap();
    id
}

fn rect(tree: &LayoutTree, id: NodeId) -> (f32, f32, f32, f32) {
    let layout = tree.layout(id).unwrap();
    (layout.left(), layout.top(), layout.width(), layout.height())
}

fn layout(tree: &mut LayoutTree, root: NodeId) {
    tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();
}

#[test]
fn equal_grow_children_split_a_row() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.style_mut(root)
        .unwrap()
        .set_flex_direction(FlexDirection::Row)
        .set_width(300.0);
    let mut children = Vec::new();
    for _ in 0..2 {
        let child = tree.new_node();
        tree.style_mut(child).unwrap().set_flex_grow(1.0).set_flex_basis(0.0);
        tree.append_child(root, child).unwrap();
        children.push(child);
    }
    layout(&mut tree, root);

    assert_eq!(tree.layout(children[0]).unwrap().width(), 150.0);
    assert_eq!(tree.layout(children[1]).unwrap().width(), 150.0);
    assert_eq!(tree.layout(children[1]).unwrap().left(), 150.0);
}

#[test]
fn space_between_spreads_a_column() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.style_mut(root)
        .unwrap()
        .set_justify_content(Justify::SpaceBetween)
        .set_height(100.0);
    let children: Vec<NodeId> = (0..3)
        .map(|_| {
            let child = tree.new_node();
            tree.style_mut(child).unwrap().set_height(10.0);
            tree.append_child(root, child).unwrap();
            child
        })
        .collect();
    layout(&mut tree, root);

    let tops: Vec<f32> = children
        .iter()
        .map(|&child| tree.layout(child).unwrap().top())
        .collect();
    assert_eq!(tops, vec![0.0, 45.0, 90.0]);
}

#[test]
fn setting_an_unchanged_width_keeps_the_node_clean() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 100.0, 100.0);
    let child = sized_child(&mut tree, root, 20.0, 20.0);
    layout(&mut tree, root);
    assert!(!tree.is_dirty(child).unwrap());

    tree.style_mut(child).unwrap().set_width(20.0);
    assert!(!tree.is_dirty(child).unwrap());
    assert!(!tree.is_dirty(root).unwrap());

    tree.style_mut(child).unwrap().set_width(25.0);
    assert!(tree.is_dirty(child).unwrap());
    assert!(tree.is_dirty(root).unwrap());
}

#[test]
fn repeated_layout_reuses_the_measurement() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 200.0, 100.0);
    tree.style_mut(root).unwrap().set_align_items(Align::FlexStart);
    let text = tree.new_node();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    tree.set_measure_func(
        text,
        Some(Box::new(move |_, _, _, _, _| {
            counter.set(counter.get() + 1);
            Size::new(40.0, 10.0)
        })),
    )
    .unwrap();
    tree.append_child(root, text).unwrap();

    layout(&mut tree, root);
    let first = calls.get();
    assert!(first >= 1);
    assert_eq!(rect(&tree, text), (0.0, 0.0, 40.0, 10.0));

    layout(&mut tree, root);
    assert_eq!(calls.get(), first);

    tree.mark_dirty(text).unwrap();
    layout(&mut tree, root);
    assert!(calls.get() > first);
}

#[test]
fn exact_constraints_skip_the_measure_function() {
    let mut tree = LayoutTree::new();
    let text = tree.new_node();
    tree.style_mut(text).unwrap().set_width(50.0).set_height(20.0);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    tree.set_measure_func(
        text,
        Some(Box::new(move |_, _, _, _, _| {
            counter.set(counter.get() + 1);
            Size::new(10.0, 10.0)
        })),
    )
    .unwrap();

    layout(&mut tree, text);
    layout(&mut tree, text);
    assert!(calls.get() <= 1);
    assert_eq!(rect(&tree, text), (0.0, 0.0, 50.0, 20.0));
}

fn mixed_template() -> NodeTemplate {
    NodeTemplate::from_value(json!({
        "style": {
            "flex_direction": "row",
            "flex_wrap": "wrap",
            "width": 230,
            "padding": {"all": 7},
            "border": {"left": 3}
        },
        "children": [
            {"style": {"width": "40%", "height": 30, "margin": {"right": 4}}},
            {"style": {"flex_grow": 1, "min_width": 60}, "measure": {"width": 35, "height": 18}},
            {"style": {"width": 120, "aspect_ratio": 2}},
            {"style": {
                "position_type": "absolute",
                "position": {"right": 5, "bottom": 5},
                "width": 10,
                "height": 10
            }},
            {"style": {"display": "none", "width": 500}}
        ]
    }))
    .unwrap()
}

#[test]
fn layout_is_deterministic() {
    let template = mixed_template();
    let mut tree = LayoutTree::new();
    let root = tree.instantiate(&template).unwrap();

    layout(&mut tree, root);
    let first = tree.snapshot(root).unwrap();
    layout(&mut tree, root);
    assert_eq!(tree.snapshot(root).unwrap(), first);

    let mut fresh = LayoutTree::new();
    let other = fresh.instantiate(&template).unwrap();
    layout(&mut fresh, other);
    assert_eq!(fresh.snapshot(other).unwrap(), first);
}

#[test]
fn fractional_root_rounds_the_same_on_every_pass() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.style_mut(root)
        .unwrap()
        .set_flex_direction(FlexDirection::Row)
        .set_width(100.4)
        .set_height(50.6);
    let child = tree.new_node();
    tree.style_mut(child).unwrap().set_flex_grow(1.0);
    tree.append_child(root, child).unwrap();

    let sizes = |tree: &LayoutTree| {
        let root = tree.layout(root).unwrap();
        (root.width(), root.height(), tree.layout(child).unwrap().width())
    };
    layout(&mut tree, root);
    let first = sizes(&tree);
    assert_eq!(first, (100.0, 51.0, 100.0));

    layout(&mut tree, root);
    assert_eq!(sizes(&tree), first);
    assert_eq!(tree.snapshot(root).unwrap().width, 100.0);
}

#[test]
fn changing_one_leaf_leaves_sibling_subtrees_cached() {
    let sink = MemorySink::new();
    let mut config = Config::new()
        .with_logger(Logger::new(sink.clone()))
        .with_trace_changes(true);
    config.enable_metrics();
    let mut tree = LayoutTree::with_config(config);

    let root = row(&mut tree, 300.0, 100.0);
    let left = tree.new_node();
    let right = tree.new_node();
    for side in [left, right] {
        tree.style_mut(side).unwrap().set_width(150.0).set_height(100.0);
        tree.append_child(root, side).unwrap();
    }
    let changed = sized_child(&mut tree, left, 50.0, 10.0);
    sized_child(&mut tree, left, 50.0, 10.0);
    let untouched: Vec<NodeId> = (0..3)
        .map(|_| sized_child(&mut tree, right, 40.0, 10.0))
        .collect();

    layout(&mut tree, root);
    let first_pass = tree.config().metrics_snapshot().unwrap();
    sink.clear();

    tree.style_mut(changed).unwrap().set_height(20.0);
    layout(&mut tree, root);
    let second_pass = tree.config().metrics_snapshot().unwrap();

    let entered = |id: NodeId| {
        sink.events().iter().any(|event| {
            event.message.starts_with("enter")
                && event.fields.get("node") == Some(&json!(id.to_string()))
        })
    };
    assert!(entered(changed));
    assert!(entered(left));
    assert!(entered(root));
    assert!(!entered(right));
    assert!(untouched.iter().all(|&id| !entered(id)));

    let visits = second_pass.node_visits - first_pass.node_visits;
    assert!(visits < first_pass.node_visits);
    assert_eq!(tree.layout(changed).unwrap().height(), 20.0);
}

#[test]
fn padding_and_border_floor_the_size() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 100.0, 100.0);
    tree.style_mut(root).unwrap().set_align_items(Align::FlexStart);
    let child = sized_child(&mut tree, root, 5.0, 5.0);
    tree.style_mut(child)
        .unwrap()
        .set_padding(Edge::All, 10.0)
        .set_border(Edge::All, 2.0);
    layout(&mut tree, root);

    let layout = tree.layout(child).unwrap();
    assert_eq!(layout.width(), 24.0);
    assert_eq!(layout.height(), 24.0);

    let template = mixed_template();
    let root = tree.instantiate(&template).unwrap();
    tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let layout = tree.layout(id).unwrap();
        let horizontal = layout.padding(Edge::Left).unwrap()
            + layout.padding(Edge::Right).unwrap()
            + layout.border(Edge::Left).unwrap()
            + layout.border(Edge::Right).unwrap();
        let vertical = layout.padding(Edge::Top).unwrap()
            + layout.padding(Edge::Bottom).unwrap()
            + layout.border(Edge::Top).unwrap()
            + layout.border(Edge::Bottom).unwrap();
        assert!(layout.width() >= horizontal, "{id} narrower than its padding");
        assert!(layout.height() >= vertical, "{id} shorter than its padding");
        stack.extend_from_slice(tree.children(id).unwrap());
    }
}

#[test]
fn percent_styles_read_back_unresolved() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 200.0, 80.0);
    let child = tree.new_node();
    tree.style_mut(child)
        .unwrap()
        .set_width_percent(25.0)
        .set_margin_percent(Edge::Left, 10.0);
    tree.append_child(root, child).unwrap();
    layout(&mut tree, root);

    let style = tree.style(child).unwrap();
    assert_eq!(style.width, Value::Percent(25.0));
    assert_eq!(style.width.unit(), Unit::Percent);
    assert_eq!(style.margin.get(Edge::Left), Value::Percent(10.0));

    let layout = tree.layout(child).unwrap();
    assert_eq!(layout.width(), 50.0);
    assert_eq!(layout.left(), 20.0);
    assert_eq!(layout.margin(Edge::Left).unwrap(), 20.0);
}

#[test]
fn flex_end_line_ends_on_the_inner_edge() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 200.0, 40.0);
    tree.style_mut(root)
        .unwrap()
        .set_justify_content(Justify::FlexEnd)
        .set_padding(Edge::Horizontal, 10.0);
    let first = sized_child(&mut tree, root, 30.0, 10.0);
    let second = sized_child(&mut tree, root, 40.0, 10.0);
    tree.style_mut(second).unwrap().set_margin(Edge::Horizontal, 5.0);
    layout(&mut tree, root);

    let first = tree.layout(first).unwrap();
    let second = tree.layout(second).unwrap();
    let outer = first.width() + second.width() + 10.0;
    let leading = first.left() - 10.0;
    assert_eq!(outer + leading, 180.0);
    assert_eq!(second.left() + second.width() + 5.0, 190.0);
}

#[test]
fn growing_children_fill_the_inner_main_size() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 250.0, 40.0);
    tree.style_mut(root).unwrap().set_padding(Edge::All, 5.0);
    let mut children = Vec::new();
    for (grow, basis) in [(1.0, 20.0), (3.0, 0.0), (0.0, 30.0)] {
        let child = tree.new_node();
        tree.style_mut(child)
            .unwrap()
            .set_flex_grow(grow)
            .set_flex_basis(basis)
            .set_margin(Edge::Right, 2.0);
        tree.append_child(root, child).unwrap();
        children.push(child);
    }
    layout(&mut tree, root);

    let total: f32 = children
        .iter()
        .map(|&child| tree.layout(child).unwrap().width() + 2.0)
        .sum();
    assert_eq!(total, 240.0);
    assert_eq!(tree.layout(children[2]).unwrap().width(), 30.0);
}

#[test]
fn space_between_lines_in_a_wrapping_row() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 100.0, 100.0);
    tree.style_mut(root)
        .unwrap()
        .set_flex_wrap(Wrap::Wrap)
        .set_align_content(Align::SpaceBetween);
    let items: Vec<NodeId> = (0..3)
        .map(|_| sized_child(&mut tree, root, 40.0, 10.0))
        .collect();
    layout(&mut tree, root);

    assert_eq!(rect(&tree, items[0]), (0.0, 0.0, 40.0, 10.0));
    assert_eq!(rect(&tree, items[1]), (40.0, 0.0, 40.0, 10.0));
    assert_eq!(rect(&tree, items[2]), (0.0, 90.0, 40.0, 10.0));
}

#[test]
fn absolute_children_use_insets() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.style_mut(root)
        .unwrap()
        .set_width(200.0)
        .set_height(100.0)
        .set_padding(Edge::All, 10.0);

    let corner = tree.new_node();
    tree.style_mut(corner)
        .unwrap()
        .set_position_type(PositionType::Absolute)
        .set_position(Edge::Right, 10.0)
        .set_position(Edge::Bottom, 10.0)
        .set_width(50.0)
        .set_height(20.0);
    let pinned = tree.new_node();
    tree.style_mut(pinned)
        .unwrap()
        .set_position_type(PositionType::Absolute)
        .set_position(Edge::Left, 15.0)
        .set_position(Edge::Top, 5.0)
        .set_width(10.0)
        .set_height(10.0);
    let spanning = tree.new_node();
    tree.style_mut(spanning)
        .unwrap()
        .set_position_type(PositionType::Absolute)
        .set_position(Edge::Left, 20.0)
        .set_position(Edge::Right, 30.0)
        .set_height(5.0);
    for child in [corner, pinned, spanning] {
        tree.append_child(root, child).unwrap();
    }
    layout(&mut tree, root);

    assert_eq!(rect(&tree, corner), (140.0, 70.0, 50.0, 20.0));
    assert_eq!(rect(&tree, pinned), (15.0, 5.0, 10.0, 10.0));
    let spanning = tree.layout(spanning).unwrap();
    assert_eq!(spanning.left(), 20.0);
    assert_eq!(spanning.width(), 150.0);
}

#[test]
fn baseline_alignment_lines_up_first_baselines() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 200.0, 100.0);
    tree.style_mut(root).unwrap().set_align_items(Align::Baseline);
    let block = sized_child(&mut tree, root, 20.0, 40.0);
    let text = tree.new_node();
    tree.set_measure_func(text, Some(Box::new(|_, _, _, _, _| Size::new(30.0, 12.0))))
        .unwrap();
    tree.set_baseline_func(text, Some(Box::new(|_, _, _| 8.0)))
        .unwrap();
    tree.append_child(root, text).unwrap();
    layout(&mut tree, root);

    assert_eq!(tree.layout(block).unwrap().top(), 0.0);
    assert_eq!(rect(&tree, text), (20.0, 32.0, 30.0, 12.0));
}

#[test]
fn right_to_left_rows_start_at_the_right_edge() {
    let mut tree = LayoutTree::new();
    let root = row(&mut tree, 200.0, 50.0);
    let first = sized_child(&mut tree, root, 50.0, 10.0);
    let second = sized_child(&mut tree, root, 30.0, 10.0);
    tree.style_mut(first).unwrap().set_margin(Edge::Start, 10.0);
    tree.calculate_layout(root, None, None, Direction::Rtl).unwrap();

    let first = tree.layout(first).unwrap();
    assert_eq!(first.direction(), Direction::Rtl);
    assert_eq!(first.left(), 140.0);
    assert_eq!(first.margin(Edge::Right).unwrap(), 10.0);
    assert_eq!(first.margin(Edge::Left).unwrap(), 0.0);
    assert_eq!(tree.layout(second).unwrap().left(), 110.0);
}

#[test]
fn rounding_keeps_siblings_gapless() {
    let build = |config: Config| {
        let mut tree = LayoutTree::with_config(config);
        let root = row(&mut tree, 100.0, 10.0);
        let children: Vec<NodeId> = (0..3)
            .map(|_| {
                let child = tree.new_node();
                tree.style_mut(child).unwrap().set_flex_grow(1.0);
                tree.append_child(root, child).unwrap();
                child
            })
            .collect();
        layout(&mut tree, root);
        children
            .iter()
            .map(|&child| {
                let layout = tree.layout(child).unwrap();
                (layout.left(), layout.width())
            })
            .collect::<Vec<_>>()
    };

    let rounded = build(Config::new());
    assert_eq!(rounded, vec![(0.0, 33.0), (33.0, 34.0), (67.0, 33.0)]);

    let exact = build(Config::new().with_point_scale_factor(0.0).unwrap());
    assert!((exact[1].1 - 100.0 / 3.0).abs() < 1e-3);
}

#[test]
fn hidden_children_take_no_space() {
    let template = NodeTemplate::from_value(json!({
        "style": {"flex_direction": "row", "width": 90, "height": 10},
        "children": [
            {"style": {"flex_grow": 1}},
            {"style": {"flex_grow": 1, "display": "none"}, "children": [{"style": {"width": 5}}]},
            {"style": {"flex_grow": 1}}
        ]
    }))
    .unwrap();
    let mut tree = LayoutTree::new();
    let root = tree.instantiate(&template).unwrap();
    layout(&mut tree, root);

    let snapshot = tree.snapshot(root).unwrap();
    assert_eq!(snapshot.children[0].width, 45.0);
    assert_eq!(snapshot.children[1].width, 0.0);
    assert_eq!(snapshot.children[1].children[0].width, 0.0);
    assert_eq!(snapshot.children[2].left, 45.0);
}

#[test]
fn nan_measurement_is_logged_and_returned() {
    let sink = MemorySink::new();
    let mut tree = LayoutTree::with_config(Config::new().with_logger(Logger::new(sink.clone())));
    let root = row(&mut tree, 100.0, 100.0);
    let text = tree.new_node();
    tree.set_measure_func(text, Some(Box::new(|_, _, _, _, _| Size::new(f32::NAN, 10.0))))
        .unwrap();
    tree.append_child(root, text).unwrap();

    let result = tree.calculate_layout(root, None, None, Direction::Ltr);
    assert!(matches!(result, Err(room_flex::LayoutError::InvalidMeasurement(id)) if id == text));
    assert_eq!(sink.count(LogLevel::Fatal), 1);
}

#[test]
fn measurement_cache_wraps_after_sixteen_constraints() {
    let sink = MemorySink::new();
    let mut config = Config::new()
        .with_logger(Logger::new(sink.clone()))
        .with_trace_changes(true);
    config.enable_metrics();
    let mut tree = LayoutTree::with_config(config);
    let root = row(&mut tree, 100.0, 50.0);
    tree.style_mut(root).unwrap().set_align_items(Align::FlexStart);
    let text = tree.new_node();
    tree.set_measure_func(text, Some(Box::new(|_, _, _, _, _| Size::new(30.0, 10.0))))
        .unwrap();
    tree.append_child(root, text).unwrap();

    for width in 100..140 {
        tree.style_mut(root).unwrap().set_width(width as f32);
        layout(&mut tree, root);
        assert_eq!(rect(&tree, text), (0.0, 0.0, 30.0, 10.0));
        assert_eq!(tree.layout(root).unwrap().width(), width as f32);
    }

    let metrics = tree.config().metrics_snapshot().unwrap();
    assert!(metrics.cache_overflows > 0);
    assert!(sink.events().iter().any(|event| {
        event.level == LogLevel::Verbose
            && event.message == "measurement cache full, wrapping"
            && event.fields.get("node") == Some(&json!(text.to_string()))
    }));
}

#[test]
fn text_leaves_never_round_narrower() {
    let build = |measured: bool| {
        let mut tree = LayoutTree::new();
        let root = row(&mut tree, 200.0, 50.0);
        tree.style_mut(root).unwrap().set_align_items(Align::FlexStart);
        sized_child(&mut tree, root, 10.6, 10.0);
        let leaf = tree.new_node();
        if measured {
            tree.set_measure_func(leaf, Some(Box::new(|_, _, _, _, _| Size::new(20.4, 10.0))))
                .unwrap();
        } else {
            tree.style_mut(leaf).unwrap().set_width(20.4).set_height(10.0);
        }
        tree.append_child(root, leaf).unwrap();
        layout(&mut tree, root);
        rect(&tree, leaf)
    };

    let (left, _, width, _) = build(true);
    assert_eq!(left, 10.0);
    assert_eq!(width, 21.0);
    assert!(width >= 20.4);

    let (left, _, width, _) = build(false);
    assert_eq!(left, 11.0);
    assert_eq!(width, 20.0);
}
