use criterion::{Criterion, black_box, criterion_group, criterion_main};
use room_flex::{
    Align, Direction, Edge, FlexDirection, LayoutTree, MeasureMode, NodeId, Result, Size, Wrap,
};
use unicode_width::UnicodeWidthStr;

const LINE_HEIGHT: f32 = 16.0;
const CELL_WIDTH: f32 = 7.0;

const LABELS: &[&str] = &[
    "inbox",
    "チャット",
    "a considerably longer label that has to wrap",
    "status: ok",
    "⚠ warnings",
];

/// Greedy word wrap over terminal cell widths.
fn measure_text(text: &'static str) -> impl FnMut(NodeId, f32, MeasureMode, f32, MeasureMode) -> Size {
    move |_, width, width_mode, _, _| {
        let natural = text.width() as f32 * CELL_WIDTH;
        if width_mode == MeasureMode::Undefined || natural <= width {
            return Size::new(natural, LINE_HEIGHT);
        }
        let limit = (width / CELL_WIDTH).max(1.0) as usize;
        let mut lines = 1;
        let mut used = 0;
        for word in text.split(' ') {
            let cells = word.width();
            if used > 0 && used + 1 + cells > limit {
                lines += 1;
                used = cells;
            } else {
                used += if used > 0 { cells + 1 } else { cells };
            }
        }
        let width = match width_mode {
            MeasureMode::Exactly => width,
            _ => (limit * CELL_WIDTH as usize) as f32,
        };
        Size::new(width, lines as f32 * LINE_HEIGHT)
    }
}

/// A dashboard-like tree: rows of wrapping cards, each holding measured labels.
fn build_tree(rows: usize, cards: usize) -> Result<(LayoutTree, NodeId, Vec<NodeId>)> {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.style_mut(root)?.set_width(1280.0).set_padding(Edge::All, 8.0);
    let mut labels = Vec::new();

    for _ in 0..rows {
        let row = tree.new_node();
        tree.style_mut(row)?
            .set_flex_direction(FlexDirection::Row)
            .set_flex_wrap(Wrap::Wrap)
            .set_align_items(Align::FlexStart)
            .set_margin(Edge::All, 4.0);
        tree.append_child(root, row)?;

        for card_index in 0..cards {
            let card = tree.new_node();
            tree.style_mut(card)?
                .set_flex_grow(1.0)
                .set_flex_basis(120.0)
                .set_min_width(80.0)
                .set_padding(Edge::All, 6.0);
            tree.append_child(row, card)?;

            for label_index in 0..2 {
                let label = tree.new_node();
                let text = LABELS[(card_index + label_index) % LABELS.len()];
                tree.set_measure_func(label, Some(Box::new(measure_text(text))))?;
                tree.append_child(card, label)?;
                labels.push(label);
            }
        }
    }
    Ok((tree, root, labels))
}

fn full_layout(c: &mut Criterion) {
    c.bench_function("full_layout_40x12", |b| {
        b.iter(|| {
            let (mut tree, root, _) = build_tree(40, 12).expect("tree");
            tree.calculate_layout(root, black_box(None), None, Direction::Ltr)
                .expect("layout");
        });
    });
}

fn relayout_one_leaf(c: &mut Criterion) {
    let (mut tree, root, labels) = build_tree(40, 12).expect("tree");
    tree.calculate_layout(root, None, None, Direction::Ltr)
        .expect("layout");
    let leaf = labels[labels.len() / 2];
    c.bench_function("relayout_one_dirty_leaf", |b| {
        b.iter(|| {
            tree.mark_dirty(black_box(leaf)).expect("dirty");
            tree.calculate_layout(root, None, None, Direction::Ltr)
                .expect("layout");
        });
    });
}

fn clean_relayout(c: &mut Criterion) {
    let (mut tree, root, _) = build_tree(40, 12).expect("tree");
    tree.calculate_layout(root, None, None, Direction::Ltr)
        .expect("layout");
    c.bench_function("relayout_clean_tree", |b| {
        b.iter(|| {
            tree.calculate_layout(black_box(root), None, None, Direction::Ltr)
                .expect("layout");
        });
    });
}

criterion_group!(benches, full_layout, relayout_one_leaf, clean_relayout);
criterion_main!(benches);
