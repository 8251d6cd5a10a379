use std::fmt::Write;

use crate::config::Config;
use crate::error::Result;
use crate::logging::LogLevel;
use crate::style::{Dimension, Edge, Edges, Style, Value, float_eq};
use crate::tree::{LayoutTree, Node, NodeId};

const TARGET: &str = "room_flex::print";

/// What [`LayoutTree::print`] includes for each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Computed position and size.
    pub layout: bool,
    /// Style properties that differ from the defaults.
    pub style: bool,
    /// Recurse into children.
    pub children: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            layout: true,
            style: true,
            children: true,
        }
    }
}

impl LayoutTree {
    /// Renders the subtree at `id` as nested `<div>` elements, one per node,
    /// for debugging and test failure output.
    pub fn print(&self, id: NodeId, options: PrintOptions) -> Result<String> {
        self.node(id)?;
        let mut out = String::new();
        self.write_node(&mut out, id, options, 0);
        Ok(out)
    }

    /// Logs the full rendering of `root` at `Debug` level.
    pub(crate) fn log_tree(&self, config: &Config, root: NodeId) {
        let mut out = String::new();
        self.write_node(&mut out, root, PrintOptions::default(), 0);
        config.log(LogLevel::Debug, TARGET, Some(root), &out);
    }

    fn write_node(&self, out: &mut String, id: NodeId, options: PrintOptions, level: usize) {
        let node = self.at(id);
        indent(out, level);
        out.push_str("<div ");

        if options.layout {
            let layout = &node.layout;
            let _ = write!(
                out,
                "layout=\"width: {}; height: {}; top: {}; left: {};\" ",
                layout.dimensions[Dimension::Width.index()],
                layout.dimensions[Dimension::Height.index()],
                layout.position[Edge::Top.index()],
                layout.position[Edge::Left.index()],
            );
        }

        if options.style {
            out.push_str("style=\"");
            write_style(out, node);
            out.push_str("\" ");
            if node.measure.is_some() {
                out.push_str("has-custom-measure=\"true\"");
            }
        }
        out.push('>');

        if options.children && !node.children.is_empty() {
            for &child in &node.children {
                out.push('\n');
                self.write_node(out, child, options, level + 1);
            }
            out.push('\n');
            indent(out, level);
        }
        out.push_str("</div>");
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_style(out: &mut String, node: &Node) {
    let style = &node.style;
    let defaults = Style::default();

    let mut keyword = |name: &str, value: &str, default: &str| {
        if value != default {
            let _ = write!(out, "{name}: {value}; ");
        }
    };
    keyword(
        "flex-direction",
        style.flex_direction.as_str(),
        defaults.flex_direction.as_str(),
    );
    keyword(
        "justify-content",
        style.justify_content.as_str(),
        defaults.justify_content.as_str(),
    );
    keyword("align-items", style.align_items.as_str(), defaults.align_items.as_str());
    keyword(
        "align-content",
        style.align_content.as_str(),
        defaults.align_content.as_str(),
    );
    keyword("align-self", style.align_self.as_str(), defaults.align_self.as_str());

    for (name, factor) in [
        ("flex-grow", style.flex_grow),
        ("flex-shrink", style.flex_shrink),
    ] {
        if let Some(factor) = factor {
            let _ = write!(out, "{name}: {factor}; ");
        }
    }
    write_value_unless_auto(out, "flex-basis", style.flex_basis);
    if let Some(flex) = style.flex {
        let _ = write!(out, "flex: {flex}; ");
    }

    let mut keyword = |name: &str, value: &str, default: &str| {
        if value != default {
            let _ = write!(out, "{name}: {value}; ");
        }
    };
    keyword("flex-wrap", style.flex_wrap.as_str(), defaults.flex_wrap.as_str());
    keyword("overflow", style.overflow.as_str(), defaults.overflow.as_str());
    keyword("display", style.display.as_str(), defaults.display.as_str());

    write_edges(out, "margin", &style.margin);
    write_edges(out, "padding", &style.padding);
    write_edges(out, "border", &style.border);

    write_value_unless_auto(out, "width", style.width);
    write_value_unless_auto(out, "height", style.height);
    write_value_unless_auto(out, "max-width", style.max_width);
    write_value_unless_auto(out, "max-height", style.max_height);
    write_value_unless_auto(out, "min-width", style.min_width);
    write_value_unless_auto(out, "min-height", style.min_height);

    if style.position_type != defaults.position_type {
        let _ = write!(out, "position: {}; ", style.position_type);
    }
    for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
        write_value(out, edge.as_str(), style.position.computed(edge, Value::Undefined));
    }
}

fn write_value(out: &mut String, name: &str, value: Value) {
    if value.is_defined() {
        let _ = write!(out, "{name}: {value}; ");
    }
}

fn write_value_unless_auto(out: &mut String, name: &str, value: Value) {
    if !value.is_auto() {
        write_value(out, name, value);
    }
}

fn write_value_unless_zero(out: &mut String, name: &str, value: Value) {
    if !float_eq(value.number(), 0.0) {
        write_value(out, name, value);
    }
}

/// One shorthand when the four physical edges agree, else every set edge.
fn write_edges(out: &mut String, name: &str, edges: &Edges) {
    let left = edges.get(Edge::Left);
    let uniform = [Edge::Top, Edge::Right, Edge::Bottom]
        .into_iter()
        .all(|edge| edges.get(edge).approx_eq(left));
    if uniform {
        write_value_unless_zero(out, name, left);
        return;
    }
    for edge in Edge::ALL_EDGES {
        write_value_unless_zero(out, &format!("{name}-{}", edge.as_str()), edges.get(edge));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Direction, FlexDirection};

    #[test]
    fn prints_layout_and_non_default_style() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        tree.style_mut(root)
            .unwrap()
            .set_flex_direction(FlexDirection::Row)
            .set_width(100.0)
            .set_height(50.0)
            .set_padding(Edge::All, 5.0);
        tree.style_mut(child).unwrap().set_flex_grow(1.0);
        tree.append_child(root, child).unwrap();
        tree.calculate_layout(root, None, None, Direction::Ltr).unwrap();

        let printed = tree.print(root, PrintOptions::default()).unwrap();
        let expected = "<div layout=\"width: 100; height: 50; top: 0; left: 0;\" \
style=\"flex-direction: row; width: 100px; height: 50px; \" >\n  \
<div layout=\"width: 90; height: 40; top: 5; left: 5;\" style=\"flex-grow: 1; \" ></div>\n</div>";
        assert_eq!(printed, expected);
    }

    #[test]
    fn uniform_edges_collapse_to_shorthand() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.style_mut(root)
            .unwrap()
            .set_margin(Edge::Left, 3.0)
            .set_margin(Edge::Top, 3.0)
            .set_margin(Edge::Right, 3.0)
            .set_margin(Edge::Bottom, 3.0);
        let options = PrintOptions {
            layout: false,
            style: true,
            children: false,
        };

        assert_eq!(
            tree.print(root, options).unwrap(),
            "<div style=\"margin: 3px; \" ></div>"
        );
    }
}
