use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;

use super::enums::{
    Align, Dimension, Direction, Display, Edge, FlexDirection, Justify, Overflow, PositionType,
    Wrap,
};
use super::value::Value;

/// One value per [`Edge`], including the shorthand slots.
///
/// Serialises as a map of the edges that are set, e.g. `{"all": 4, "left": 8}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "EdgeMap", into = "EdgeMap")]
pub struct Edges([Value; Edge::COUNT]);

type EdgeMap = BTreeMap<Edge, Value>;

impl Edges {
    pub fn get(&self, edge: Edge) -> Value {
        self.0[edge.index()]
    }

    /// Stores `value`, returning whether anything changed.
    pub(crate) fn set(&mut self, edge: Edge, value: Value) -> bool {
        let slot = &mut self.0[edge.index()];
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Resolves shorthands for `edge`: the edge itself, then its axis group
    /// (vertical for top/bottom, horizontal for left/right/start/end), then
    /// `all`. Start and end never fall back to `default`.
    pub fn computed(&self, edge: Edge, default: Value) -> Value {
        let own = self.get(edge);
        if own.is_defined() {
            return own;
        }

        let vertical = self.get(Edge::Vertical);
        if matches!(edge, Edge::Top | Edge::Bottom) && vertical.is_defined() {
            return vertical;
        }

        let horizontal = self.get(Edge::Horizontal);
        if matches!(edge, Edge::Left | Edge::Right | Edge::Start | Edge::End)
            && horizontal.is_defined()
        {
            return horizontal;
        }

        let all = self.get(Edge::All);
        if all.is_defined() {
            return all;
        }

        if matches!(edge, Edge::Start | Edge::End) {
            return Value::Undefined;
        }

        default
    }
}

impl Index<Edge> for Edges {
    type Output = Value;

    fn index(&self, edge: Edge) -> &Value {
        &self.0[edge.index()]
    }
}

impl From<EdgeMap> for Edges {
    fn from(map: EdgeMap) -> Self {
        let mut edges = Edges::default();
        for (edge, value) in map {
            edges.0[edge.index()] = value;
        }
        edges
    }
}

impl From<Edges> for EdgeMap {
    fn from(edges: Edges) -> Self {
        Edge::ALL_EDGES
            .iter()
            .filter(|edge| edges.get(**edge).is_defined())
            .map(|edge| (*edge, edges.get(*edge)))
            .collect()
    }
}

/// Caller-owned style record for one node.
///
/// Read it through [`Node::style`](crate::Node::style); change it through
/// [`StyleMut`](crate::StyleMut) so the node is only dirtied on real changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_grow: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_shrink: Option<f32>,
    pub flex_basis: Value,
    pub margin: Edges,
    pub position: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub width: Value,
    pub height: Value,
    pub min_width: Value,
    pub min_height: Value,
    pub max_width: Value,
    pub max_height: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f32>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Value::Auto,
            margin: Edges::default(),
            position: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            width: Value::Auto,
            height: Value::Auto,
            min_width: Value::Undefined,
            min_height: Value::Undefined,
            max_width: Value::Undefined,
            max_height: Value::Undefined,
            aspect_ratio: None,
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Browser-compatible defaults: rows, with stretched line packing.
    pub fn web() -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            ..Self::default()
        }
    }

    pub fn dimension(&self, dim: Dimension) -> Value {
        match dim {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    pub fn min_dimension(&self, dim: Dimension) -> Value {
        match dim {
            Dimension::Width => self.min_width,
            Dimension::Height => self.min_height,
        }
    }

    pub fn max_dimension(&self, dim: Dimension) -> Value {
        match dim {
            Dimension::Width => self.max_width,
            Dimension::Height => self.max_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(Edge, Value)]) -> Edges {
        let mut edges = Edges::default();
        for (edge, value) in pairs {
            edges.set(*edge, *value);
        }
        edges
    }

    #[test]
    fn concrete_edge_beats_shorthands() {
        let e = edges(&[
            (Edge::All, Value::Point(1.0)),
            (Edge::Vertical, Value::Point(2.0)),
            (Edge::Top, Value::Point(3.0)),
        ]);
        assert_eq!(e.computed(Edge::Top, Value::ZERO), Value::Point(3.0));
        assert_eq!(e.computed(Edge::Bottom, Value::ZERO), Value::Point(2.0));
        assert_eq!(e.computed(Edge::Left, Value::ZERO), Value::Point(1.0));
    }

    #[test]
    fn horizontal_applies_to_logical_edges() {
        let e = edges(&[(Edge::Horizontal, Value::Point(5.0))]);
        assert_eq!(e.computed(Edge::Start, Value::Undefined), Value::Point(5.0));
        assert_eq!(e.computed(Edge::Right, Value::ZERO), Value::Point(5.0));
        assert_eq!(e.computed(Edge::Top, Value::ZERO), Value::ZERO);
    }

    #[test]
    fn start_and_end_ignore_default() {
        let e = Edges::default();
        assert_eq!(e.computed(Edge::End, Value::ZERO), Value::Undefined);
        assert_eq!(e.computed(Edge::Bottom, Value::ZERO), Value::ZERO);
    }

    #[test]
    fn set_reports_changes_only() {
        let mut e = Edges::default();
        assert!(e.set(Edge::Left, Value::Point(4.0)));
        assert!(!e.set(Edge::Left, Value::Point(4.0)));
        assert!(e.set(Edge::Left, Value::Percent(4.0)));
    }

    #[test]
    fn style_deserializes_from_sparse_json() {
        let style: Style = serde_json::from_str(
            r#"{"flex_direction": "row", "width": "50%", "margin": {"all": 4, "left": 8}}"#,
        )
        .unwrap();
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.width, Value::Percent(50.0));
        assert_eq!(style.height, Value::Auto);
        assert_eq!(style.margin.computed(Edge::Right, Value::ZERO), Value::Point(4.0));
        assert_eq!(style.margin[Edge::Left], Value::Point(8.0));
        assert_eq!(style.align_items, Align::Stretch);
    }

    #[test]
    fn web_defaults_switch_direction_and_packing() {
        let style = Style::web();
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.align_content, Align::Stretch);
        assert_ne!(style, Style::default());
    }
}
