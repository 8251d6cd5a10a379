use crate::style::{
    Align, Direction, Display, Edge, Edges, FlexDirection, Justify, Overflow, PositionType, Style,
    Value, Wrap,
};

use super::core::LayoutTree;
use super::node::NodeId;

/// Chainable style setters for one node.
///
/// Each setter compares against the stored value and dirties the node (and
/// its ancestors) only when something changed.
///
/// ```
/// use room_flex::{FlexDirection, LayoutTree};
///
/// let mut tree = LayoutTree::new();
/// let root = tree.new_node();
/// tree.style_mut(root)?
///     .set_flex_direction(FlexDirection::Row)
///     .set_width(300.0)
///     .set_height_percent(50.0);
/// assert!(tree.is_dirty(root)?);
/// # Ok::<(), room_flex::LayoutError>(())
/// ```
pub struct StyleMut<'a> {
    tree: &'a mut LayoutTree,
    id: NodeId,
}

impl<'a> StyleMut<'a> {
    pub(crate) fn new(tree: &'a mut LayoutTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn style(&self) -> &Style {
        &self.tree.at(self.id).style
    }

    fn update<T: PartialEq>(&mut self, field: fn(&mut Style) -> &mut T, value: T) -> &mut Self {
        let slot = field(&mut self.tree.at_mut(self.id).style);
        if *slot != value {
            *slot = value;
            self.tree.mark_dirty_internal(self.id);
        }
        self
    }

    fn update_edge(
        &mut self,
        group: fn(&mut Style) -> &mut Edges,
        edge: Edge,
        value: Value,
    ) -> &mut Self {
        if group(&mut self.tree.at_mut(self.id).style).set(edge, value) {
            self.tree.mark_dirty_internal(self.id);
        }
        self
    }

    pub fn set_direction(&mut self, direction: Direction) -> &mut Self {
        self.update(|s| &mut s.direction, direction)
    }

    pub fn set_flex_direction(&mut self, flex_direction: FlexDirection) -> &mut Self {
        self.update(|s| &mut s.flex_direction, flex_direction)
    }

    pub fn set_justify_content(&mut self, justify: Justify) -> &mut Self {
        self.update(|s| &mut s.justify_content, justify)
    }

    pub fn set_align_content(&mut self, align: Align) -> &mut Self {
        self.update(|s| &mut s.align_content, align)
    }

    pub fn set_align_items(&mut self, align: Align) -> &mut Self {
        self.update(|s| &mut s.align_items, align)
    }

    pub fn set_align_self(&mut self, align: Align) -> &mut Self {
        self.update(|s| &mut s.align_self, align)
    }

    pub fn set_position_type(&mut self, position_type: PositionType) -> &mut Self {
        self.update(|s| &mut s.position_type, position_type)
    }

    pub fn set_flex_wrap(&mut self, wrap: Wrap) -> &mut Self {
        self.update(|s| &mut s.flex_wrap, wrap)
    }

    pub fn set_overflow(&mut self, overflow: Overflow) -> &mut Self {
        self.update(|s| &mut s.overflow, overflow)
    }

    pub fn set_display(&mut self, display: Display) -> &mut Self {
        self.update(|s| &mut s.display, display)
    }

    /// `flex` shorthand. NaN unsets it.
    pub fn set_flex(&mut self, flex: f32) -> &mut Self {
        self.update(|s| &mut s.flex, defined(flex))
    }

    pub fn set_flex_grow(&mut self, grow: f32) -> &mut Self {
        self.update(|s| &mut s.flex_grow, defined(grow))
    }

    pub fn set_flex_shrink(&mut self, shrink: f32) -> &mut Self {
        self.update(|s| &mut s.flex_shrink, defined(shrink))
    }

    /// Width / height ratio. NaN unsets it.
    pub fn set_aspect_ratio(&mut self, ratio: f32) -> &mut Self {
        self.update(|s| &mut s.aspect_ratio, defined(ratio))
    }

    pub fn set_flex_basis(&mut self, points: f32) -> &mut Self {
        self.update(|s| &mut s.flex_basis, Value::points_or(points, Value::Auto))
    }

    pub fn set_flex_basis_percent(&mut self, percent: f32) -> &mut Self {
        self.update(|s| &mut s.flex_basis, Value::percent_or(percent, Value::Auto))
    }

    pub fn set_flex_basis_auto(&mut self) -> &mut Self {
        self.update(|s| &mut s.flex_basis, Value::Auto)
    }

    pub fn set_width(&mut self, points: f32) -> &mut Self {
        self.update(|s| &mut s.width, Value::points_or(points, Value::Auto))
    }

    pub fn set_width_percent(&mut self, percent: f32) -> &mut Self {
        self.update(|s| &mut s.width, Value::percent_or(percent, Value::Auto))
    }

    pub fn set_width_auto(&mut self) -> &mut Self {
        self.update(|s| &mut s.width, Value::Auto)
    }

    pub fn set_height(&mut self, points: f32) -> &mut Self {
        self.update(|s| &mut s.height, Value::points_or(points, Value::Auto))
    }

    pub fn set_height_percent(&mut self, percent: f32) -> &mut Self {
        self.update(|s| &mut s.height, Value::percent_or(percent, Value::Auto))
    }

    pub fn set_height_auto(&mut self) -> &mut Self {
        self.update(|s| &mut s.height, Value::Auto)
    }

    pub fn set_min_width(&mut self, points: f32) -> &mut Self {
        self.update(|s| &mut s.min_width, Value::points_or(points, Value::Auto))
    }

    pub fn set_min_width_percent(&mut self, percent: f32) -> &mut Self {
        self.update(|s| &mut s.min_width, Value::percent_or(percent, Value::Auto))
    }

    pub fn set_min_height(&mut self, points: f32) -> &mut Self {
        self.update(|s| &mut s.min_height, Value::points_or(points, Value::Auto))
    }

    pub fn set_min_height_percent(&mut self, percent: f32) -> &mut Self {
        self.update(|s| &mut s.min_height, Value::percent_or(percent, Value::Auto))
    }

    pub fn set_max_width(&mut self, points: f32) -> &mut Self {
        self.update(|s| &mut s.max_width, Value::points_or(points, Value::Auto))
    }

    pub fn set_max_width_percent(&mut self, percent: f32) -> &mut Self {
        self.update(|s| &mut s.max_width, Value::percent_or(percent, Value::Auto))
    }

    pub fn set_max_height(&mut self, points: f32) -> &mut Self {
        self.update(|s| &mut s.max_height, Value::points_or(points, Value::Auto))
    }

    pub fn set_max_height_percent(&mut self, percent: f32) -> &mut Self {
        self.update(|s| &mut s.max_height, Value::percent_or(percent, Value::Auto))
    }

    pub fn set_margin(&mut self, edge: Edge, points: f32) -> &mut Self {
        self.update_edge(|s| &mut s.margin, edge, Value::points_or(points, Value::Undefined))
    }

    pub fn set_margin_percent(&mut self, edge: Edge, percent: f32) -> &mut Self {
        self.update_edge(|s| &mut s.margin, edge, Value::percent_or(percent, Value::Undefined))
    }

    pub fn set_margin_auto(&mut self, edge: Edge) -> &mut Self {
        self.update_edge(|s| &mut s.margin, edge, Value::Auto)
    }

    pub fn set_position(&mut self, edge: Edge, points: f32) -> &mut Self {
        self.update_edge(|s| &mut s.position, edge, Value::points_or(points, Value::Undefined))
    }

    pub fn set_position_percent(&mut self, edge: Edge, percent: f32) -> &mut Self {
        self.update_edge(|s| &mut s.position, edge, Value::percent_or(percent, Value::Undefined))
    }

    pub fn set_padding(&mut self, edge: Edge, points: f32) -> &mut Self {
        self.update_edge(|s| &mut s.padding, edge, Value::points_or(points, Value::Undefined))
    }

    pub fn set_padding_percent(&mut self, edge: Edge, percent: f32) -> &mut Self {
        self.update_edge(|s| &mut s.padding, edge, Value::percent_or(percent, Value::Undefined))
    }

    pub fn set_border(&mut self, edge: Edge, points: f32) -> &mut Self {
        self.update_edge(|s| &mut s.border, edge, Value::points_or(points, Value::Undefined))
    }
}

fn defined(value: f32) -> Option<f32> {
    (!value.is_nan()).then_some(value)
}
