//! Style resolution helpers shared by every layout step.
//!
//! Axis-relative lookups (leading/trailing edges, per-axis margin, padding
//! and border) live here so the flex passes can talk in terms of main and
//! cross axes instead of physical edges.

use crate::style::{
    Align, Dimension, Direction, Edge, FlexDirection, MeasureMode, PositionType, Value,
};
use crate::tree::Node;

impl FlexDirection {
    pub(crate) fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub(crate) fn is_column(self) -> bool {
        matches!(self, FlexDirection::Column | FlexDirection::ColumnReverse)
    }

    pub(crate) fn is_reverse(self) -> bool {
        matches!(
            self,
            FlexDirection::RowReverse | FlexDirection::ColumnReverse
        )
    }

    /// Flips row axes under right-to-left.
    pub(crate) fn resolve(self, direction: Direction) -> FlexDirection {
        match (direction, self) {
            (Direction::Rtl, FlexDirection::Row) => FlexDirection::RowReverse,
            (Direction::Rtl, FlexDirection::RowReverse) => FlexDirection::Row,
            _ => self,
        }
    }

    pub(crate) fn cross(self, direction: Direction) -> FlexDirection {
        if self.is_column() {
            FlexDirection::Row.resolve(direction)
        } else {
            FlexDirection::Column
        }
    }

    /// Edge items start from; also the edge their position is measured from.
    pub(crate) fn leading_edge(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Top,
            FlexDirection::ColumnReverse => Edge::Bottom,
            FlexDirection::Row => Edge::Left,
            FlexDirection::RowReverse => Edge::Right,
        }
    }

    pub(crate) fn trailing_edge(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Bottom,
            FlexDirection::ColumnReverse => Edge::Top,
            FlexDirection::Row => Edge::Right,
            FlexDirection::RowReverse => Edge::Left,
        }
    }

    pub(crate) fn dimension(self) -> Dimension {
        if self.is_row() {
            Dimension::Width
        } else {
            Dimension::Height
        }
    }
}

/// Clamps `size` to a node's max size on `axis`, tightening an unbounded
/// mode to `AtMost` when a max exists.
pub(crate) fn constrain_max_size(
    node: &Node,
    axis: FlexDirection,
    parent_axis_size: f32,
    parent_width: f32,
    mode: &mut MeasureMode,
    size: &mut f32,
) {
    let max_size = node
        .style
        .max_dimension(axis.dimension())
        .resolve(parent_axis_size)
        + node.margin_for_axis(axis, parent_width);
    match *mode {
        MeasureMode::Exactly | MeasureMode::AtMost => {
            if !max_size.is_nan() && (size.is_nan() || *size >= max_size) {
                *size = max_size;
            }
        }
        MeasureMode::Undefined => {
            if !max_size.is_nan() {
                *mode = MeasureMode::AtMost;
                *size = max_size;
            }
        }
    }
}

impl Node {
    pub(crate) fn measured(&self, dim: Dimension) -> f32 {
        self.layout.measured_dimensions[dim.index()]
    }

    pub(crate) fn measured_on(&self, axis: FlexDirection) -> f32 {
        self.measured(axis.dimension())
    }

    pub(crate) fn set_measured(&mut self, dim: Dimension, value: f32) {
        self.layout.measured_dimensions[dim.index()] = value;
    }

    pub(crate) fn position_on(&self, edge: Edge) -> f32 {
        self.layout.position[edge.index()]
    }

    pub(crate) fn set_position_on(&mut self, edge: Edge, value: f32) {
        self.layout.position[edge.index()] = value;
    }

    // Box model

    pub(crate) fn leading_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let margin = &self.style.margin;
        if axis.is_row() && margin.get(Edge::Start).is_defined() {
            return margin.get(Edge::Start).resolve_margin(width_size);
        }
        margin
            .computed(axis.leading_edge(), Value::ZERO)
            .resolve_margin(width_size)
    }

    pub(crate) fn trailing_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let margin = &self.style.margin;
        if axis.is_row() && margin.get(Edge::End).is_defined() {
            return margin.get(Edge::End).resolve_margin(width_size);
        }
        margin
            .computed(axis.trailing_edge(), Value::ZERO)
            .resolve_margin(width_size)
    }

    pub(crate) fn leading_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let padding = &self.style.padding;
        let start = padding.get(Edge::Start);
        if axis.is_row() && start.is_defined() && start.resolve(width_size) >= 0.0 {
            return start.resolve(width_size);
        }
        padding
            .computed(axis.leading_edge(), Value::ZERO)
            .resolve(width_size)
            .max(0.0)
    }

    pub(crate) fn trailing_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let padding = &self.style.padding;
        let end = padding.get(Edge::End);
        if axis.is_row() && end.is_defined() && end.resolve(width_size) >= 0.0 {
            return end.resolve(width_size);
        }
        padding
            .computed(axis.trailing_edge(), Value::ZERO)
            .resolve(width_size)
            .max(0.0)
    }

    pub(crate) fn leading_border(&self, axis: FlexDirection) -> f32 {
        let border = &self.style.border;
        let start = border.get(Edge::Start);
        if axis.is_row() && start.is_defined() && start.number() >= 0.0 {
            return start.number();
        }
        border
            .computed(axis.leading_edge(), Value::ZERO)
            .number()
            .max(0.0)
    }

    pub(crate) fn trailing_border(&self, axis: FlexDirection) -> f32 {
        let border = &self.style.border;
        let end = border.get(Edge::End);
        if axis.is_row() && end.is_defined() && end.number() >= 0.0 {
            return end.number();
        }
        border
            .computed(axis.trailing_edge(), Value::ZERO)
            .number()
            .max(0.0)
    }

    pub(crate) fn leading_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding(axis, width_size) + self.leading_border(axis)
    }

    pub(crate) fn trailing_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.trailing_padding(axis, width_size) + self.trailing_border(axis)
    }

    pub(crate) fn margin_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_margin(axis, width_size) + self.trailing_margin(axis, width_size)
    }

    pub(crate) fn padding_and_border_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding_and_border(axis, width_size)
            + self.trailing_padding_and_border(axis, width_size)
    }

    pub(crate) fn dim_with_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.measured_on(axis) + self.margin_for_axis(axis, width_size)
    }

    /// Raw leading margin value, used to spot `auto` margins.
    pub(crate) fn margin_leading_value(&self, axis: FlexDirection) -> Value {
        let start = self.style.margin.get(Edge::Start);
        if axis.is_row() && start.is_defined() {
            start
        } else {
            self.style.margin.get(axis.leading_edge())
        }
    }

    pub(crate) fn margin_trailing_value(&self, axis: FlexDirection) -> Value {
        let end = self.style.margin.get(Edge::End);
        if axis.is_row() && end.is_defined() {
            end
        } else {
            self.style.margin.get(axis.trailing_edge())
        }
    }

    // Offsets

    pub(crate) fn is_leading_pos_defined(&self, axis: FlexDirection) -> bool {
        let position = &self.style.position;
        (axis.is_row() && position.computed(Edge::Start, Value::Undefined).is_defined())
            || position
                .computed(axis.leading_edge(), Value::Undefined)
                .is_defined()
    }

    pub(crate) fn is_trailing_pos_defined(&self, axis: FlexDirection) -> bool {
        let position = &self.style.position;
        (axis.is_row() && position.computed(Edge::End, Value::Undefined).is_defined())
            || position
                .computed(axis.trailing_edge(), Value::Undefined)
                .is_defined()
    }

    pub(crate) fn leading_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        self.offset(Edge::Start, axis.leading_edge(), axis, axis_size)
    }

    pub(crate) fn trailing_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        self.offset(Edge::End, axis.trailing_edge(), axis, axis_size)
    }

    fn offset(&self, logical: Edge, physical: Edge, axis: FlexDirection, axis_size: f32) -> f32 {
        let position = &self.style.position;
        if axis.is_row() {
            let value = position.computed(logical, Value::Undefined);
            if value.is_defined() {
                return value.resolve(axis_size);
            }
        }
        let value = position.computed(physical, Value::Undefined);
        if value.is_defined() {
            value.resolve(axis_size)
        } else {
            0.0
        }
    }

    /// Leading offset when set, otherwise the negated trailing offset.
    pub(crate) fn relative_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if self.is_leading_pos_defined(axis) {
            self.leading_position(axis, axis_size)
        } else {
            -self.trailing_position(axis, axis_size)
        }
    }

    // Sizing

    pub(crate) fn resolved_dimension(&self, dim: Dimension) -> Value {
        self.resolved_dimensions[dim.index()]
    }

    /// Uses the max size as the definite size when min and max agree.
    pub(crate) fn resolve_dimensions(&mut self) {
        for dim in [Dimension::Width, Dimension::Height] {
            let max = self.style.max_dimension(dim);
            let min = self.style.min_dimension(dim);
            self.resolved_dimensions[dim.index()] = if max.is_defined() && max.approx_eq(min) {
                max
            } else {
                self.style.dimension(dim)
            };
        }
    }

    pub(crate) fn is_style_dim_defined(&self, axis: FlexDirection, parent_size: f32) -> bool {
        match self.resolved_dimension(axis.dimension()) {
            Value::Undefined | Value::Auto => false,
            Value::Point(v) => v >= 0.0,
            Value::Percent(v) => v >= 0.0 && !parent_size.is_nan(),
        }
    }

    pub(crate) fn is_layout_dim_defined(&self, axis: FlexDirection) -> bool {
        let value = self.measured_on(axis);
        !value.is_nan() && value >= 0.0
    }

    pub(crate) fn bound_axis_within_min_and_max(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
    ) -> f32 {
        let dim = axis.dimension();
        let min = self.style.min_dimension(dim).resolve(axis_size);
        let max = self.style.max_dimension(dim).resolve(axis_size);

        let mut bound = value;
        if !max.is_nan() && max >= 0.0 && bound > max {
            bound = max;
        }
        if !min.is_nan() && min >= 0.0 && bound < min {
            bound = min;
        }
        bound
    }

    /// Min/max clamp that also never drops below padding plus border.
    pub(crate) fn bound_axis(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
        width_size: f32,
    ) -> f32 {
        self.bound_axis_within_min_and_max(axis, value, axis_size)
            .max(self.padding_and_border_for_axis(axis, width_size))
    }

    // Flex factors

    pub(crate) fn resolve_flex_grow(&self) -> f32 {
        if self.parent.is_none() {
            return 0.0;
        }
        if let Some(grow) = self.style.flex_grow {
            return grow;
        }
        match self.style.flex {
            Some(flex) if flex > 0.0 => flex,
            _ => 0.0,
        }
    }

    pub(crate) fn resolve_flex_shrink(&self) -> f32 {
        if self.parent.is_none() {
            return 0.0;
        }
        if let Some(shrink) = self.style.flex_shrink {
            return shrink;
        }
        let web = self.config.use_web_defaults();
        match self.style.flex {
            Some(flex) if !web && flex < 0.0 => -flex,
            _ if web => 1.0,
            _ => 0.0,
        }
    }

    pub(crate) fn resolve_flex_basis(&self) -> Value {
        let basis = self.style.flex_basis;
        if !matches!(basis, Value::Auto | Value::Undefined) {
            return basis;
        }
        match self.style.flex {
            Some(flex) if flex > 0.0 && !self.config.use_web_defaults() => Value::ZERO,
            _ => Value::Auto,
        }
    }

    pub(crate) fn is_flex(&self) -> bool {
        self.style.position_type == PositionType::Relative
            && (self.resolve_flex_grow() != 0.0 || self.resolve_flex_shrink() != 0.0)
    }

    pub(crate) fn resolve_direction(&self, parent_direction: Direction) -> Direction {
        match (self.style.direction, parent_direction) {
            (Direction::Inherit, Direction::Inherit) => Direction::Ltr,
            (Direction::Inherit, inherited) => inherited,
            (own, _) => own,
        }
    }

    /// Effective cross alignment of `child` inside `self`. Column containers
    /// treat baseline as flex-start.
    pub(crate) fn align_item(&self, child: &Node) -> Align {
        let align = match child.style.align_self {
            Align::Auto => self.style.align_items,
            own => own,
        };
        if align == Align::Baseline && self.style.flex_direction.is_column() {
            Align::FlexStart
        } else {
            align
        }
    }

    pub(crate) fn aspect_ratio(&self) -> Option<f32> {
        self.style.aspect_ratio.filter(|ratio| !ratio.is_nan())
    }
}

/// Width or height for an axis, picking between the row and column value.
pub(crate) fn by_axis<T>(is_row: bool, row: T, column: T) -> T {
    if is_row { row } else { column }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::style::UNDEFINED;
    use std::sync::Arc;

    fn node() -> Node {
        Node::new(Arc::new(Config::default()))
    }

    #[test]
    fn rtl_flips_row_axes_only() {
        assert_eq!(
            FlexDirection::Row.resolve(Direction::Rtl),
            FlexDirection::RowReverse
        );
        assert_eq!(
            FlexDirection::Column.resolve(Direction::Rtl),
            FlexDirection::Column
        );
        assert_eq!(
            FlexDirection::Column.cross(Direction::Rtl),
            FlexDirection::RowReverse
        );
        assert_eq!(
            FlexDirection::Row.cross(Direction::Rtl),
            FlexDirection::Column
        );
    }

    #[test]
    fn start_margin_wins_on_row_axis() {
        let mut node = node();
        node.style.margin.set(Edge::Left, Value::Point(4.0));
        node.style.margin.set(Edge::Start, Value::Point(9.0));
        assert_eq!(node.leading_margin(FlexDirection::Row, 100.0), 9.0);
        assert_eq!(node.leading_margin(FlexDirection::RowReverse, 100.0), 9.0);
        assert_eq!(node.leading_margin(FlexDirection::Column, 100.0), 0.0);
    }

    #[test]
    fn negative_padding_and_border_floor_at_zero() {
        let mut node = node();
        node.style.padding.set(Edge::All, Value::Point(-5.0));
        node.style.border.set(Edge::Top, Value::Point(-2.0));
        assert_eq!(node.padding_and_border_for_axis(FlexDirection::Row, 100.0), 0.0);
        assert_eq!(node.leading_border(FlexDirection::Column), 0.0);
    }

    #[test]
    fn bound_axis_respects_padding_floor() {
        let mut node = node();
        node.style.padding.set(Edge::All, Value::Point(10.0));
        node.style.max_width = Value::Point(5.0);
        assert_eq!(node.bound_axis(FlexDirection::Row, 50.0, 100.0, 100.0), 20.0);
    }

    #[test]
    fn equal_min_and_max_become_definite() {
        let mut node = node();
        node.style.min_width = Value::Point(30.0);
        node.style.max_width = Value::Point(30.0);
        node.resolve_dimensions();
        assert_eq!(node.resolved_dimension(Dimension::Width), Value::Point(30.0));
        assert_eq!(node.resolved_dimension(Dimension::Height), Value::Auto);
        assert!(node.is_style_dim_defined(FlexDirection::Row, UNDEFINED));
    }

    #[test]
    fn percent_dims_need_a_parent_size() {
        let mut node = node();
        node.style.width = Value::Percent(50.0);
        node.resolve_dimensions();
        assert!(!node.is_style_dim_defined(FlexDirection::Row, UNDEFINED));
        assert!(node.is_style_dim_defined(FlexDirection::Row, 200.0));
    }

    #[test]
    fn root_nodes_never_flex() {
        let mut node = node();
        node.style.flex = Some(2.0);
        assert_eq!(node.resolve_flex_grow(), 0.0);
        assert_eq!(node.resolve_flex_basis(), Value::ZERO);
    }

    #[test]
    fn max_size_tightens_undefined_mode() {
        let mut node = node();
        node.style.max_height = Value::Point(40.0);
        let mut mode = MeasureMode::Undefined;
        let mut size = UNDEFINED;
        constrain_max_size(
            &node,
            FlexDirection::Column,
            100.0,
            100.0,
            &mut mode,
            &mut size,
        );
        assert_eq!(mode, MeasureMode::AtMost);
        assert_eq!(size, 40.0);
    }
}
