//! The flex pass proper.
//!
//! [`LayoutTree::layout_impl`] runs once per cache miss. Measured leaves and
//! childless containers are sized directly. Containers go through flex-basis
//! computation, line breaking and flexible length resolution, then main and
//! cross axis alignment, multi-line alignment and finally their absolutely
//! positioned children.

use crate::config::Config;
use crate::error::{LayoutError, Result};
use crate::style::{
    Align, Dimension, Direction, Display, Edge, ExperimentalFeature, FlexDirection, Justify,
    MeasureMode, Overflow, PositionType, UNDEFINED, Value, Wrap, float_eq,
};
use crate::tree::{Layout, LayoutTree, Node, NodeId};

use super::absolute::AbsoluteFrame;
use super::cache::LayoutRequest;
use super::resolve::{by_axis, constrain_max_size};

const ROW: FlexDirection = FlexDirection::Row;
const COLUMN: FlexDirection = FlexDirection::Column;

/// Quantities fixed for one container's pass, shared by every step.
#[derive(Debug, Clone)]
struct Frame {
    direction: Direction,
    main_axis: FlexDirection,
    cross_axis: FlexDirection,
    is_main_axis_row: bool,
    is_wrap: bool,
    justify: Justify,
    parent_width: f32,
    main_parent_size: f32,
    cross_parent_size: f32,
    margin_row: f32,
    margin_column: f32,
    leading_pb_main: f32,
    trailing_pb_main: f32,
    leading_pb_cross: f32,
    pb_main: f32,
    pb_cross: f32,
    min_inner_main: f32,
    max_inner_main: f32,
    available_inner_width: f32,
    available_inner_height: f32,
    /// Narrowed per line when the main size is not exact.
    available_inner_main: f32,
    available_inner_cross: f32,
    width_mode: MeasureMode,
    height_mode: MeasureMode,
    main_mode: MeasureMode,
    cross_mode: MeasureMode,
    flex_basis_overflows: bool,
    perform_layout: bool,
    depth: u32,
}

impl Frame {
    fn new(node: &Node, direction: Direction, request: &LayoutRequest) -> Self {
        let parent_width = request.parent_width;
        let parent_height = request.parent_height;
        let main_axis = node.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let is_main_axis_row = main_axis.is_row();

        let pb_main = node.padding_and_border_for_axis(main_axis, parent_width);
        let pb_cross = node.padding_and_border_for_axis(cross_axis, parent_width);
        let pb_row = by_axis(is_main_axis_row, pb_main, pb_cross);
        let pb_column = by_axis(is_main_axis_row, pb_cross, pb_main);
        let margin_row = node.margin_for_axis(ROW, parent_width);
        let margin_column = node.margin_for_axis(COLUMN, parent_width);

        let style = &node.style;
        let min_inner_width = style.min_width.resolve(parent_width) - margin_row - pb_row;
        let max_inner_width = style.max_width.resolve(parent_width) - margin_row - pb_row;
        let min_inner_height = style.min_height.resolve(parent_height) - margin_column - pb_column;
        let max_inner_height = style.max_height.resolve(parent_height) - margin_column - pb_column;

        let inner = |available: f32, outer: f32, min: f32, max: f32| {
            let inner = available - outer;
            if inner.is_nan() {
                inner
            } else {
                inner.min(max).max(min)
            }
        };
        let available_inner_width = inner(
            request.available_width,
            margin_row + pb_row,
            min_inner_width,
            max_inner_width,
        );
        let available_inner_height = inner(
            request.available_height,
            margin_column + pb_column,
            min_inner_height,
            max_inner_height,
        );

        Self {
            direction,
            main_axis,
            cross_axis,
            is_main_axis_row,
            is_wrap: style.flex_wrap != Wrap::NoWrap,
            justify: style.justify_content,
            parent_width,
            main_parent_size: by_axis(is_main_axis_row, parent_width, parent_height),
            cross_parent_size: by_axis(is_main_axis_row, parent_height, parent_width),
            margin_row,
            margin_column,
            leading_pb_main: node.leading_padding_and_border(main_axis, parent_width),
            trailing_pb_main: node.trailing_padding_and_border(main_axis, parent_width),
            leading_pb_cross: node.leading_padding_and_border(cross_axis, parent_width),
            pb_main,
            pb_cross,
            min_inner_main: by_axis(is_main_axis_row, min_inner_width, min_inner_height),
            max_inner_main: by_axis(is_main_axis_row, max_inner_width, max_inner_height),
            available_inner_width,
            available_inner_height,
            available_inner_main: by_axis(
                is_main_axis_row,
                available_inner_width,
                available_inner_height,
            ),
            available_inner_cross: by_axis(
                is_main_axis_row,
                available_inner_height,
                available_inner_width,
            ),
            width_mode: request.width_mode,
            height_mode: request.height_mode,
            main_mode: by_axis(is_main_axis_row, request.width_mode, request.height_mode),
            cross_mode: by_axis(is_main_axis_row, request.height_mode, request.width_mode),
            flex_basis_overflows: false,
            perform_layout: request.perform_layout,
            depth: request.depth,
        }
    }

    /// Request for a child of this container.
    fn child_request(
        &self,
        width: f32,
        height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        perform_layout: bool,
        reason: &'static str,
    ) -> LayoutRequest {
        LayoutRequest {
            available_width: width,
            available_height: height,
            parent_direction: self.direction,
            width_mode,
            height_mode,
            parent_width: self.available_inner_width,
            parent_height: self.available_inner_height,
            perform_layout,
            reason,
            depth: self.depth + 1,
        }
    }
}

/// One line of items and the totals the flex steps need.
#[derive(Debug, Clone)]
struct FlexLine {
    /// Child index range covered, including hidden and absolute children.
    start: usize,
    end: usize,
    /// In-flow children on the line.
    items: Vec<NodeId>,
    size_consumed: f32,
    total_flex_grow: f32,
    total_flex_shrink_scaled: f32,
    remaining_free_space: f32,
}

impl Node {
    fn resolve_box_model(&mut self, direction: Direction, parent_width: f32) {
        let row = ROW.resolve(direction);
        let column = COLUMN.resolve(direction);
        let margin = [
            self.leading_margin(row, parent_width),
            self.trailing_margin(row, parent_width),
            self.leading_margin(column, parent_width),
            self.trailing_margin(column, parent_width),
        ];
        let border = [
            self.leading_border(row),
            self.trailing_border(row),
            self.leading_border(column),
            self.trailing_border(column),
        ];
        let padding = [
            self.leading_padding(row, parent_width),
            self.trailing_padding(row, parent_width),
            self.leading_padding(column, parent_width),
            self.trailing_padding(column, parent_width),
        ];
        let layout = &mut self.layout;
        for (slot, edge) in [Edge::Start, Edge::End, Edge::Top, Edge::Bottom]
            .into_iter()
            .enumerate()
        {
            layout.margin[edge.index()] = margin[slot];
            layout.border[edge.index()] = border[slot];
            layout.padding[edge.index()] = padding[slot];
        }
    }

    /// Without children a node is as large as its available space, or as
    /// small as its padding and border.
    fn size_empty_container(&mut self, request: &LayoutRequest) {
        let parent_width = request.parent_width;
        let parent_height = request.parent_height;
        let fit = |mode: MeasureMode| matches!(mode, MeasureMode::Undefined | MeasureMode::AtMost);

        let width = if fit(request.width_mode) {
            self.padding_and_border_for_axis(ROW, parent_width)
        } else {
            request.available_width - self.margin_for_axis(ROW, parent_width)
        };
        let height = if fit(request.height_mode) {
            self.padding_and_border_for_axis(COLUMN, parent_width)
        } else {
            request.available_height - self.margin_for_axis(COLUMN, parent_width)
        };

        let width = self.bound_axis(ROW, width, parent_width, parent_width);
        let height = self.bound_axis(COLUMN, height, parent_height, parent_width);
        self.set_measured(Dimension::Width, width);
        self.set_measured(Dimension::Height, height);
    }

    /// Sizes the node without visiting children when the constraints alone
    /// decide the answer. Returns whether it did.
    fn size_fixed(&mut self, request: &LayoutRequest) -> bool {
        let LayoutRequest {
            available_width,
            available_height,
            width_mode,
            height_mode,
            parent_width,
            parent_height,
            ..
        } = *request;
        let fixed = (width_mode == MeasureMode::AtMost && available_width <= 0.0)
            || (height_mode == MeasureMode::AtMost && available_height <= 0.0)
            || (width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly);
        if !fixed {
            return false;
        }

        let collapsed = |size: f32, mode: MeasureMode| {
            size.is_nan() || (mode == MeasureMode::AtMost && size < 0.0)
        };
        let width = if collapsed(available_width, width_mode) {
            0.0
        } else {
            available_width - self.margin_for_axis(ROW, parent_width)
        };
        let height = if collapsed(available_height, height_mode) {
            0.0
        } else {
            available_height - self.margin_for_axis(COLUMN, parent_width)
        };

        let width = self.bound_axis(ROW, width, parent_width, parent_width);
        let height = self.bound_axis(COLUMN, height, parent_height, parent_width);
        self.set_measured(Dimension::Width, width);
        self.set_measured(Dimension::Height, height);
        true
    }

    /// Seeds every edge of the node's position with its margin plus its
    /// relative offset. Roots are always placed left-to-right.
    pub(crate) fn apply_relative_position(
        &mut self,
        direction: Direction,
        main_size: f32,
        cross_size: f32,
        parent_width: f32,
    ) {
        let direction = if self.parent.is_some() {
            direction
        } else {
            Direction::Ltr
        };
        let main_axis = self.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);

        let relative_main = self.relative_position(main_axis, main_size);
        let relative_cross = self.relative_position(cross_axis, cross_size);
        let edges = [
            (
                main_axis.leading_edge(),
                self.leading_margin(main_axis, parent_width) + relative_main,
            ),
            (
                main_axis.trailing_edge(),
                self.trailing_margin(main_axis, parent_width) + relative_main,
            ),
            (
                cross_axis.leading_edge(),
                self.leading_margin(cross_axis, parent_width) + relative_cross,
            ),
            (
                cross_axis.trailing_edge(),
                self.trailing_margin(cross_axis, parent_width) + relative_cross,
            ),
        ];
        for (edge, value) in edges {
            self.set_position_on(edge, value);
        }
    }

    fn set_trailing_position(&mut self, axis: FlexDirection, container_size: f32) {
        let value =
            container_size - self.measured_on(axis) - self.position_on(axis.leading_edge());
        self.set_position_on(axis.trailing_edge(), value);
    }

    fn is_hidden(&self) -> bool {
        self.style.display == Display::None
    }
}

impl LayoutTree {
    /// Computes `id`'s measured size for `request` and, when
    /// `request.perform_layout` is set, the positions of its children.
    pub(crate) fn layout_impl(
        &mut self,
        config: &Config,
        id: NodeId,
        request: LayoutRequest,
    ) -> Result<()> {
        debug_assert!(
            !request.available_width.is_nan() || request.width_mode == MeasureMode::Undefined,
            "an undefined available width needs MeasureMode::Undefined"
        );
        debug_assert!(
            !request.available_height.is_nan() || request.height_mode == MeasureMode::Undefined,
            "an undefined available height needs MeasureMode::Undefined"
        );

        let node = self.at_mut(id);
        let direction = node.resolve_direction(request.parent_direction);
        node.layout.direction = direction;
        node.resolve_box_model(direction, request.parent_width);

        if node.measure.is_some() {
            return self.measure_leaf(config, id, &request);
        }
        if node.children.is_empty() {
            node.size_empty_container(&request);
            return Ok(());
        }
        if !request.perform_layout && node.size_fixed(&request) {
            return Ok(());
        }

        node.layout.had_overflow = false;
        let mut frame = Frame::new(node, direction, &request);
        let children = node.children.clone();

        let absolute_children = self.compute_flex_bases(config, id, &children, &mut frame)?;

        let mut line_count = 0;
        let mut total_line_cross = 0.0f32;
        let mut max_line_main = 0.0f32;
        let mut start = 0;
        while start < children.len() {
            let mut line = self.collect_line(&children, start, line_count, &frame);
            let can_skip_flex = !frame.perform_layout && frame.cross_mode == MeasureMode::Exactly;

            self.fit_main_to_line(id, &mut frame, &line);
            line.remaining_free_space = if !frame.available_inner_main.is_nan() {
                frame.available_inner_main - line.size_consumed
            } else if line.size_consumed < 0.0 {
                -line.size_consumed
            } else {
                0.0
            };

            let original_free_space = line.remaining_free_space;
            let mut delta_free_space = 0.0;
            if !can_skip_flex {
                delta_free_space = self.resolve_flexible_lengths(config, id, &frame, &mut line)?;
            }
            line.remaining_free_space = original_free_space + delta_free_space;
            self.at_mut(id).layout.had_overflow |= line.remaining_free_space < 0.0;

            let (main_dim, cross_dim) =
                self.justify_main_axis(id, &frame, &mut line, &children, can_skip_flex);

            let node = self.at(id);
            let mut container_cross = frame.available_inner_cross;
            if matches!(frame.cross_mode, MeasureMode::Undefined | MeasureMode::AtMost) {
                container_cross = node.bound_axis(
                    frame.cross_axis,
                    cross_dim + frame.pb_cross,
                    frame.cross_parent_size,
                    frame.parent_width,
                ) - frame.pb_cross;
            }
            let mut cross_dim = cross_dim;
            if !frame.is_wrap && frame.cross_mode == MeasureMode::Exactly {
                cross_dim = frame.available_inner_cross;
            }
            cross_dim = node.bound_axis(
                frame.cross_axis,
                cross_dim + frame.pb_cross,
                frame.cross_parent_size,
                frame.parent_width,
            ) - frame.pb_cross;

            if frame.perform_layout {
                self.align_items_in_line(
                    config,
                    id,
                    &frame,
                    &line,
                    &children,
                    cross_dim,
                    container_cross,
                    total_line_cross,
                )?;
            }

            total_line_cross += cross_dim;
            max_line_main = max_line_main.max(main_dim);
            start = line.end;
            line_count += 1;
        }

        if frame.perform_layout
            && (line_count > 1 || self.is_baseline_layout(id))
            && !frame.available_inner_cross.is_nan()
        {
            self.align_lines(config, id, &frame, &children, line_count, total_line_cross)?;
        }

        self.size_container(id, &frame, &request, max_line_main, total_line_cross);

        if !frame.perform_layout {
            return Ok(());
        }

        let node = self.at(id);
        if node.style.flex_wrap == Wrap::WrapReverse {
            let container_cross = node.measured_on(frame.cross_axis);
            let edge = frame.cross_axis.leading_edge();
            for &child_id in &children {
                let child = self.at_mut(child_id);
                if child.is_hidden() || child.style.position_type != PositionType::Relative {
                    continue;
                }
                let mirrored =
                    container_cross - child.position_on(edge) - child.measured_on(frame.cross_axis);
                child.set_position_on(edge, mirrored);
            }
        }

        for child_id in absolute_children {
            self.layout_absolute_child(
                config,
                id,
                child_id,
                AbsoluteFrame {
                    width: frame.available_inner_width,
                    width_mode: by_axis(frame.is_main_axis_row, frame.main_mode, frame.cross_mode),
                    height: frame.available_inner_height,
                    direction,
                    depth: frame.depth,
                },
            )?;
        }

        let needs_main_trailing = frame.main_axis.is_reverse();
        let needs_cross_trailing = frame.cross_axis.is_reverse();
        if needs_main_trailing || needs_cross_trailing {
            let node = self.at(id);
            let container_main = node.measured_on(frame.main_axis);
            let container_cross = node.measured_on(frame.cross_axis);
            for &child_id in &children {
                let child = self.at_mut(child_id);
                if child.is_hidden() {
                    continue;
                }
                if needs_main_trailing {
                    child.set_trailing_position(frame.main_axis, container_main);
                }
                if needs_cross_trailing {
                    child.set_trailing_position(frame.cross_axis, container_cross);
                }
            }
        }
        Ok(())
    }

    /// Sizes a leaf through its host measure function.
    fn measure_leaf(&mut self, config: &Config, id: NodeId, request: &LayoutRequest) -> Result<()> {
        let LayoutRequest {
            available_width,
            available_height,
            width_mode,
            height_mode,
            parent_width,
            parent_height,
            ..
        } = *request;

        let node = self.at_mut(id);
        let pb_row = node.padding_and_border_for_axis(ROW, available_width);
        let pb_column = node.padding_and_border_for_axis(COLUMN, available_width);
        let margin_row = node.margin_for_axis(ROW, available_width);
        let margin_column = node.margin_for_axis(COLUMN, available_width);

        if width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly {
            let width = node.bound_axis(ROW, available_width - margin_row, parent_width, parent_width);
            let height = node.bound_axis(
                COLUMN,
                available_height - margin_column,
                parent_height,
                parent_width,
            );
            node.set_measured(Dimension::Width, width);
            node.set_measured(Dimension::Height, height);
            return Ok(());
        }

        // Never hand the host a negative size.
        let inner_width = if available_width.is_nan() {
            available_width
        } else {
            (available_width - margin_row - pb_row).max(0.0)
        };
        let inner_height = if available_height.is_nan() {
            available_height
        } else {
            (available_height - margin_column - pb_column).max(0.0)
        };

        let Some(measure) = node.measure.as_mut() else {
            return Ok(());
        };
        let measured = measure(id, inner_width, width_mode, inner_height, height_mode);
        config.record(|metrics| metrics.record_measure());
        if measured.width.is_nan() || measured.height.is_nan() {
            return Err(self.violation(id, LayoutError::InvalidMeasurement(id)));
        }

        let content = |mode: MeasureMode| matches!(mode, MeasureMode::Undefined | MeasureMode::AtMost);
        let width = if content(width_mode) {
            measured.width + pb_row
        } else {
            available_width - margin_row
        };
        let height = if content(height_mode) {
            measured.height + pb_column
        } else {
            available_height - margin_column
        };

        let node = self.at_mut(id);
        let width = node.bound_axis(ROW, width, available_width, available_width);
        let height = node.bound_axis(COLUMN, height, available_height, available_width);
        node.set_measured(Dimension::Width, width);
        node.set_measured(Dimension::Height, height);
        Ok(())
    }

    /// Zeroes a hidden subtree so stale geometry never leaks to the host.
    fn zero_out_layout(&mut self, id: NodeId) {
        let node = self.at_mut(id);
        node.layout = Layout {
            position: [0.0; 4],
            dimensions: [0.0; 2],
            measured_dimensions: [0.0; 2],
            computed_flex_basis: 0.0,
            ..Layout::default()
        };
        node.has_new_layout = true;
        let children = node.children.clone();
        for child in children {
            self.zero_out_layout(child);
        }
    }

    /// The only child that can grow and shrink when no other child is
    /// flexible. Its basis is forced to zero since it takes whatever is left.
    fn single_flex_child(&self, children: &[NodeId]) -> Option<NodeId> {
        let mut found = None;
        for &child_id in children {
            let child = self.at(child_id);
            if found.is_some() {
                if child.is_flex() {
                    return None;
                }
            } else if child.resolve_flex_grow() > 0.0 && child.resolve_flex_shrink() > 0.0 {
                found = Some(child_id);
            }
        }
        found
    }

    /// Resolves every visible child's flex basis and returns the absolutely
    /// positioned children for the final pass.
    fn compute_flex_bases(
        &mut self,
        config: &Config,
        id: NodeId,
        children: &[NodeId],
        frame: &mut Frame,
    ) -> Result<Vec<NodeId>> {
        let single_flex_child = if frame.main_mode == MeasureMode::Exactly {
            self.single_flex_child(children)
        } else {
            None
        };
        let generation = self.generation;

        let mut absolute_children = Vec::new();
        let mut total_outer_flex_basis = 0.0f32;
        for &child_id in children {
            if self.at(child_id).is_hidden() {
                self.zero_out_layout(child_id);
                let child = self.at_mut(child_id);
                child.has_new_layout = true;
                child.is_dirty = false;
                continue;
            }

            let child = self.at_mut(child_id);
            child.resolve_dimensions();
            if frame.perform_layout {
                let child_direction = child.resolve_direction(frame.direction);
                child.apply_relative_position(
                    child_direction,
                    frame.available_inner_main,
                    frame.available_inner_cross,
                    frame.available_inner_width,
                );
            }

            if child.style.position_type == PositionType::Absolute {
                absolute_children.push(child_id);
            } else if Some(child_id) == single_flex_child {
                child.layout.computed_flex_basis_generation = generation;
                child.layout.computed_flex_basis = 0.0;
            } else {
                self.compute_flex_basis_for_child(config, id, child_id, frame)?;
            }

            let child = self.at(child_id);
            total_outer_flex_basis += child.layout.computed_flex_basis
                + child.margin_for_axis(frame.main_axis, frame.available_inner_width);
        }

        frame.flex_basis_overflows = frame.main_mode != MeasureMode::Undefined
            && total_outer_flex_basis > frame.available_inner_main;
        if frame.is_wrap && frame.flex_basis_overflows && frame.main_mode == MeasureMode::AtMost {
            frame.main_mode = MeasureMode::Exactly;
        }
        Ok(absolute_children)
    }

    fn compute_flex_basis_for_child(
        &mut self,
        config: &Config,
        id: NodeId,
        child_id: NodeId,
        frame: &Frame,
    ) -> Result<()> {
        let generation = self.generation;
        let width = frame.available_inner_width;
        let height = frame.available_inner_height;
        let main_axis = frame.main_axis;
        let is_row = frame.is_main_axis_row;
        let main_size = by_axis(is_row, width, height);

        let node = self.at(id);
        let child = self.at(child_id);
        let resolved_basis = child.resolve_flex_basis().resolve(main_size);
        let row_defined = child.is_style_dim_defined(ROW, width);
        let column_defined = child.is_style_dim_defined(COLUMN, height);

        if !resolved_basis.is_nan() && !main_size.is_nan() {
            let stale = child.layout.computed_flex_basis.is_nan()
                || (child
                    .config
                    .is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis)
                    && child.layout.computed_flex_basis_generation != generation);
            if stale {
                let basis = resolved_basis.max(child.padding_and_border_for_axis(main_axis, width));
                self.at_mut(child_id).layout.computed_flex_basis = basis;
            }
        } else if is_row && row_defined {
            let basis = child
                .resolved_dimension(Dimension::Width)
                .resolve(width)
                .max(child.padding_and_border_for_axis(ROW, width));
            self.at_mut(child_id).layout.computed_flex_basis = basis;
        } else if !is_row && column_defined {
            let basis = child
                .resolved_dimension(Dimension::Height)
                .resolve(height)
                .max(child.padding_and_border_for_axis(COLUMN, width));
            self.at_mut(child_id).layout.computed_flex_basis = basis;
        } else {
            // Measure the child to find its hypothetical main size.
            let margin_row = child.margin_for_axis(ROW, width);
            let margin_column = child.margin_for_axis(COLUMN, width);
            let mut child_width = UNDEFINED;
            let mut child_height = UNDEFINED;
            let mut width_mode = MeasureMode::Undefined;
            let mut height_mode = MeasureMode::Undefined;

            if row_defined {
                child_width = child.resolved_dimension(Dimension::Width).resolve(width) + margin_row;
                width_mode = MeasureMode::Exactly;
            }
            if column_defined {
                child_height =
                    child.resolved_dimension(Dimension::Height).resolve(height) + margin_column;
                height_mode = MeasureMode::Exactly;
            }

            // A scrolling container leaves its main axis unbounded.
            let scroll = node.style.overflow == Overflow::Scroll;
            if (!is_row || !scroll) && child_width.is_nan() && !width.is_nan() {
                child_width = width;
                width_mode = MeasureMode::AtMost;
            }
            if (is_row || !scroll) && child_height.is_nan() && !height.is_nan() {
                child_height = height;
                height_mode = MeasureMode::AtMost;
            }

            let ratio = child.aspect_ratio();
            if let Some(ratio) = ratio {
                if !is_row && width_mode == MeasureMode::Exactly {
                    child_height = (child_width - margin_row) / ratio;
                    height_mode = MeasureMode::Exactly;
                } else if is_row && height_mode == MeasureMode::Exactly {
                    child_width = (child_height - margin_column) * ratio;
                    width_mode = MeasureMode::Exactly;
                }
            }

            // Stretched children are measured at the container's exact cross size.
            let stretch = node.align_item(child) == Align::Stretch;
            let has_exact_width = !width.is_nan() && frame.width_mode == MeasureMode::Exactly;
            if !is_row
                && !row_defined
                && has_exact_width
                && stretch
                && width_mode != MeasureMode::Exactly
            {
                child_width = width;
                width_mode = MeasureMode::Exactly;
                if let Some(ratio) = ratio {
                    child_height = (child_width - margin_row) / ratio;
                    height_mode = MeasureMode::Exactly;
                }
            }
            let has_exact_height = !height.is_nan() && frame.height_mode == MeasureMode::Exactly;
            if is_row
                && !column_defined
                && has_exact_height
                && stretch
                && height_mode != MeasureMode::Exactly
            {
                child_height = height;
                height_mode = MeasureMode::Exactly;
                if let Some(ratio) = ratio {
                    child_width = (child_height - margin_column) * ratio;
                    width_mode = MeasureMode::Exactly;
                }
            }

            constrain_max_size(child, ROW, width, width, &mut width_mode, &mut child_width);
            constrain_max_size(child, COLUMN, height, width, &mut height_mode, &mut child_height);

            self.layout_node_internal(
                config,
                child_id,
                frame.child_request(
                    child_width,
                    child_height,
                    width_mode,
                    height_mode,
                    false,
                    "measure",
                ),
            )?;

            let child = self.at_mut(child_id);
            child.layout.computed_flex_basis = child
                .measured_on(main_axis)
                .max(child.padding_and_border_for_axis(main_axis, width));
        }

        self.at_mut(child_id).layout.computed_flex_basis_generation = generation;
        Ok(())
    }

    /// Greedily gathers the children of the line starting at `start`.
    fn collect_line(
        &mut self,
        children: &[NodeId],
        start: usize,
        line_index: usize,
        frame: &Frame,
    ) -> FlexLine {
        let mut line = FlexLine {
            start,
            end: start,
            items: Vec::new(),
            size_consumed: 0.0,
            total_flex_grow: 0.0,
            total_flex_shrink_scaled: 0.0,
            remaining_free_space: 0.0,
        };
        let main_dim = frame.main_axis.dimension();

        for &child_id in &children[start..] {
            let child = self.at_mut(child_id);
            if child.is_hidden() {
                line.end += 1;
                continue;
            }
            child.layout.line_index = line_index;

            if child.style.position_type != PositionType::Absolute {
                let margin_main = child.margin_for_axis(frame.main_axis, frame.available_inner_width);
                let basis = child
                    .style
                    .min_dimension(main_dim)
                    .resolve(frame.main_parent_size)
                    .max(
                        child
                            .style
                            .max_dimension(main_dim)
                            .resolve(frame.main_parent_size)
                            .min(child.layout.computed_flex_basis),
                    );

                if frame.is_wrap
                    && !line.items.is_empty()
                    && line.size_consumed + basis + margin_main > frame.available_inner_main
                {
                    break;
                }

                line.size_consumed += basis + margin_main;
                if child.is_flex() {
                    line.total_flex_grow += child.resolve_flex_grow();
                    line.total_flex_shrink_scaled +=
                        -child.resolve_flex_shrink() * child.layout.computed_flex_basis;
                }
                line.items.push(child_id);
            }
            line.end += 1;
        }

        // Factors summing below one would distribute less than the free space.
        if line.total_flex_grow > 0.0 && line.total_flex_grow < 1.0 {
            line.total_flex_grow = 1.0;
        }
        if line.total_flex_shrink_scaled > 0.0 && line.total_flex_shrink_scaled < 1.0 {
            line.total_flex_shrink_scaled = 1.0;
        }
        line
    }

    /// When the main size is not exact, lets the line's content decide it
    /// within the container's min and max.
    fn fit_main_to_line(&self, id: NodeId, frame: &mut Frame, line: &FlexLine) {
        if frame.main_mode == MeasureMode::Exactly {
            return;
        }
        let node = self.at(id);
        let consumed = line.size_consumed;
        if !frame.min_inner_main.is_nan() && consumed < frame.min_inner_main {
            frame.available_inner_main = frame.min_inner_main;
        } else if !frame.max_inner_main.is_nan() && consumed > frame.max_inner_main {
            frame.available_inner_main = frame.max_inner_main;
        } else if !node.config.use_legacy_stretch_behaviour()
            && (line.total_flex_grow == 0.0 || node.resolve_flex_grow() == 0.0)
        {
            frame.available_inner_main = consumed;
        }
    }

    /// Two-pass flexible length resolution followed by the layout of each
    /// item at its final main size. Returns the change in free space.
    fn resolve_flexible_lengths(
        &mut self,
        config: &Config,
        id: NodeId,
        frame: &Frame,
        line: &mut FlexLine,
    ) -> Result<f32> {
        let main_axis = frame.main_axis;
        let cross_axis = frame.cross_axis;
        let main_dim = main_axis.dimension();
        let inner_width = frame.available_inner_width;
        let inner_main = frame.available_inner_main;
        let inner_cross = frame.available_inner_cross;
        let clamped_basis = |child: &Node| {
            let min = child.style.min_dimension(main_dim).resolve(frame.main_parent_size);
            let max = child.style.max_dimension(main_dim).resolve(frame.main_parent_size);
            max.min(min.max(child.layout.computed_flex_basis))
        };

        // First pass: items whose min/max clamp kicks in give up their share.
        let mut delta_free_space = 0.0;
        let mut delta_shrink = 0.0;
        let mut delta_grow = 0.0;
        for &child_id in &line.items {
            let child = self.at(child_id);
            let basis = clamped_basis(child);
            if line.remaining_free_space < 0.0 {
                let shrink_scaled = -child.resolve_flex_shrink() * basis;
                if shrink_scaled != 0.0 {
                    let base = basis
                        + line.remaining_free_space / line.total_flex_shrink_scaled * shrink_scaled;
                    let bound = child.bound_axis(main_axis, base, inner_main, inner_width);
                    if base != bound {
                        delta_free_space -= bound - basis;
                        delta_shrink -= shrink_scaled;
                    }
                }
            } else if line.remaining_free_space > 0.0 {
                let grow = child.resolve_flex_grow();
                if grow != 0.0 {
                    let base = basis + line.remaining_free_space / line.total_flex_grow * grow;
                    let bound = child.bound_axis(main_axis, base, inner_main, inner_width);
                    if base != bound {
                        delta_free_space -= bound - basis;
                        delta_grow -= grow;
                    }
                }
            }
        }
        line.total_flex_shrink_scaled += delta_shrink;
        line.total_flex_grow += delta_grow;
        line.remaining_free_space += delta_free_space;

        // Second pass: distribute what is left and lay each item out.
        let mut delta_free_space = 0.0;
        for &child_id in &line.items {
            let node = self.at(id);
            let child = self.at(child_id);
            let basis = clamped_basis(child);
            let mut main_size = basis;

            if line.remaining_free_space < 0.0 {
                let shrink_scaled = -child.resolve_flex_shrink() * basis;
                if shrink_scaled != 0.0 {
                    let size = if line.total_flex_shrink_scaled == 0.0 {
                        basis + shrink_scaled
                    } else {
                        basis
                            + line.remaining_free_space / line.total_flex_shrink_scaled
                                * shrink_scaled
                    };
                    main_size = child.bound_axis(main_axis, size, inner_main, inner_width);
                }
            } else if line.remaining_free_space > 0.0 {
                let grow = child.resolve_flex_grow();
                if grow != 0.0 {
                    main_size = child.bound_axis(
                        main_axis,
                        basis + line.remaining_free_space / line.total_flex_grow * grow,
                        inner_main,
                        inner_width,
                    );
                }
            }
            delta_free_space -= main_size - basis;

            let margin_main = child.margin_for_axis(main_axis, inner_width);
            let margin_cross = child.margin_for_axis(cross_axis, inner_width);
            let mut child_main = main_size + margin_main;
            let mut main_mode = MeasureMode::Exactly;
            let align = node.align_item(child);
            let cross_defined = child.is_style_dim_defined(cross_axis, inner_cross);

            let (mut child_cross, mut cross_mode) = if let Some(ratio) = child.aspect_ratio() {
                let inner_main_size = child_main - margin_main;
                let cross = if frame.is_main_axis_row {
                    inner_main_size / ratio
                } else {
                    inner_main_size * ratio
                };
                (cross + margin_cross, MeasureMode::Exactly)
            } else if !inner_cross.is_nan()
                && !cross_defined
                && frame.cross_mode == MeasureMode::Exactly
                && !(frame.is_wrap && frame.flex_basis_overflows)
                && align == Align::Stretch
            {
                (inner_cross, MeasureMode::Exactly)
            } else if !cross_defined {
                let mode = if inner_cross.is_nan() {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::AtMost
                };
                (inner_cross, mode)
            } else {
                let dimension = child.resolved_dimension(cross_axis.dimension());
                let size = dimension.resolve(inner_cross) + margin_cross;
                let loose_percent = matches!(dimension, Value::Percent(_))
                    && frame.cross_mode != MeasureMode::Exactly;
                let mode = if size.is_nan() || loose_percent {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::Exactly
                };
                (size, mode)
            };

            constrain_max_size(
                child,
                main_axis,
                inner_main,
                inner_width,
                &mut main_mode,
                &mut child_main,
            );
            constrain_max_size(
                child,
                cross_axis,
                inner_cross,
                inner_width,
                &mut cross_mode,
                &mut child_cross,
            );

            // Stretched items get their real layout once the line's cross size is known.
            let requires_stretch_layout = !cross_defined && align == Align::Stretch;
            let row = frame.is_main_axis_row;
            let request = frame.child_request(
                by_axis(row, child_main, child_cross),
                by_axis(row, child_cross, child_main),
                by_axis(row, main_mode, cross_mode),
                by_axis(row, cross_mode, main_mode),
                frame.perform_layout && !requires_stretch_layout,
                "flex",
            );
            self.layout_node_internal(config, child_id, request)?;

            let child_overflow = self.at(child_id).layout.had_overflow;
            self.at_mut(id).layout.had_overflow |= child_overflow;
        }
        Ok(delta_free_space)
    }

    /// Distributes leftover main-axis space and positions the line's items
    /// along the main axis. Returns the line's main and cross extents.
    fn justify_main_axis(
        &mut self,
        id: NodeId,
        frame: &Frame,
        line: &mut FlexLine,
        children: &[NodeId],
        can_skip_flex: bool,
    ) -> (f32, f32) {
        let main_axis = frame.main_axis;
        let inner_width = frame.available_inner_width;
        let node = self.at(id);

        if frame.main_mode == MeasureMode::AtMost && line.remaining_free_space > 0.0 {
            let min = node.style.min_dimension(main_axis.dimension());
            let min_main = min.resolve(frame.main_parent_size);
            line.remaining_free_space = if min.is_defined() && min_main >= 0.0 {
                (min_main - (frame.available_inner_main - line.remaining_free_space)).max(0.0)
            } else {
                0.0
            };
        }
        let free_space = line.remaining_free_space;

        let auto_margins: usize = children[line.start..line.end]
            .iter()
            .map(|&child_id| self.at(child_id))
            .filter(|child| !child.is_hidden() && child.style.position_type == PositionType::Relative)
            .map(|child| {
                usize::from(child.margin_leading_value(main_axis).is_auto())
                    + usize::from(child.margin_trailing_value(main_axis).is_auto())
            })
            .sum();

        let items = line.items.len();
        let (leading_main, between_main) = if auto_margins > 0 || items == 0 {
            (0.0, 0.0)
        } else {
            match frame.justify {
                Justify::FlexStart => (0.0, 0.0),
                Justify::Center => (free_space / 2.0, 0.0),
                Justify::FlexEnd => (free_space, 0.0),
                Justify::SpaceBetween if items > 1 => {
                    (0.0, free_space.max(0.0) / (items - 1) as f32)
                }
                Justify::SpaceBetween => (0.0, 0.0),
                Justify::SpaceAround => {
                    let between = free_space / items as f32;
                    (between / 2.0, between)
                }
            }
        };
        let auto_margin_share = if auto_margins > 0 {
            free_space / auto_margins as f32
        } else {
            0.0
        };

        let leading_border_main = node.leading_border(main_axis);
        let leading_edge = main_axis.leading_edge();
        let mut main_dim = frame.leading_pb_main + leading_main;
        let mut cross_dim = 0.0f32;

        for &child_id in &children[line.start..line.end] {
            let child = self.at_mut(child_id);
            if child.is_hidden() {
                continue;
            }
            let absolute = child.style.position_type == PositionType::Absolute;
            if absolute && child.is_leading_pos_defined(main_axis) {
                if frame.perform_layout {
                    let position = child.leading_position(main_axis, frame.available_inner_main)
                        + leading_border_main
                        + child.leading_margin(main_axis, inner_width);
                    child.set_position_on(leading_edge, position);
                }
            } else if !absolute {
                if child.margin_leading_value(main_axis).is_auto() {
                    main_dim += auto_margin_share;
                }
                if frame.perform_layout {
                    let position = child.position_on(leading_edge) + main_dim;
                    child.set_position_on(leading_edge, position);
                }
                if child.margin_trailing_value(main_axis).is_auto() {
                    main_dim += auto_margin_share;
                }

                if can_skip_flex {
                    // Measuring only: the basis is the item's main size.
                    main_dim += between_main
                        + child.margin_for_axis(main_axis, inner_width)
                        + child.layout.computed_flex_basis;
                    cross_dim = frame.available_inner_cross;
                } else {
                    main_dim += between_main + child.dim_with_margin(main_axis, inner_width);
                    cross_dim =
                        cross_dim.max(child.dim_with_margin(frame.cross_axis, inner_width));
                }
            } else if frame.perform_layout {
                let position = child.position_on(leading_edge) + leading_border_main + leading_main;
                child.set_position_on(leading_edge, position);
            }
        }

        (main_dim + frame.trailing_pb_main, cross_dim)
    }

    /// Cross-axis placement of one line's items, stretching where asked.
    #[allow(clippy::too_many_arguments)]
    fn align_items_in_line(
        &mut self,
        config: &Config,
        id: NodeId,
        frame: &Frame,
        line: &FlexLine,
        children: &[NodeId],
        cross_dim: f32,
        container_cross: f32,
        total_line_cross: f32,
    ) -> Result<()> {
        let main_axis = frame.main_axis;
        let cross_axis = frame.cross_axis;
        let inner_width = frame.available_inner_width;
        let inner_cross = frame.available_inner_cross;
        let leading_edge = cross_axis.leading_edge();

        for &child_id in &children[line.start..line.end] {
            let node = self.at(id);
            let child = self.at(child_id);
            if child.is_hidden() {
                continue;
            }

            if child.style.position_type == PositionType::Absolute {
                let mut position =
                    node.leading_border(cross_axis) + child.leading_margin(cross_axis, inner_width);
                if child.is_leading_pos_defined(cross_axis) {
                    position += child.leading_position(cross_axis, inner_cross);
                }
                self.at_mut(child_id).set_position_on(leading_edge, position);
                continue;
            }

            let mut leading_cross = frame.leading_pb_cross;
            let align = node.align_item(child);
            let leading_auto = child.margin_leading_value(cross_axis).is_auto();
            let trailing_auto = child.margin_trailing_value(cross_axis).is_auto();

            if align == Align::Stretch && !leading_auto && !trailing_auto {
                if !child.is_style_dim_defined(cross_axis, inner_cross) {
                    let mut child_main = child.measured_on(main_axis);
                    let mut child_cross = match child.aspect_ratio() {
                        Some(ratio) => {
                            child.margin_for_axis(cross_axis, inner_width)
                                + if frame.is_main_axis_row {
                                    child_main / ratio
                                } else {
                                    child_main * ratio
                                }
                        }
                        None => cross_dim,
                    };
                    child_main += child.margin_for_axis(main_axis, inner_width);

                    let mut main_mode = MeasureMode::Exactly;
                    let mut cross_mode = MeasureMode::Exactly;
                    constrain_max_size(
                        child,
                        main_axis,
                        frame.available_inner_main,
                        inner_width,
                        &mut main_mode,
                        &mut child_main,
                    );
                    constrain_max_size(
                        child,
                        cross_axis,
                        inner_cross,
                        inner_width,
                        &mut cross_mode,
                        &mut child_cross,
                    );

                    let row = frame.is_main_axis_row;
                    let width = by_axis(row, child_main, child_cross);
                    let height = by_axis(row, child_cross, child_main);
                    let mode_for = |size: f32| {
                        if size.is_nan() {
                            MeasureMode::Undefined
                        } else {
                            MeasureMode::Exactly
                        }
                    };
                    let request = frame.child_request(
                        width,
                        height,
                        mode_for(width),
                        mode_for(height),
                        true,
                        "stretch",
                    );
                    self.layout_node_internal(config, child_id, request)?;
                }
            } else {
                let remaining = container_cross - child.dim_with_margin(cross_axis, inner_width);
                leading_cross += match (leading_auto, trailing_auto, align) {
                    (true, true, _) => (remaining / 2.0).max(0.0),
                    (_, true, _) => 0.0,
                    (true, false, _) => remaining.max(0.0),
                    (false, false, Align::FlexStart) => 0.0,
                    (false, false, Align::Center) => remaining / 2.0,
                    (false, false, _) => remaining,
                };
            }

            let child = self.at_mut(child_id);
            let position = child.position_on(leading_edge) + total_line_cross + leading_cross;
            child.set_position_on(leading_edge, position);
        }
        Ok(())
    }

    /// Distributes cross-axis space between lines and aligns items within
    /// each line, including baseline alignment.
    fn align_lines(
        &mut self,
        config: &Config,
        id: NodeId,
        frame: &Frame,
        children: &[NodeId],
        line_count: usize,
        total_line_cross: f32,
    ) -> Result<()> {
        let cross_axis = frame.cross_axis;
        let inner_width = frame.available_inner_width;
        let inner_cross = frame.available_inner_cross;
        let leading_edge = cross_axis.leading_edge();
        let remaining = inner_cross - total_line_cross;
        let lines = line_count as f32;
        let has_room = inner_cross > total_line_cross;

        let mut cross_dim_lead = 0.0;
        let mut current_lead = frame.leading_pb_cross;
        match self.at(id).style.align_content {
            Align::FlexEnd => current_lead += remaining,
            Align::Center => current_lead += remaining / 2.0,
            Align::Stretch => {
                if has_room {
                    cross_dim_lead = remaining / lines;
                }
            }
            Align::SpaceAround => {
                if has_room {
                    current_lead += remaining / (2.0 * lines);
                    if line_count > 1 {
                        cross_dim_lead = remaining / lines;
                    }
                } else {
                    current_lead += remaining / 2.0;
                }
            }
            Align::SpaceBetween => {
                if has_room && line_count > 1 {
                    cross_dim_lead = remaining / (lines - 1.0);
                }
            }
            Align::Auto | Align::FlexStart | Align::Baseline => {}
        }

        let mut end_index = 0;
        for line in 0..line_count {
            let start_index = end_index;
            let mut line_height = 0.0f32;
            let mut max_ascent = 0.0f32;
            let mut max_descent = 0.0f32;

            let mut index = start_index;
            while index < children.len() {
                let child_id = children[index];
                let child = self.at(child_id);
                if child.is_hidden() || child.style.position_type != PositionType::Relative {
                    index += 1;
                    continue;
                }
                if child.layout.line_index != line {
                    break;
                }
                if child.is_layout_dim_defined(cross_axis) {
                    line_height = line_height.max(
                        child.measured_on(cross_axis) + child.margin_for_axis(cross_axis, inner_width),
                    );
                }
                if self.at(id).align_item(child) == Align::Baseline {
                    let leading_margin = child.leading_margin(COLUMN, inner_width);
                    let outer_height = child.measured(Dimension::Height)
                        + child.margin_for_axis(COLUMN, inner_width);
                    let ascent = self.baseline(config, child_id)? + leading_margin;
                    let descent = outer_height - ascent;
                    max_ascent = max_ascent.max(ascent);
                    max_descent = max_descent.max(descent);
                    line_height = line_height.max(max_ascent + max_descent);
                }
                index += 1;
            }
            end_index = index;
            line_height += cross_dim_lead;

            for &child_id in &children[start_index..end_index] {
                let child = self.at(child_id);
                if child.is_hidden() || child.style.position_type != PositionType::Relative {
                    continue;
                }
                let align = self.at(id).align_item(child);
                match align {
                    Align::FlexStart => {
                        let position = current_lead + child.leading_margin(cross_axis, inner_width);
                        self.at_mut(child_id).set_position_on(leading_edge, position);
                    }
                    Align::FlexEnd => {
                        let position = current_lead + line_height
                            - child.trailing_margin(cross_axis, inner_width)
                            - child.measured_on(cross_axis);
                        self.at_mut(child_id).set_position_on(leading_edge, position);
                    }
                    Align::Center => {
                        let position = current_lead + (line_height - child.measured_on(cross_axis)) / 2.0;
                        self.at_mut(child_id).set_position_on(leading_edge, position);
                    }
                    Align::Stretch => {
                        let position = current_lead + child.leading_margin(cross_axis, inner_width);
                        let relayout = if child.is_style_dim_defined(cross_axis, inner_cross) {
                            None
                        } else {
                            let row = frame.is_main_axis_row;
                            // Main-axis margin in both orientations. Column
                            // containers must not add the cross margin here.
                            let outer_main = child.measured_on(frame.main_axis)
                                + child.margin_for_axis(frame.main_axis, inner_width);
                            let width = by_axis(row, outer_main, line_height);
                            let height = by_axis(row, line_height, outer_main);
                            let unchanged = float_eq(width, child.measured(Dimension::Width))
                                && float_eq(height, child.measured(Dimension::Height));
                            (!unchanged).then_some((width, height))
                        };
                        self.at_mut(child_id).set_position_on(leading_edge, position);
                        if let Some((width, height)) = relayout {
                            let request = frame.child_request(
                                width,
                                height,
                                MeasureMode::Exactly,
                                MeasureMode::Exactly,
                                true,
                                "multiline-stretch",
                            );
                            self.layout_node_internal(config, child_id, request)?;
                        }
                    }
                    Align::Baseline => {
                        let offset = child.leading_position(COLUMN, inner_cross);
                        let baseline = self.baseline(config, child_id)?;
                        let position = current_lead + max_ascent - baseline + offset;
                        self.at_mut(child_id).set_position_on(Edge::Top, position);
                    }
                    Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
                }
            }

            current_lead += line_height;
        }
        Ok(())
    }

    /// Final measured size: the available size by default, the content size
    /// along axes sized by content. Scroll containers cap content at the
    /// available size.
    fn size_container(
        &mut self,
        id: NodeId,
        frame: &Frame,
        request: &LayoutRequest,
        max_line_main: f32,
        total_line_cross: f32,
    ) {
        let node = self.at_mut(id);
        let parent_width = request.parent_width;
        let width = node.bound_axis(
            ROW,
            request.available_width - frame.margin_row,
            parent_width,
            parent_width,
        );
        let height = node.bound_axis(
            COLUMN,
            request.available_height - frame.margin_column,
            request.parent_height,
            parent_width,
        );
        node.set_measured(Dimension::Width, width);
        node.set_measured(Dimension::Height, height);

        let scroll = node.style.overflow == Overflow::Scroll;
        let axes = [
            (
                frame.main_axis,
                frame.main_mode,
                max_line_main,
                frame.available_inner_main + frame.pb_main,
                frame.pb_main,
                frame.main_parent_size,
            ),
            (
                frame.cross_axis,
                frame.cross_mode,
                total_line_cross + frame.pb_cross,
                frame.available_inner_cross + frame.pb_cross,
                frame.pb_cross,
                frame.cross_parent_size,
            ),
        ];
        for (axis, mode, content, available, padding_and_border, parent_size) in axes {
            let size = match mode {
                MeasureMode::Undefined => {
                    node.bound_axis(axis, content, parent_size, parent_width)
                }
                MeasureMode::AtMost if !scroll => {
                    node.bound_axis(axis, content, parent_size, parent_width)
                }
                MeasureMode::AtMost => available
                    .min(node.bound_axis_within_min_and_max(axis, content, parent_size))
                    .max(padding_and_border),
                MeasureMode::Exactly => continue,
            };
            node.set_measured(axis.dimension(), size);
        }
    }
}
