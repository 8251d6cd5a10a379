use crate::config::Config;
use crate::error::Result;
use crate::style::{Align, Dimension, Direction, FlexDirection, Justify, MeasureMode, UNDEFINED, Wrap};
use crate::tree::{LayoutTree, NodeId};

use super::cache::LayoutRequest;

/// Containing-block constraints handed to an out-of-flow child.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AbsoluteFrame {
    pub(crate) width: f32,
    pub(crate) width_mode: MeasureMode,
    pub(crate) height: f32,
    pub(crate) direction: Direction,
    pub(crate) depth: u32,
}

impl LayoutTree {
    /// Sizes and places an absolutely positioned child of `parent` against
    /// the parent's padding box.
    pub(crate) fn layout_absolute_child(
        &mut self,
        config: &Config,
        parent: NodeId,
        child: NodeId,
        frame: AbsoluteFrame,
    ) -> Result<()> {
        let AbsoluteFrame {
            width,
            width_mode,
            height,
            direction,
            depth,
        } = frame;
        let row = FlexDirection::Row;
        let column = FlexDirection::Column;

        let container = self.at(parent);
        let main_axis = container.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let is_main_axis_row = main_axis.is_row();

        let node = self.at(child);
        let mut child_width = UNDEFINED;
        let mut child_height = UNDEFINED;

        let margin_row = node.margin_for_axis(row, width);
        let margin_column = node.margin_for_axis(column, width);

        if node.is_style_dim_defined(row, width) {
            child_width = node.resolved_dimension(Dimension::Width).resolve(width) + margin_row;
        } else if node.is_leading_pos_defined(row) && node.is_trailing_pos_defined(row) {
            // Both insets set: stretch between them.
            child_width = container.measured(Dimension::Width)
                - (container.leading_border(row) + container.trailing_border(row))
                - (node.leading_position(row, width) + node.trailing_position(row, width));
            child_width = node.bound_axis(row, child_width, width, width);
        }

        if node.is_style_dim_defined(column, height) {
            child_height =
                node.resolved_dimension(Dimension::Height).resolve(height) + margin_column;
        } else if node.is_leading_pos_defined(column) && node.is_trailing_pos_defined(column) {
            child_height = container.measured(Dimension::Height)
                - (container.leading_border(column) + container.trailing_border(column))
                - (node.leading_position(column, height) + node.trailing_position(column, height));
            child_height = node.bound_axis(column, child_height, height, width);
        }

        // Aspect ratio needs exactly one anchored dimension.
        if child_width.is_nan() != child_height.is_nan() {
            if let Some(ratio) = node.aspect_ratio() {
                if child_width.is_nan() {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                } else {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                }
            }
        }

        if child_width.is_nan() || child_height.is_nan() {
            let mut width_measure_mode = if child_width.is_nan() {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
            let height_measure_mode = if child_height.is_nan() {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };

            // Let content wrap to the containing block's width.
            if !is_main_axis_row
                && child_width.is_nan()
                && width_mode != MeasureMode::Undefined
                && width > 0.0
            {
                child_width = width;
                width_measure_mode = MeasureMode::AtMost;
            }

            self.layout_node_internal(
                config,
                child,
                LayoutRequest {
                    available_width: child_width,
                    available_height: child_height,
                    parent_direction: direction,
                    width_mode: width_measure_mode,
                    height_mode: height_measure_mode,
                    parent_width: child_width,
                    parent_height: child_height,
                    perform_layout: false,
                    reason: "abs-measure",
                    depth: depth + 1,
                },
            )?;
            let node = self.at(child);
            child_width = node.measured(Dimension::Width) + node.margin_for_axis(row, width);
            child_height = node.measured(Dimension::Height) + node.margin_for_axis(column, width);
        }

        self.layout_node_internal(
            config,
            child,
            LayoutRequest {
                available_width: child_width,
                available_height: child_height,
                parent_direction: direction,
                width_mode: MeasureMode::Exactly,
                height_mode: MeasureMode::Exactly,
                parent_width: child_width,
                parent_height: child_height,
                perform_layout: true,
                reason: "abs-layout",
                depth: depth + 1,
            },
        )?;

        let main_size = if is_main_axis_row { width } else { height };
        let cross_size = if is_main_axis_row { height } else { width };
        let container = self.at(parent);
        let node = self.at(child);
        let justify = container.style.justify_content;
        let align = container.align_item(node);
        let wrap_reverse = container.style.flex_wrap == Wrap::WrapReverse;

        let main_free = container.measured_on(main_axis) - node.measured_on(main_axis);
        let main_leading = if node.is_trailing_pos_defined(main_axis)
            && !node.is_leading_pos_defined(main_axis)
        {
            Some(
                main_free
                    - container.trailing_border(main_axis)
                    - node.trailing_margin(main_axis, width)
                    - node.trailing_position(main_axis, main_size),
            )
        } else if !node.is_leading_pos_defined(main_axis) && justify == Justify::Center {
            Some(main_free / 2.0)
        } else if !node.is_leading_pos_defined(main_axis) && justify == Justify::FlexEnd {
            Some(main_free)
        } else {
            None
        };

        let cross_free = container.measured_on(cross_axis) - node.measured_on(cross_axis);
        let cross_leading = if node.is_trailing_pos_defined(cross_axis)
            && !node.is_leading_pos_defined(cross_axis)
        {
            Some(
                cross_free
                    - container.trailing_border(cross_axis)
                    - node.trailing_margin(cross_axis, width)
                    - node.trailing_position(cross_axis, cross_size),
            )
        } else if !node.is_leading_pos_defined(cross_axis) && align == Align::Center {
            Some(cross_free / 2.0)
        } else if !node.is_leading_pos_defined(cross_axis)
            && ((align == Align::FlexEnd) ^ wrap_reverse)
        {
            Some(cross_free)
        } else {
            None
        };

        let node = self.at_mut(child);
        if let Some(value) = main_leading {
            node.set_position_on(main_axis.leading_edge(), value);
        }
        if let Some(value) = cross_leading {
            node.set_position_on(cross_axis.leading_edge(), value);
        }
        Ok(())
    }
}
