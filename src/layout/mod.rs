//! Layout orchestration.
//!
//! [`LayoutTree::calculate_layout`] is the only public entry point. It bumps
//! the tree's generation, derives the root's constraints from its style and
//! the caller-supplied parent size, runs the cached flex pass and finally
//! snaps the result to the pixel grid.

mod absolute;
mod baseline;
pub(crate) mod cache;
mod flexbox;
mod print;
mod resolve;
mod rounding;

use std::sync::Arc;

use crate::error::Result;
use crate::style::{Direction, FlexDirection, MeasureMode, UNDEFINED};
use crate::tree::{LayoutTree, Node, NodeId};

use cache::LayoutRequest;

pub use print::PrintOptions;

impl LayoutTree {
    /// Lays out the tree rooted at `root`.
    ///
    /// `None` leaves that axis of the parent unconstrained. Only nodes whose
    /// inputs changed since the last call are recomputed; everything else
    /// is answered from the per-node cache.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        parent_width: Option<f32>,
        parent_height: Option<f32>,
        parent_direction: Direction,
    ) -> Result<()> {
        let config = Arc::clone(&self.node(root)?.config);
        self.generation = self.generation.wrapping_add(1);
        config.record(|metrics| metrics.record_layout_pass());

        let parent_width = parent_width.unwrap_or(UNDEFINED);
        let parent_height = parent_height.unwrap_or(UNDEFINED);

        let node = self.at_mut(root);
        let rounded_dimensions = node.layout.dimensions;
        node.resolve_dimensions();
        let (width, width_mode) =
            root_constraint(node, FlexDirection::Row, parent_width, parent_width);
        let (height, height_mode) =
            root_constraint(node, FlexDirection::Column, parent_height, parent_width);

        let laid_out = self.layout_node_internal(
            &config,
            root,
            LayoutRequest {
                available_width: width,
                available_height: height,
                parent_direction,
                width_mode,
                height_mode,
                parent_width,
                parent_height,
                perform_layout: true,
                reason: "initial",
                depth: 0,
            },
        )?;

        let node = self.at_mut(root);
        if laid_out {
            let direction = node.layout.direction;
            node.apply_relative_position(direction, parent_width, parent_height, parent_width);
            self.round_to_pixel_grid(root, config.point_scale_factor(), 0.0, 0.0);
            if config.trace_tree() {
                self.log_tree(&config, root);
            }
        } else {
            // Nothing below the root was visited, so last pass's rounded
            // geometry still stands; the cache hit only restored raw sizes.
            node.layout.dimensions = rounded_dimensions;
        }
        Ok(())
    }
}

/// The root's own size wins, then its max size as a bound, then the parent.
fn root_constraint(
    node: &Node,
    axis: FlexDirection,
    parent_size: f32,
    parent_width: f32,
) -> (f32, MeasureMode) {
    if node.is_style_dim_defined(axis, parent_size) {
        let size = node.resolved_dimension(axis.dimension()).resolve(parent_size)
            + node.margin_for_axis(axis, parent_width);
        return (size, MeasureMode::Exactly);
    }
    let max = node.style.max_dimension(axis.dimension()).resolve(parent_size);
    if max >= 0.0 {
        (max, MeasureMode::AtMost)
    } else if parent_size.is_nan() {
        (parent_size, MeasureMode::Undefined)
    } else {
        (parent_size, MeasureMode::Exactly)
    }
}
