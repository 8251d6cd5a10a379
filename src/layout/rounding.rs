use crate::style::{Dimension, Edge, NodeType, float_eq};
use crate::tree::{LayoutTree, NodeId};

/// Snaps `value` to the device pixel grid described by `point_scale_factor`.
///
/// Values already on the grid (within tolerance) are kept; otherwise the
/// forced direction wins, falling back to round-half-up.
pub(crate) fn round_value_to_pixel_grid(
    value: f32,
    point_scale_factor: f32,
    force_ceil: bool,
    force_floor: bool,
) -> f32 {
    let mut scaled = value * point_scale_factor;
    let fraction = scaled % 1.0;
    if float_eq(fraction, 0.0) {
        scaled -= fraction;
    } else if float_eq(fraction, 1.0) {
        scaled = scaled - fraction + 1.0;
    } else if force_ceil {
        scaled = scaled - fraction + 1.0;
    } else if force_floor {
        scaled -= fraction;
    } else {
        scaled = scaled - fraction + if fraction >= 0.5 { 1.0 } else { 0.0 };
    }
    scaled / point_scale_factor
}

fn has_fraction(value: f32, point_scale_factor: f32) -> bool {
    let fraction = (value * point_scale_factor) % 1.0;
    !float_eq(fraction, 0.0) && !float_eq(fraction, 1.0)
}

impl LayoutTree {
    /// Rounds edges in absolute coordinates so siblings never gap or overlap.
    /// Text nodes round their size up, never down.
    pub(crate) fn round_to_pixel_grid(
        &mut self,
        id: NodeId,
        point_scale_factor: f32,
        absolute_left: f32,
        absolute_top: f32,
    ) {
        if point_scale_factor == 0.0 {
            return;
        }

        let node = self.at_mut(id);
        let layout = &mut node.layout;
        let left = layout.position[Edge::Left.index()];
        let top = layout.position[Edge::Top.index()];
        let width = layout.dimensions[Dimension::Width.index()];
        let height = layout.dimensions[Dimension::Height.index()];

        let absolute_node_left = absolute_left + left;
        let absolute_node_top = absolute_top + top;
        let absolute_node_right = absolute_node_left + width;
        let absolute_node_bottom = absolute_node_top + height;

        let text = node.node_type == NodeType::Text;
        let fractional_width = has_fraction(width, point_scale_factor);
        let fractional_height = has_fraction(height, point_scale_factor);

        let snap = |value, ceil, floor| round_value_to_pixel_grid(value, point_scale_factor, ceil, floor);

        layout.position[Edge::Left.index()] = snap(left, false, text);
        layout.position[Edge::Top.index()] = snap(top, false, text);
        layout.dimensions[Dimension::Width.index()] = snap(
            absolute_node_right,
            text && fractional_width,
            text && !fractional_width,
        ) - snap(absolute_node_left, false, text);
        layout.dimensions[Dimension::Height.index()] = snap(
            absolute_node_bottom,
            text && fractional_height,
            text && !fractional_height,
        ) - snap(absolute_node_top, false, text);

        let children = node.children.clone();
        for child in children {
            self.round_to_pixel_grid(child, point_scale_factor, absolute_node_left, absolute_node_top);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_by_default() {
        assert_eq!(round_value_to_pixel_grid(10.4, 1.0, false, false), 10.0);
        assert_eq!(round_value_to_pixel_grid(10.5, 1.0, false, false), 11.0);
    }

    #[test]
    fn forced_directions_apply_to_fractions_only() {
        assert_eq!(round_value_to_pixel_grid(10.2, 1.0, true, false), 11.0);
        assert_eq!(round_value_to_pixel_grid(10.8, 1.0, false, true), 10.0);
        assert_eq!(round_value_to_pixel_grid(10.0, 1.0, true, false), 10.0);
    }

    #[test]
    fn scale_factor_rounds_to_sub_points() {
        assert_eq!(round_value_to_pixel_grid(10.3, 2.0, false, false), 10.5);
        assert_eq!(round_value_to_pixel_grid(10.2, 2.0, false, false), 10.0);
    }

    #[test]
    fn undefined_stays_undefined() {
        assert!(round_value_to_pixel_grid(f32::NAN, 1.0, false, false).is_nan());
    }
}
