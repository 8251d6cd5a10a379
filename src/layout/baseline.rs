use crate::config::Config;
use crate::error::{LayoutError, Result};
use crate::style::{Align, Dimension, Edge, PositionType};
use crate::tree::{LayoutTree, NodeId};

impl LayoutTree {
    /// Distance from the top of `id` to its first baseline.
    ///
    /// Without a baseline function the node borrows the baseline of its
    /// first baseline-aligned child on the first line, else its first
    /// in-flow child, else its own height.
    pub(crate) fn baseline(&mut self, config: &Config, id: NodeId) -> Result<f32> {
        let node = self.at_mut(id);
        let width = node.measured(Dimension::Width);
        let height = node.measured(Dimension::Height);
        if let Some(baseline) = node.baseline.as_mut() {
            let value = baseline(id, width, height);
            config.record(|metrics| metrics.record_baseline());
            if value.is_nan() {
                return Err(self.violation(id, LayoutError::InvalidBaseline(id)));
            }
            return Ok(value);
        }

        let node = self.at(id);
        let mut baseline_child = None;
        for &child_id in &node.children {
            let child = self.at(child_id);
            if child.layout.line_index > 0 {
                break;
            }
            if child.style.position_type == PositionType::Absolute {
                continue;
            }
            if node.align_item(child) == Align::Baseline {
                baseline_child = Some(child_id);
                break;
            }
            if baseline_child.is_none() {
                baseline_child = Some(child_id);
            }
        }

        let Some(child) = baseline_child else {
            return Ok(height);
        };
        let child_baseline = self.baseline(config, child)?;
        Ok(child_baseline + self.at(child).position_on(Edge::Top))
    }

    /// Row containers whose items (or whose own `align-items`) ask for
    /// baseline alignment.
    pub(crate) fn is_baseline_layout(&self, id: NodeId) -> bool {
        let node = self.at(id);
        if node.style.flex_direction.is_column() {
            return false;
        }
        if node.style.align_items == Align::Baseline {
            return true;
        }
        node.children.iter().any(|&child| {
            let child = self.at(child);
            child.style.position_type == PositionType::Relative
                && child.style.align_self == Align::Baseline
        })
    }
}
