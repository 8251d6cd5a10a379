//! Serde templates for building trees and comparing their results.
//!
//! A [`NodeTemplate`] describes a subtree as plain data, typically JSON:
//!
//! ```json
//! {"style": {"flex_direction": "row", "width": 100, "padding": {"all": 5}},
//!  "children": [{"style": {"flex_grow": 1}}, {"measure": {"width": 20, "height": 10}}]}
//! ```
//!
//! [`LayoutTree::snapshot`] turns a laid-out subtree back into data.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Size;
use crate::style::{MeasureMode, Style};
use crate::tree::{LayoutTree, NodeId};

/// A node and its descendants as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTemplate {
    pub style: Style,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeTemplate>,
    /// Gives the node a measure function reporting this content size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<MeasureTemplate>,
}

impl NodeTemplate {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Fixed content size, clamped to an `at-most` constraint the way text
/// would wrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureTemplate {
    pub width: f32,
    pub height: f32,
}

impl MeasureTemplate {
    fn measure(self, width: f32, width_mode: MeasureMode, height: f32, height_mode: MeasureMode) -> Size {
        let fit = |content: f32, available: f32, mode: MeasureMode| match mode {
            MeasureMode::Exactly => available,
            MeasureMode::AtMost => content.min(available),
            MeasureMode::Undefined => content,
        };
        Size::new(
            fit(self.width, width, width_mode),
            fit(self.height, height, height_mode),
        )
    }
}

/// Computed geometry of a subtree, for assertions and golden files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutSnapshot>,
}

impl LayoutTree {
    /// Builds the subtree described by `template` and returns its root.
    pub fn instantiate(&mut self, template: &NodeTemplate) -> Result<NodeId> {
        let id = self.new_node();
        self.set_style(id, template.style.clone())?;
        if let Some(measure) = template.measure {
            self.set_measure_func(
                id,
                Some(Box::new(move |_, width, width_mode, height, height_mode| {
                    measure.measure(width, width_mode, height, height_mode)
                })),
            )?;
        }
        for child in &template.children {
            let child = self.instantiate(child)?;
            self.append_child(id, child)?;
        }
        Ok(id)
    }

    pub fn snapshot(&self, id: NodeId) -> Result<LayoutSnapshot> {
        let node = self.node(id)?;
        let layout = node.layout();
        let children = node
            .children()
            .iter()
            .map(|&child| self.snapshot(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(LayoutSnapshot {
            left: layout.left(),
            top: layout.top(),
            width: layout.width(),
            height: layout.height(),
            children,
        })
    }
}
