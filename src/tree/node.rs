use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{LayoutError, Result};
use crate::geometry::{Rect, Size};
use crate::layout::cache::MeasureCache;
use crate::metrics;
use crate::style::{Dimension, Direction, Edge, MeasureMode, NodeType, Style, UNDEFINED, Value};

/// Handle to a node owned by a [`LayoutTree`](crate::LayoutTree).
///
/// Handles carry the slot generation, so a handle to a freed node never
/// aliases whatever reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Host callback reporting a leaf's intrinsic size for the given constraint.
///
/// Arguments are `(node, width, width_mode, height, height_mode)`; a width or
/// height is NaN when its mode is [`MeasureMode::Undefined`].
pub type MeasureFunc = Box<dyn FnMut(NodeId, f32, MeasureMode, f32, MeasureMode) -> Size>;

/// Host callback reporting the distance from a node's top edge to its first
/// baseline, given the node's measured `(width, height)`.
pub type BaselineFunc = Box<dyn FnMut(NodeId, f32, f32) -> f32>;

/// Computed geometry for one node, valid after a layout pass.
#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) position: [f32; 4],
    pub(crate) dimensions: [f32; 2],
    pub(crate) margin: [f32; 6],
    pub(crate) border: [f32; 6],
    pub(crate) padding: [f32; 6],
    pub(crate) direction: Direction,
    pub(crate) computed_flex_basis_generation: u32,
    pub(crate) computed_flex_basis: f32,
    pub(crate) had_overflow: bool,
    pub(crate) generation_count: u32,
    pub(crate) last_parent_direction: Option<Direction>,
    pub(crate) line_index: usize,
    pub(crate) measured_dimensions: [f32; 2],
    pub(crate) cache: MeasureCache,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [UNDEFINED; 2],
            margin: [0.0; 6],
            border: [0.0; 6],
            padding: [0.0; 6],
            direction: Direction::Inherit,
            computed_flex_basis_generation: 0,
            computed_flex_basis: UNDEFINED,
            had_overflow: false,
            generation_count: 0,
            last_parent_direction: None,
            line_index: 0,
            measured_dimensions: [UNDEFINED; 2],
            cache: MeasureCache::default(),
        }
    }
}

impl Layout {
    pub fn left(&self) -> f32 {
        self.position[Edge::Left.index()]
    }

    pub fn top(&self) -> f32 {
        self.position[Edge::Top.index()]
    }

    pub fn right(&self) -> f32 {
        self.position[Edge::Right.index()]
    }

    pub fn bottom(&self) -> f32 {
        self.position[Edge::Bottom.index()]
    }

    pub fn width(&self) -> f32 {
        self.dimensions[Dimension::Width.index()]
    }

    pub fn height(&self) -> f32 {
        self.dimensions[Dimension::Height.index()]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn had_overflow(&self) -> bool {
        self.had_overflow
    }

    /// Border box relative to the parent's border box.
    pub fn rect(&self) -> Rect {
        Rect::new(self.left(), self.top(), self.width(), self.height())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn margin(&self, edge: Edge) -> Result<f32> {
        self.resolved_edge(&self.margin, edge)
    }

    pub fn border(&self, edge: Edge) -> Result<f32> {
        self.resolved_edge(&self.border, edge)
    }

    pub fn padding(&self, edge: Edge) -> Result<f32> {
        self.resolved_edge(&self.padding, edge)
    }

    /// Maps physical left/right onto the logical slots for the resolved
    /// direction. Only `Left` through `Start` can be read back.
    fn resolved_edge(&self, values: &[f32; 6], edge: Edge) -> Result<f32> {
        let rtl = self.direction == Direction::Rtl;
        let slot = match edge {
            Edge::Left if rtl => Edge::End,
            Edge::Left => Edge::Start,
            Edge::Right if rtl => Edge::Start,
            Edge::Right => Edge::End,
            Edge::Top | Edge::Bottom | Edge::Start => edge,
            Edge::End | Edge::Horizontal | Edge::Vertical | Edge::All => {
                return Err(LayoutError::ShorthandEdge(edge));
            }
        };
        Ok(values[slot.index()])
    }
}

/// A styled box in a [`LayoutTree`](crate::LayoutTree).
pub struct Node {
    pub(crate) style: Style,
    pub(crate) layout: Layout,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) measure: Option<MeasureFunc>,
    pub(crate) baseline: Option<BaselineFunc>,
    pub(crate) config: Arc<Config>,
    pub(crate) node_type: NodeType,
    pub(crate) is_dirty: bool,
    pub(crate) has_new_layout: bool,
    pub(crate) resolved_dimensions: [Value; 2],
}

impl Node {
    pub(crate) fn new(config: Arc<Config>) -> Self {
        metrics::node_created();
        let style = if config.use_web_defaults() {
            Style::web()
        } else {
            Style::default()
        };
        Self {
            style,
            layout: Layout::default(),
            parent: None,
            children: Vec::new(),
            measure: None,
            baseline: None,
            config,
            node_type: NodeType::Default,
            is_dirty: false,
            has_new_layout: true,
            resolved_dimensions: [Value::Undefined; 2],
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).copied()
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn has_measure_func(&self) -> bool {
        self.measure.is_some()
    }

    pub fn has_baseline_func(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn has_new_layout(&self) -> bool {
        self.has_new_layout
    }

    /// Style flex-grow, 0 when unset.
    pub fn flex_grow(&self) -> f32 {
        self.style.flex_grow.unwrap_or(0.0)
    }

    /// Style flex-shrink, defaulting to 1 under web defaults and 0 otherwise.
    pub fn flex_shrink(&self) -> f32 {
        self.style.flex_shrink.unwrap_or(if self.config.use_web_defaults() {
            1.0
        } else {
            0.0
        })
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        metrics::nodes_released(1);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("has_measure_func", &self.measure.is_some())
            .field("has_baseline_func", &self.baseline.is_some())
            .field("node_type", &self.node_type)
            .field("is_dirty", &self.is_dirty)
            .finish_non_exhaustive()
    }
}
