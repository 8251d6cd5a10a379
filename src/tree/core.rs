use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{LayoutError, Result};
use crate::style::{NodeType, Style};

use super::node::{BaselineFunc, Layout, MeasureFunc, Node, NodeId};
use super::style_mut::StyleMut;

const TARGET: &str = "room_flex::tree";

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena owning every node of one or more layout trees.
///
/// Nodes refer to each other through [`NodeId`] handles: children are an
/// ordered list of ids and the parent link is a plain back-reference, so no
/// node owns another.
pub struct LayoutTree {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    config: Arc<Config>,
    live: usize,
    pub(crate) generation: u32,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_shared_config(Arc::new(Config::default()))
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    /// Tree whose nodes default to `config`.
    pub fn with_shared_config(config: Arc<Config>) -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            config,
            live: 0,
            generation: 0,
        }
    }

    pub fn with_capacity(config: Config, capacity: usize) -> Self {
        let mut tree = Self::with_config(config);
        tree.reserve(capacity);
        tree
    }

    pub fn reserve(&mut self, additional: usize) {
        let spare = self.free_slots.len();
        self.slots.reserve(additional.saturating_sub(spare));
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Live nodes in this arena.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Number of `calculate_layout` calls made on this arena.
    pub fn layout_generation(&self) -> u32 {
        self.generation
    }

    pub fn new_node(&mut self) -> NodeId {
        let config = Arc::clone(&self.config);
        self.new_node_with_config(config)
    }

    pub fn new_node_with_config(&mut self, config: Arc<Config>) -> NodeId {
        let node = Node::new(config);
        self.live += 1;
        if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(LayoutError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(LayoutError::NodeNotFound(id))
    }

    /// Lookup for ids reachable from live nodes, which are always live.
    pub(crate) fn at(&self, id: NodeId) -> &Node {
        self.get(id)
            .unwrap_or_else(|| panic!("node {id} is referenced by the tree but was freed"))
    }

    pub(crate) fn at_mut(&mut self, id: NodeId) -> &mut Node {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("node {id} is referenced by the tree but was freed"))
    }

    /// Logs a broken contract through `id`'s config and returns it.
    pub(crate) fn violation(&self, id: NodeId, error: LayoutError) -> LayoutError {
        let config = self.get(id).map_or(&self.config, |node| &node.config);
        config.fatal(TARGET, error)
    }

    /// Frees `id`. Its parent forgets it and its children become roots.
    pub fn free(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.at_mut(parent).children.retain(|child| *child != id);
            self.mark_dirty_internal(parent);
        }

        let children = std::mem::take(&mut self.at_mut(id).children);
        for child in children {
            self.at_mut(child).parent = None;
        }

        let slot = &mut self.slots[id.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index);
        self.live -= 1;
        Ok(())
    }

    /// Frees `root` and its whole subtree, children first.
    pub fn free_recursive(&mut self, root: NodeId) -> Result<()> {
        while let Some(child) = self.node(root)?.child(0) {
            self.remove_child(root, child)?;
            self.free_recursive(child)?;
        }
        self.free(root)
    }

    /// Restores default style and layout, keeping the node's config.
    ///
    /// Only detached, childless nodes can be reset.
    pub fn reset(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if !node.children.is_empty() {
            return Err(self.violation(id, LayoutError::ResetWithChildren(id)));
        }
        if node.parent.is_some() {
            return Err(self.violation(id, LayoutError::ResetWithParent(id)));
        }
        let config = Arc::clone(&node.config);
        *self.at_mut(id) = Node::new(config);
        Ok(())
    }

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let count = self.node(parent)?.children.len();
        if self.node(child)?.parent.is_some() {
            return Err(self.violation(child, LayoutError::ChildHasParent { child }));
        }
        if self.at(parent).measure.is_some() {
            return Err(self.violation(parent, LayoutError::MeasuredNodeCannotHaveChildren(parent)));
        }
        if index > count {
            return Err(self.violation(
                parent,
                LayoutError::ChildIndexOutOfBounds {
                    parent,
                    index,
                    count,
                },
            ));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(self.violation(parent, LayoutError::CyclicInsert { parent, child }));
        }

        self.at_mut(parent).children.insert(index, child);
        self.at_mut(child).parent = Some(parent);
        self.mark_dirty_internal(parent);
        Ok(())
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, child, index)
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.at(node).parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Detaches `child` from `parent`, discarding its layout. Returns `false`
    /// when `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        self.node(child)?;
        let Some(position) = self
            .node(parent)?
            .children
            .iter()
            .position(|candidate| *candidate == child)
        else {
            return Ok(false);
        };

        self.at_mut(parent).children.remove(position);
        let removed = self.at_mut(child);
        removed.layout = Layout::default();
        removed.parent = None;
        self.mark_dirty_internal(parent);
        Ok(true)
    }

    pub fn child(&self, parent: NodeId, index: usize) -> Result<Option<NodeId>> {
        Ok(self.node(parent)?.child(index))
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn child_count(&self, id: NodeId) -> Result<usize> {
        Ok(self.node(id)?.children.len())
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    pub fn style(&self, id: NodeId) -> Result<&Style> {
        Ok(self.node(id)?.style())
    }

    pub fn layout(&self, id: NodeId) -> Result<&Layout> {
        Ok(self.node(id)?.layout())
    }

    /// Setter handle for `id`'s style. Every setter dirties the node only
    /// when the stored value actually changes.
    pub fn style_mut(&mut self, id: NodeId) -> Result<StyleMut<'_>> {
        self.node(id)?;
        Ok(StyleMut::new(self, id))
    }

    /// Replaces the whole style, dirtying the node if anything differs.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.style != style {
            node.style = style;
            self.mark_dirty_internal(id);
        }
        Ok(())
    }

    /// Copies `src`'s style onto `dst`, dirtying `dst` only on a real change.
    pub fn copy_style(&mut self, dst: NodeId, src: NodeId) -> Result<()> {
        let style = self.node(src)?.style.clone();
        self.set_style(dst, style)
    }

    /// Installs or clears the measure callback. Measured nodes are leaves and
    /// round like text.
    pub fn set_measure_func(&mut self, id: NodeId, measure: Option<MeasureFunc>) -> Result<()> {
        let node = self.node(id)?;
        if measure.is_some() && !node.children.is_empty() {
            return Err(self.violation(id, LayoutError::MeasureFuncOnParent(id)));
        }
        let node = self.at_mut(id);
        node.node_type = if measure.is_some() {
            NodeType::Text
        } else {
            NodeType::Default
        };
        node.measure = measure;
        Ok(())
    }

    pub fn set_baseline_func(&mut self, id: NodeId, baseline: Option<BaselineFunc>) -> Result<()> {
        self.node_mut(id)?.baseline = baseline;
        Ok(())
    }

    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) -> Result<()> {
        self.node_mut(id)?.node_type = node_type;
        Ok(())
    }

    /// Invalidates a measured leaf whose content changed outside the tree.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        if self.node(id)?.measure.is_none() {
            return Err(self.violation(id, LayoutError::MarkDirtyWithoutMeasure(id)));
        }
        self.mark_dirty_internal(id);
        Ok(())
    }

    pub fn is_dirty(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_dirty)
    }

    pub fn has_new_layout(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.has_new_layout)
    }

    /// Hosts clear this after consuming a node's fresh layout.
    pub fn set_has_new_layout(&mut self, id: NodeId, has_new_layout: bool) -> Result<()> {
        self.node_mut(id)?.has_new_layout = has_new_layout;
        Ok(())
    }

    /// Dirties `id` and its ancestors, stopping at the first dirty one.
    pub(crate) fn mark_dirty_internal(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.at_mut(id);
            if node.is_dirty {
                return;
            }
            node.is_dirty = true;
            node.layout.computed_flex_basis = f32::NAN;
            current = node.parent;
        }
    }
}

impl Index<NodeId> for LayoutTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.at(id)
    }
}

impl fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTree")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .field("generation", &self.generation)
            .field("config", &self.config)
            .finish()
    }
}
