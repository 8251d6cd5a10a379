use thiserror::Error;

use crate::logging::LoggingError;
use crate::style::Edge;
use crate::tree::NodeId;

/// Unified result type for the flex layout crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by tree mutation and layout.
///
/// Apart from `NodeNotFound`, `ShorthandEdge`, `Logging` and `Fixture`, every variant is
/// a broken caller contract that is logged at `Fatal` level through the
/// node's config before it is returned.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("node {0} does not exist in this tree")]
    NodeNotFound(NodeId),
    #[error("child {child} already has a parent and must be removed first")]
    ChildHasParent { child: NodeId },
    #[error("cannot add child to {0}: nodes with measure functions cannot have children")]
    MeasuredNodeCannotHaveChildren(NodeId),
    #[error("cannot set measure function on {0}: nodes with children cannot measure themselves")]
    MeasureFuncOnParent(NodeId),
    #[error("cannot insert {child} under {parent}: {child} is an ancestor of {parent}")]
    CyclicInsert { parent: NodeId, child: NodeId },
    #[error("child index {index} out of bounds for {parent} with {count} children")]
    ChildIndexOutOfBounds {
        parent: NodeId,
        index: usize,
        count: usize,
    },
    #[error("cannot reset {0}: node still has children attached")]
    ResetWithChildren(NodeId),
    #[error("cannot reset {0}: node is still attached to a parent")]
    ResetWithParent(NodeId),
    #[error("only leaf nodes with custom measure functions should manually mark themselves as dirty ({0})")]
    MarkDirtyWithoutMeasure(NodeId),
    #[error("measure function for {0} returned an undefined size")]
    InvalidMeasurement(NodeId),
    #[error("baseline function for {0} returned an undefined baseline")]
    InvalidBaseline(NodeId),
    #[error("layout values cannot be read for shorthand edge {0:?}")]
    ShorthandEdge(Edge),
    #[error("point scale factor must be zero or positive (got {0})")]
    InvalidScaleFactor(f32),
    #[error("logging failure: {0}")]
    Logging(#[from] LoggingError),
    #[error("invalid fixture: {0}")]
    Fixture(#[from] serde_json::Error),
}

impl LayoutError {
    /// Node the error is about, when there is one.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            LayoutError::NodeNotFound(id)
            | LayoutError::MeasuredNodeCannotHaveChildren(id)
            | LayoutError::MeasureFuncOnParent(id)
            | LayoutError::ResetWithChildren(id)
            | LayoutError::ResetWithParent(id)
            | LayoutError::MarkDirtyWithoutMeasure(id)
            | LayoutError::InvalidMeasurement(id)
            | LayoutError::InvalidBaseline(id) => Some(*id),
            LayoutError::ChildHasParent { child } => Some(*child),
            LayoutError::CyclicInsert { parent, .. } => Some(*parent),
            LayoutError::ChildIndexOutOfBounds { parent, .. } => Some(*parent),
            LayoutError::ShorthandEdge(_)
            | LayoutError::InvalidScaleFactor(_)
            | LayoutError::Logging(_)
            | LayoutError::Fixture(_) => None,
        }
    }
}
