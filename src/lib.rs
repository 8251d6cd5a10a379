//! Flexbox layout engine.
//!
//! Build a tree of nodes in a [`LayoutTree`], describe each node with a
//! [`Style`], then call [`LayoutTree::calculate_layout`] and read the computed
//! [`Layout`] of every node. Leaves with intrinsic content (text, images)
//! report their size through a [`MeasureFunc`]. Only nodes whose inputs
//! changed since the previous pass are laid out again.
//!
//! ```
//! use room_flex::{Direction, FlexDirection, LayoutTree};
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.new_node();
//! tree.style_mut(root)?
//!     .set_flex_direction(FlexDirection::Row)
//!     .set_width(300.0)
//!     .set_height(100.0);
//! let child = tree.new_node();
//! tree.style_mut(child)?.set_flex_grow(1.0);
//! tree.append_child(root, child)?;
//!
//! tree.calculate_layout(root, None, None, Direction::Ltr)?;
//! assert_eq!(tree.layout(child)?.width(), 300.0);
//! # Ok::<(), room_flex::LayoutError>(())
//! ```

pub mod config;
pub mod error;
pub mod fixture;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod style;
pub mod tree;

pub use config::{Config, ConfigContext};
pub use error::{LayoutError, Result};
pub use fixture::{LayoutSnapshot, MeasureTemplate, NodeTemplate};
pub use geometry::{Rect, Size};
pub use layout::PrintOptions;
pub use logging::{
    ConsoleSink, FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError,
    LoggingResult, MemorySink,
};
pub use metrics::{InstanceCounts, LayoutMetrics, MetricSnapshot, instance_counts};
pub use style::{
    Align, Dimension, Direction, Display, Edge, Edges, ExperimentalFeature, FlexDirection,
    Justify, MeasureMode, NodeType, Overflow, PositionType, Style, UNDEFINED, Unit, Value, Wrap,
};
pub use tree::{BaselineFunc, Layout, LayoutTree, MeasureFunc, Node, NodeId, StyleMut};
