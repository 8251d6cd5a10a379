//! Node arena, node records and style setters.

mod core;
mod node;
mod style_mut;

pub use self::core::LayoutTree;
pub use node::{BaselineFunc, Layout, MeasureFunc, Node, NodeId};
pub use style_mut::StyleMut;
