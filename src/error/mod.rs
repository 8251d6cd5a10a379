//! Error types shared by the tree, style, and layout modules.

mod types;

pub use types::{LayoutError, Result};
