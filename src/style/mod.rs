//! Style inputs: keyword enums, unit-tagged lengths and the per-node record.

mod core;
mod enums;
mod value;

pub use self::core::{Edges, Style};
pub use enums::{
    Align, Dimension, Direction, Display, Edge, ExperimentalFeature, FlexDirection, Justify,
    MeasureMode, NodeType, Overflow, PositionType, Wrap,
};
pub use value::{UNDEFINED, Unit, Value};

pub(crate) use value::{EPSILON, float_eq};
