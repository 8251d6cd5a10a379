use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline direction. `Inherit` takes the parent's resolved direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
}

/// Shared by `align-items`, `align-self` and `align-content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Flex,
    None,
}

/// Physical, logical and shorthand edges, in lookup-table order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    Start,
    End,
    Horizontal,
    Vertical,
    All,
}

impl Edge {
    pub const COUNT: usize = 9;

    pub const ALL_EDGES: [Edge; Edge::COUNT] = [
        Edge::Left,
        Edge::Top,
        Edge::Right,
        Edge::Bottom,
        Edge::Start,
        Edge::End,
        Edge::Horizontal,
        Edge::Vertical,
        Edge::All,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How an available size should be read while measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureMode {
    /// No constraint; size to content.
    #[default]
    Undefined,
    /// Fill the available size exactly.
    Exactly,
    /// Size to content, never beyond the available size.
    AtMost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    #[default]
    Default,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentalFeature {
    WebFlexBasis,
}

impl ExperimentalFeature {
    pub const COUNT: usize = 1;

    pub const fn index(self) -> usize {
        self as usize
    }
}

macro_rules! keyword_names {
    ($($ty:ident { $($variant:ident => $name:literal),+ $(,)? })+) => {
        $(
            impl $ty {
                pub fn as_str(self) -> &'static str {
                    match self {
                        $($ty::$variant => $name),+
                    }
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

keyword_names! {
    Direction { Inherit => "inherit", Ltr => "ltr", Rtl => "rtl" }
    FlexDirection {
        Column => "column",
        ColumnReverse => "column-reverse",
        Row => "row",
        RowReverse => "row-reverse",
    }
    Justify {
        FlexStart => "flex-start",
        Center => "center",
        FlexEnd => "flex-end",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
    }
    Align {
        Auto => "auto",
        FlexStart => "flex-start",
        Center => "center",
        FlexEnd => "flex-end",
        Stretch => "stretch",
        Baseline => "baseline",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
    }
    PositionType { Relative => "relative", Absolute => "absolute" }
    Wrap { NoWrap => "no-wrap", Wrap => "wrap", WrapReverse => "wrap-reverse" }
    Overflow { Visible => "visible", Hidden => "hidden", Scroll => "scroll" }
    Display { Flex => "flex", None => "none" }
    Edge {
        Left => "left",
        Top => "top",
        Right => "right",
        Bottom => "bottom",
        Start => "start",
        End => "end",
        Horizontal => "horizontal",
        Vertical => "vertical",
        All => "all",
    }
    Dimension { Width => "width", Height => "height" }
    MeasureMode { Undefined => "undefined", Exactly => "exactly", AtMost => "at-most" }
    NodeType { Default => "default", Text => "text" }
    ExperimentalFeature { WebFlexBasis => "web-flex-basis" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_names_match_serde_names() {
        let json = serde_json::to_value(Justify::SpaceBetween).unwrap();
        assert_eq!(json, Justify::SpaceBetween.as_str());
        let json = serde_json::to_value(Wrap::NoWrap).unwrap();
        assert_eq!(json, "no-wrap");
        assert_eq!(MeasureMode::AtMost.to_string(), "at-most");
    }

    #[test]
    fn edges_are_listed_in_index_order() {
        for (i, edge) in Edge::ALL_EDGES.iter().enumerate() {
            assert_eq!(edge.index(), i);
        }
    }
}
