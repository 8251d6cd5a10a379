use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for "no size": every resolved length is an `f32` where NaN means
/// undefined.
pub const UNDEFINED: f32 = f32::NAN;

/// Values closer than this compare equal.
pub(crate) const EPSILON: f32 = 0.0001;

pub(crate) fn float_eq(a: f32, b: f32) -> bool {
    if a.is_nan() {
        return b.is_nan();
    }
    (a - b).abs() < EPSILON
}

/// Unit tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Undefined,
    Point,
    Percent,
    Auto,
}

/// A style length whose meaning depends on the parent size at layout time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "ValueRepr", into = "ValueRepr")]
pub enum Value {
    /// Not set; falls back to shorthands or defaults.
    #[default]
    Undefined,
    Auto,
    Point(f32),
    Percent(f32),
}

impl Value {
    pub const ZERO: Value = Value::Point(0.0);

    /// `Point`, or `fallback` when `points` is NaN.
    pub fn points_or(points: f32, fallback: Value) -> Value {
        if points.is_nan() {
            fallback
        } else {
            Value::Point(points)
        }
    }

    /// `Percent`, or `fallback` when `percent` is NaN.
    pub fn percent_or(percent: f32, fallback: Value) -> Value {
        if percent.is_nan() {
            fallback
        } else {
            Value::Percent(percent)
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Value::Undefined => Unit::Undefined,
            Value::Auto => Unit::Auto,
            Value::Point(_) => Unit::Point,
            Value::Percent(_) => Unit::Percent,
        }
    }

    /// Raw number carried by the value; NaN for `Undefined` and `Auto`.
    pub fn number(self) -> f32 {
        match self {
            Value::Point(v) | Value::Percent(v) => v,
            Value::Undefined | Value::Auto => UNDEFINED,
        }
    }

    /// `true` unless the value is `Undefined`. `Auto` counts as set.
    pub fn is_defined(self) -> bool {
        !matches!(self, Value::Undefined)
    }

    pub fn is_auto(self) -> bool {
        matches!(self, Value::Auto)
    }

    /// Resolves against `parent_size`. Percentages of an undefined parent stay
    /// undefined, as do `Auto` and `Undefined`.
    pub fn resolve(self, parent_size: f32) -> f32 {
        match self {
            Value::Undefined | Value::Auto => UNDEFINED,
            Value::Point(v) => v,
            Value::Percent(v) => v * parent_size / 100.0,
        }
    }

    /// Margin resolution: `auto` margins contribute nothing until free space
    /// is distributed.
    pub(crate) fn resolve_margin(self, parent_size: f32) -> f32 {
        match self {
            Value::Auto => 0.0,
            other => other.resolve(parent_size),
        }
    }

    /// Equality with float tolerance; `Undefined` equals `Undefined` whatever
    /// the payload.
    pub fn approx_eq(self, other: Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Auto, Value::Auto) => true,
            (Value::Point(a), Value::Point(b)) | (Value::Percent(a), Value::Percent(b)) => {
                float_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Auto => f.write_str("auto"),
            Value::Point(v) => write!(f, "{v}px"),
            Value::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// JSON shape: bare numbers are points, strings are `"auto"`, `"undefined"`,
/// `"12%"` or `"12px"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Points(f32),
    Keyword(String),
}

impl From<Value> for ValueRepr {
    fn from(value: Value) -> Self {
        match value {
            Value::Point(v) => ValueRepr::Points(v),
            Value::Percent(v) => ValueRepr::Keyword(format!("{v}%")),
            Value::Auto => ValueRepr::Keyword("auto".to_string()),
            Value::Undefined => ValueRepr::Keyword("undefined".to_string()),
        }
    }
}

impl TryFrom<ValueRepr> for Value {
    type Error = String;

    fn try_from(repr: ValueRepr) -> Result<Self, Self::Error> {
        let keyword = match repr {
            ValueRepr::Points(v) => return Ok(Value::points_or(v, Value::Undefined)),
            ValueRepr::Keyword(keyword) => keyword,
        };
        let trimmed = keyword.trim();
        match trimmed {
            "auto" => return Ok(Value::Auto),
            "undefined" | "" => return Ok(Value::Undefined),
            _ => {}
        }
        let (number, percent) = match trimmed.strip_suffix('%') {
            Some(number) => (number, true),
            None => (trimmed.strip_suffix("px").unwrap_or(trimmed), false),
        };
        let parsed: f32 = number
            .trim()
            .parse()
            .map_err(|_| format!("invalid style value `{keyword}`"))?;
        Ok(if percent {
            Value::percent_or(parsed, Value::Undefined)
        } else {
            Value::points_or(parsed, Value::Undefined)
        })
    }
}
