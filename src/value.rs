//! The tagged `Value` union, `OptionalFloat`, and the edge/dimension index
//! types shared by every other module.

use std::cmp::Ordering;
use std::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used everywhere floats are compared for layout purposes.
pub const FLOAT_EPSILON: f32 = 1e-4;

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < FLOAT_EPSILON
}

/// An `f32` where `NaN` stands for "undefined".
///
/// Arithmetic propagates undefined; the only equality that treats two
/// undefined values as equal is `OptionalFloat`'s `PartialEq` impl.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptionalFloat(f32);

impl OptionalFloat {
    pub const UNDEFINED: OptionalFloat = OptionalFloat(f32::NAN);
    pub const ZERO: OptionalFloat = OptionalFloat(0.0);

    pub fn defined(value: f32) -> Self {
        debug_assert!(!value.is_nan(), "measure/baseline callbacks must not return NaN");
        OptionalFloat(value)
    }

    pub fn is_defined(self) -> bool {
        !self.0.is_nan()
    }

    pub fn is_undefined(self) -> bool {
        self.0.is_nan()
    }

    pub fn unwrap_or(self, default: f32) -> f32 {
        if self.is_defined() {
            self.0
        } else {
            default
        }
    }

    pub fn value(self) -> Option<f32> {
        self.is_defined().then_some(self.0)
    }

    pub fn max(self, other: OptionalFloat) -> OptionalFloat {
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => OptionalFloat::defined(a.max(b)),
            (Some(a), None) => OptionalFloat::defined(a),
            (None, Some(b)) => OptionalFloat::defined(b),
            (None, None) => OptionalFloat::UNDEFINED,
        }
    }

    pub fn min(self, other: OptionalFloat) -> OptionalFloat {
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => OptionalFloat::defined(a.min(b)),
            (Some(a), None) => OptionalFloat::defined(a),
            (None, Some(b)) => OptionalFloat::defined(b),
            (None, None) => OptionalFloat::UNDEFINED,
        }
    }

    /// Clamp `self` between `min` and `max`, either of which may be undefined.
    /// Max is applied before min, so an inverted min>max pair resolves with
    /// min winning.
    pub fn bound(self, min: OptionalFloat, max: OptionalFloat) -> OptionalFloat {
        let mut out = self;
        if let (Some(v), Some(m)) = (out.value(), max.value()) {
            if v > m {
                out = OptionalFloat::defined(m);
            }
        }
        if let (Some(v), Some(m)) = (out.value(), min.value()) {
            if v < m {
                out = OptionalFloat::defined(m);
            }
        }
        out
    }
}

impl Default for OptionalFloat {
    fn default() -> Self {
        OptionalFloat::UNDEFINED
    }
}

impl From<f32> for OptionalFloat {
    fn from(value: f32) -> Self {
        if value.is_nan() {
            OptionalFloat::UNDEFINED
        } else {
            OptionalFloat::defined(value)
        }
    }
}

impl PartialEq for OptionalFloat {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_defined(), other.is_defined()) {
            (false, false) => true,
            (true, true) => approx_eq(self.0, other.0),
            _ => false,
        }
    }
}

impl PartialOrd for OptionalFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }
}

impl Add for OptionalFloat {
    type Output = OptionalFloat;
    fn add(self, rhs: OptionalFloat) -> OptionalFloat {
        match (self.value(), rhs.value()) {
            (Some(a), Some(b)) => OptionalFloat::defined(a + b),
            _ => OptionalFloat::UNDEFINED,
        }
    }
}

impl Sub for OptionalFloat {
    type Output = OptionalFloat;
    fn sub(self, rhs: OptionalFloat) -> OptionalFloat {
        match (self.value(), rhs.value()) {
            (Some(a), Some(b)) => OptionalFloat::defined(a - b),
            _ => OptionalFloat::UNDEFINED,
        }
    }
}

/// A style input that may be pixel-exact, percentage-of-parent, or absent.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    #[default]
    Undefined,
    Auto,
    Point(f32),
    Percent(f32),
}

impl Value {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    /// Unit-equality: same unit and (both undefined/auto, or values within
    /// `FLOAT_EPSILON`).
    pub fn unit_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Auto, Value::Auto) => true,
            (Value::Point(a), Value::Point(b)) => approx_eq(*a, *b),
            (Value::Percent(a), Value::Percent(b)) => approx_eq(*a, *b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.unit_eq(other)
    }
}

/// `auto`/`undefined` resolve to undefined, `point(x)` resolves to `x`,
/// `percent(x)` resolves to `x * parentSize/100` (undefined if `parentSize`
/// is undefined).
pub fn resolve_value(value: Value, parent_size: OptionalFloat) -> OptionalFloat {
    match value {
        Value::Undefined | Value::Auto => OptionalFloat::UNDEFINED,
        Value::Point(p) => OptionalFloat::defined(p),
        Value::Percent(p) => parent_size.value().map_or(OptionalFloat::UNDEFINED, |s| {
            OptionalFloat::defined(p * s / 100.0)
        }),
    }
}

/// Identical to [`resolve_value`] except `auto` resolves to `0` instead of
/// undefined — used for margins, which default their `auto` contribution to
/// zero until auto-margin distribution runs.
pub fn resolve_value_margin(value: Value, parent_size: OptionalFloat) -> OptionalFloat {
    match value {
        Value::Auto => OptionalFloat::defined(0.0),
        other => resolve_value(other, parent_size),
    }
}

/// One of the nine edge slots a style field may be set on. `Horizontal`,
/// `Vertical`, and `All` are shorthand that fall back to the specific four
/// per `computed_edge_value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

pub const EDGE_COUNT: usize = 9;
/// The subset of edges a resolved `Layout` stores absolute values for.
pub const LAYOUT_EDGE_COUNT: usize = 6;

impl Edge {
    pub const ALL: [Edge; EDGE_COUNT] = [
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
}

/// Resolves an edge value: specific edge, then the Horizontal/Vertical
/// shorthand for that axis, then `All`, then a caller-supplied default.
/// `Start`/`End` have no axis shorthand fallback.
pub fn computed_edge_value(edges: &[Value; EDGE_COUNT], edge: Edge, default: Value) -> Value {
    let specific = edges[edge as usize];
    if specific.is_defined() {
        return specific;
    }
    let shorthand = match edge {
        Edge::Top | Edge::Bottom => Some(Edge::Vertical),
        Edge::Left | Edge::Right => Some(Edge::Horizontal),
        _ => None,
    };
    if let Some(shorthand) = shorthand {
        let v = edges[shorthand as usize];
        if v.is_defined() {
            return v;
        }
    }
    let all = edges[Edge::All as usize];
    if all.is_defined() {
        return all;
    }
    default
}

/// Which axis a size belongs to, independent of flex direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dim {
    Width = 0,
    Height = 1,
}

pub const DIM_COUNT: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_float_undefined_equals_undefined() {
        assert_eq!(OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED);
        assert_ne!(OptionalFloat::UNDEFINED, OptionalFloat::defined(0.0));
    }

    #[test]
    fn resolve_value_percent_of_any_positive_parent() {
        for p in [1.0_f32, 7.5, 42.0, 1000.0] {
            let resolved = resolve_value(Value::Percent(50.0), OptionalFloat::defined(p));
            assert!(approx_eq(resolved.unwrap_or(f32::NAN), p / 2.0));
        }
    }

    #[test]
    fn resolve_value_percent_with_undefined_parent_is_undefined() {
        let resolved = resolve_value(Value::Percent(50.0), OptionalFloat::UNDEFINED);
        assert!(resolved.is_undefined());
    }

    #[test]
    fn resolve_value_margin_auto_is_zero() {
        let resolved = resolve_value_margin(Value::Auto, OptionalFloat::defined(100.0));
        assert_eq!(resolved, OptionalFloat::defined(0.0));
    }

    #[test]
    fn computed_edge_value_falls_back_through_shorthands() {
        let mut edges = [Value::Undefined; EDGE_COUNT];
        edges[Edge::All as usize] = Value::Point(4.0);
        assert_eq!(
            computed_edge_value(&edges, Edge::Top, Value::Undefined),
            Value::Point(4.0)
        );

        edges[Edge::Vertical as usize] = Value::Point(8.0);
        assert_eq!(
            computed_edge_value(&edges, Edge::Top, Value::Undefined),
            Value::Point(8.0)
        );

        edges[Edge::Top as usize] = Value::Point(16.0);
        assert_eq!(
            computed_edge_value(&edges, Edge::Top, Value::Undefined),
            Value::Point(16.0)
        );
    }

    #[test]
    fn optional_float_bound_applies_max_before_min() {
        let bounded = OptionalFloat::defined(5.0)
            .bound(OptionalFloat::defined(20.0), OptionalFloat::defined(10.0));
        assert_eq!(bounded, OptionalFloat::defined(20.0));
    }
}
