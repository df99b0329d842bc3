//! Per-node style (C2, style half): enums, the `Style` struct, and its two
//! default profiles (`Style::default()` and `Style::web_defaults()`).

use crate::value::{Dim, Edge, Value, DIM_COUNT, EDGE_COUNT};
use crate::OptionalFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    #[default]
    Inherit,
    LTR,
    RTL,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_column(self) -> bool {
        !self.is_row()
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Shared enum for `alignContent`/`alignItems`/`alignSelf`. `Auto` is only
/// meaningful on `alignSelf`, where it defers to the parent's `alignItems`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Display {
    #[default]
    Flex,
    None,
}

/// Per-node style, owned by the node that carries it, never shared.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: JustifyContent,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: FlexWrap,
    pub overflow: Overflow,
    pub display: Display,

    pub flex: OptionalFloat,
    pub flex_grow: OptionalFloat,
    pub flex_shrink: OptionalFloat,
    pub flex_basis: Value,

    pub margin: [Value; EDGE_COUNT],
    pub position: [Value; EDGE_COUNT],
    pub padding: [Value; EDGE_COUNT],
    pub border: [Value; EDGE_COUNT],

    pub dimensions: [Value; DIM_COUNT],
    pub min_dimensions: [Value; DIM_COUNT],
    pub max_dimensions: [Value; DIM_COUNT],

    pub aspect_ratio: OptionalFloat,

    /// Row/column gap (Dim::Height = row gap, Dim::Width = column gap).
    pub gap: [f32; DIM_COUNT],
}

impl Default for Style {
    fn default() -> Self {
        Style {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: FlexWrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: OptionalFloat::UNDEFINED,
            flex_grow: OptionalFloat::UNDEFINED,
            flex_shrink: OptionalFloat::defined(0.0),
            flex_basis: Value::Auto,
            margin: [Value::Undefined; EDGE_COUNT],
            position: [Value::Undefined; EDGE_COUNT],
            padding: [Value::Undefined; EDGE_COUNT],
            border: [Value::Undefined; EDGE_COUNT],
            dimensions: [Value::Undefined; DIM_COUNT],
            min_dimensions: [Value::Undefined; DIM_COUNT],
            max_dimensions: [Value::Undefined; DIM_COUNT],
            aspect_ratio: OptionalFloat::UNDEFINED,
            gap: [0.0; DIM_COUNT],
        }
    }
}

impl Style {
    /// Web-compatible defaults: row flex direction, stretch align-content,
    /// and a flex-shrink default of 1 instead of 0.
    pub fn web_defaults() -> Self {
        Style {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            flex_shrink: OptionalFloat::defined(1.0),
            ..Style::default()
        }
    }

    pub fn dim(&self, dim: Dim) -> Value {
        self.dimensions[dim as usize]
    }

    pub fn min_dim(&self, dim: Dim) -> Value {
        self.min_dimensions[dim as usize]
    }

    pub fn max_dim(&self, dim: Dim) -> Value {
        self.max_dimensions[dim as usize]
    }

    pub fn margin(&self, edge: Edge) -> Value {
        self.margin[edge as usize]
    }

    pub fn padding(&self, edge: Edge) -> Value {
        self.padding[edge as usize]
    }

    pub fn border(&self, edge: Edge) -> Value {
        self.border[edge as usize]
    }

    pub fn position(&self, edge: Edge) -> Value {
        self.position[edge as usize]
    }

    /// Effective flex-grow, falling back to the deprecated unified `flex`
    /// shorthand when `flexGrow` itself is unset (matches Yoga's
    /// `YGNodeStyleGetFlexGrow`).
    pub fn resolved_flex_grow(&self) -> f32 {
        if self.flex_grow.is_defined() {
            return self.flex_grow.unwrap_or(0.0);
        }
        if self.flex.is_defined() && self.flex.unwrap_or(0.0) > 0.0 {
            return self.flex.unwrap_or(0.0);
        }
        0.0
    }

    pub fn resolved_flex_shrink(&self) -> f32 {
        if self.flex_shrink.is_defined() {
            return self.flex_shrink.unwrap_or(0.0);
        }
        if self.flex.is_defined() && self.flex.unwrap_or(0.0) < 0.0 {
            return -self.flex.unwrap_or(0.0);
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_matches_flexbox_initial_values() {
        let style = Style::default();
        assert_eq!(style.flex_direction, FlexDirection::Column);
        assert_eq!(style.justify_content, JustifyContent::FlexStart);
        assert_eq!(style.align_content, Align::FlexStart);
        assert_eq!(style.align_items, Align::Stretch);
        assert_eq!(style.align_self, Align::Auto);
        assert_eq!(style.position_type, PositionType::Relative);
        assert_eq!(style.flex_wrap, FlexWrap::NoWrap);
        assert_eq!(style.overflow, Overflow::Visible);
        assert_eq!(style.display, Display::Flex);
    }

    #[test]
    fn web_defaults_overrides_three_fields_only() {
        let web = Style::web_defaults();
        assert_eq!(web.flex_direction, FlexDirection::Row);
        assert_eq!(web.align_content, Align::Stretch);
        assert_eq!(web.resolved_flex_shrink(), 1.0);
        assert_eq!(web.justify_content, JustifyContent::FlexStart);
    }

    #[test]
    fn flex_shrink_falls_back_to_negative_flex_shorthand() {
        let mut style = Style::default();
        style.flex_shrink = OptionalFloat::UNDEFINED;
        style.flex = OptionalFloat::defined(-2.0);
        assert_eq!(style.resolved_flex_shrink(), 2.0);
        assert_eq!(style.resolved_flex_grow(), 0.0);
    }
}
