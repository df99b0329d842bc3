//! Direction/flex-direction resolution tables and the leading/trailing/dim
//! lookups every higher layer depends on.

use crate::style::{Align, Direction, FlexDirection, Style};
use crate::value::{computed_edge_value, resolve_value, resolve_value_margin, Dim, Edge, Value};
use crate::OptionalFloat;

/// An inherited direction resolves against the owner, defaulting to LTR if
/// the owner is also inherited (or there is no owner, e.g. at the root).
pub fn resolve_direction(style_direction: Direction, owner_direction: Direction) -> Direction {
    match style_direction {
        Direction::Inherit => {
            if owner_direction == Direction::Inherit {
                Direction::LTR
            } else {
                owner_direction
            }
        }
        other => other,
    }
}

/// In RTL, row forms swap with their reverse counterpart; column forms are
/// unaffected.
pub fn resolve_flex_direction(flex_direction: FlexDirection, direction: Direction) -> FlexDirection {
    if direction == Direction::RTL {
        match flex_direction {
            FlexDirection::Row => FlexDirection::RowReverse,
            FlexDirection::RowReverse => FlexDirection::Row,
            other => other,
        }
    } else {
        flex_direction
    }
}

/// The cross axis of a column is always a (direction-resolved) row; the
/// cross axis of a row is always `column`.
pub fn flex_direction_cross(flex_direction: FlexDirection, direction: Direction) -> FlexDirection {
    if flex_direction.is_column() {
        resolve_flex_direction(FlexDirection::Row, direction)
    } else {
        FlexDirection::Column
    }
}

/// The leading edge of a (already direction-resolved) flex direction.
pub fn leading_edge(flex_direction: FlexDirection) -> Edge {
    match flex_direction {
        FlexDirection::Column => Edge::Top,
        FlexDirection::ColumnReverse => Edge::Bottom,
        FlexDirection::Row => Edge::Left,
        FlexDirection::RowReverse => Edge::Right,
    }
}

/// The trailing edge of a (already direction-resolved) flex direction.
pub fn trailing_edge(flex_direction: FlexDirection) -> Edge {
    match flex_direction {
        FlexDirection::Column => Edge::Bottom,
        FlexDirection::ColumnReverse => Edge::Top,
        FlexDirection::Row => Edge::Right,
        FlexDirection::RowReverse => Edge::Left,
    }
}

/// The `Dim` a (already direction-resolved) flex direction occupies.
pub fn dim(flex_direction: FlexDirection) -> Dim {
    if flex_direction.is_row() {
        Dim::Width
    } else {
        Dim::Height
    }
}

/// Resolves the effective alignment of `child` against `parent`, demoting
/// `baseline` to `flexStart` in column flows (baseline alignment is only
/// meaningful in a row flow).
pub fn align_item(parent_align_items: Align, parent_flex_direction: FlexDirection, child_align_self: Align) -> Align {
    let effective = if child_align_self == Align::Auto {
        parent_align_items
    } else {
        child_align_self
    };
    if effective == Align::Baseline && parent_flex_direction.is_column() {
        Align::FlexStart
    } else {
        effective
    }
}

/// True when a row-axis edge's `Start`/`End` override applies: for row axes,
/// `Start`/`End` take precedence over `Left`/`Right` when defined. Column
/// axes have no `Start`/`End` override.
pub fn is_row_axis(flex_direction: FlexDirection) -> bool {
    flex_direction.is_row()
}

/// `axis` here is already direction-resolved (RTL swap applied), so the
/// `Start`/`End` override always lands on the correct physical edge: under
/// RTL, `resolveFlexDirection(row, RTL) == RowReverse`, whose leading edge
/// is `Right`, so `Start` (logically "line start") correctly overrides the
/// physical right edge. Grounded on Yoga's `YGNodeLeadingMargin` et al.
pub fn leading_margin(style: &Style, axis: FlexDirection, width_size: OptionalFloat) -> f32 {
    if axis.is_row() && style.margin(Edge::Start).is_defined() {
        return resolve_value_margin(style.margin(Edge::Start), width_size).unwrap_or(0.0);
    }
    resolve_value_margin(
        computed_edge_value(&style.margin, leading_edge(axis), Value::Point(0.0)),
        width_size,
    )
    .unwrap_or(0.0)
}

pub fn trailing_margin(style: &Style, axis: FlexDirection, width_size: OptionalFloat) -> f32 {
    if axis.is_row() && style.margin(Edge::End).is_defined() {
        return resolve_value_margin(style.margin(Edge::End), width_size).unwrap_or(0.0);
    }
    resolve_value_margin(
        computed_edge_value(&style.margin, trailing_edge(axis), Value::Point(0.0)),
        width_size,
    )
    .unwrap_or(0.0)
}

pub fn leading_padding(style: &Style, axis: FlexDirection, width_size: OptionalFloat) -> f32 {
    if axis.is_row() {
        let start = style.padding(Edge::Start);
        if start.is_defined() {
            let resolved = resolve_value(start, width_size).unwrap_or(0.0);
            if resolved >= 0.0 {
                return resolved;
            }
        }
    }
    resolve_value(
        computed_edge_value(&style.padding, leading_edge(axis), Value::Point(0.0)),
        width_size,
    )
    .unwrap_or(0.0)
    .max(0.0)
}

pub fn trailing_padding(style: &Style, axis: FlexDirection, width_size: OptionalFloat) -> f32 {
    if axis.is_row() {
        let end = style.padding(Edge::End);
        if end.is_defined() {
            let resolved = resolve_value(end, width_size).unwrap_or(0.0);
            if resolved >= 0.0 {
                return resolved;
            }
        }
    }
    resolve_value(
        computed_edge_value(&style.padding, trailing_edge(axis), Value::Point(0.0)),
        width_size,
    )
    .unwrap_or(0.0)
    .max(0.0)
}

pub fn leading_border(style: &Style, axis: FlexDirection) -> f32 {
    if axis.is_row() {
        let start = style.border(Edge::Start);
        if let Value::Point(v) = start {
            if v >= 0.0 {
                return v;
            }
        }
    }
    let edge_value = computed_edge_value(&style.border, leading_edge(axis), Value::Point(0.0));
    resolve_value(edge_value, OptionalFloat::UNDEFINED).unwrap_or(0.0).max(0.0)
}

pub fn trailing_border(style: &Style, axis: FlexDirection) -> f32 {
    if axis.is_row() {
        let end = style.border(Edge::End);
        if let Value::Point(v) = end {
            if v >= 0.0 {
                return v;
            }
        }
    }
    let edge_value = computed_edge_value(&style.border, trailing_edge(axis), Value::Point(0.0));
    resolve_value(edge_value, OptionalFloat::UNDEFINED).unwrap_or(0.0).max(0.0)
}

pub fn margin_for_axis(style: &Style, axis: FlexDirection, width_size: OptionalFloat) -> f32 {
    leading_margin(style, axis, width_size) + trailing_margin(style, axis, width_size)
}

fn position_value(style: &Style, edge: Edge, other_edge: Edge, axis_is_row: bool, axis_size: OptionalFloat) -> OptionalFloat {
    if axis_is_row {
        let v = style.position(other_edge);
        if v.is_defined() {
            return resolve_value(v, axis_size);
        }
    }
    let edge_value = computed_edge_value(&style.position, edge, Value::Undefined);
    if edge_value.is_defined() {
        resolve_value(edge_value, axis_size)
    } else {
        OptionalFloat::UNDEFINED
    }
}

pub fn leading_position(style: &Style, axis: FlexDirection, axis_size: OptionalFloat) -> OptionalFloat {
    position_value(style, leading_edge(axis), Edge::Start, axis.is_row(), axis_size)
}

pub fn trailing_position(style: &Style, axis: FlexDirection, axis_size: OptionalFloat) -> OptionalFloat {
    position_value(style, trailing_edge(axis), Edge::End, axis.is_row(), axis_size)
}

pub fn is_leading_position_defined(style: &Style, axis: FlexDirection) -> bool {
    (axis.is_row() && style.position(Edge::Start).is_defined())
        || computed_edge_value(&style.position, leading_edge(axis), Value::Undefined).is_defined()
}

pub fn is_trailing_position_defined(style: &Style, axis: FlexDirection) -> bool {
    (axis.is_row() && style.position(Edge::End).is_defined())
        || computed_edge_value(&style.position, trailing_edge(axis), Value::Undefined).is_defined()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_direction_inherits_from_owner() {
        assert_eq!(resolve_direction(Direction::Inherit, Direction::RTL), Direction::RTL);
        assert_eq!(resolve_direction(Direction::Inherit, Direction::Inherit), Direction::LTR);
        assert_eq!(resolve_direction(Direction::LTR, Direction::RTL), Direction::LTR);
    }

    #[test]
    fn resolve_flex_direction_swaps_row_forms_under_rtl() {
        assert_eq!(resolve_flex_direction(FlexDirection::Row, Direction::RTL), FlexDirection::RowReverse);
        assert_eq!(resolve_flex_direction(FlexDirection::RowReverse, Direction::RTL), FlexDirection::Row);
        assert_eq!(resolve_flex_direction(FlexDirection::Column, Direction::RTL), FlexDirection::Column);
    }

    #[test]
    fn flex_direction_cross_of_column_is_resolved_row() {
        assert_eq!(flex_direction_cross(FlexDirection::Column, Direction::RTL), FlexDirection::RowReverse);
        assert_eq!(flex_direction_cross(FlexDirection::Row, Direction::RTL), FlexDirection::Column);
    }

    #[test]
    fn align_item_demotes_baseline_in_column_flow() {
        let resolved = align_item(Align::Stretch, FlexDirection::Column, Align::Baseline);
        assert_eq!(resolved, Align::FlexStart);
        let resolved_row = align_item(Align::Stretch, FlexDirection::Row, Align::Baseline);
        assert_eq!(resolved_row, Align::Baseline);
    }

    #[test]
    fn align_item_auto_defers_to_parent() {
        assert_eq!(align_item(Align::Center, FlexDirection::Row, Align::Auto), Align::Center);
    }
}
