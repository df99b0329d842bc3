//! Pixel rounding: the post-pass that snaps absolute positions and sizes to
//! a sub-pixel grid defined by `pointScaleFactor`.

use crate::node::Node;
use crate::value::FLOAT_EPSILON;

/// Rounds a single coordinate to the nearest multiple of `1 / scale_factor`,
/// snapping exact halves up unless `force_floor` says otherwise.
pub fn round_value(value: f32, scale_factor: f32, force_ceil: bool, force_floor: bool) -> f32 {
    let scaled = value * scale_factor;
    let fraction = scaled - scaled.floor();

    let rounded = if fraction < FLOAT_EPSILON {
        scaled.floor()
    } else if (1.0 - fraction) < FLOAT_EPSILON {
        scaled.ceil()
    } else if force_ceil {
        scaled.ceil()
    } else if force_floor {
        scaled.floor()
    } else if fraction >= 0.5 {
        scaled.ceil()
    } else {
        scaled.floor()
    };
    rounded / scale_factor
}

/// A post-order recursion over the already laid-out tree. Text nodes get
/// directional rounding so their measured width/height is never truncated
/// below content.
pub fn round_to_pixel_grid(node: &Node, scale_factor: f32, absolute_left: f32, absolute_top: f32) {
    if scale_factor <= 0.0 {
        return;
    }

    let text_rounding = node.0.borrow().node_type == crate::node::NodeType::Text;

    let (node_left, node_top, node_width, node_height) = node.with_layout(|layout| {
        (
            layout.position[0],
            layout.position[1],
            layout.measured_dimensions[0].unwrap_or(0.0),
            layout.measured_dimensions[1].unwrap_or(0.0),
        )
    });

    let node_absolute_left = absolute_left + node_left;
    let node_absolute_top = absolute_top + node_top;

    let has_fractional_width = !crate::value::approx_eq((node_width * scale_factor).fract(), 0.0);
    let has_fractional_height = !crate::value::approx_eq((node_height * scale_factor).fract(), 0.0);

    let rounded_left = round_value(node_absolute_left, scale_factor, false, text_rounding);
    let rounded_top = round_value(node_absolute_top, scale_factor, false, text_rounding);

    let rounded_right = round_value(
        node_absolute_left + node_width,
        scale_factor,
        text_rounding && has_fractional_width,
        text_rounding && !has_fractional_width,
    );
    let rounded_bottom = round_value(
        node_absolute_top + node_height,
        scale_factor,
        text_rounding && has_fractional_height,
        text_rounding && !has_fractional_height,
    );

    node.with_layout_mut(|layout| {
        layout.position[0] = rounded_left - absolute_left;
        layout.position[1] = rounded_top - absolute_top;
        layout.measured_dimensions[0] = crate::OptionalFloat::defined(rounded_right - rounded_left);
        layout.measured_dimensions[1] = crate::OptionalFloat::defined(rounded_bottom - rounded_top);
    });

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            round_to_pixel_grid(&child, scale_factor, rounded_left, rounded_top);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_half_at_scale_two() {
        assert!(crate::value::approx_eq(round_value(3.7, 2.0, false, false), 3.5));
    }

    #[test]
    fn force_floor_and_ceil_override_half_up() {
        assert!(crate::value::approx_eq(round_value(1.4, 1.0, true, false), 2.0));
        assert!(crate::value::approx_eq(round_value(1.6, 1.0, false, true), 1.0));
    }

    #[test]
    fn near_integer_snaps_regardless_of_force_flags() {
        assert!(crate::value::approx_eq(round_value(1.00001, 1.0, false, true), 1.0));
        assert!(crate::value::approx_eq(round_value(1.99999, 1.0, true, false), 2.0));
    }
}
