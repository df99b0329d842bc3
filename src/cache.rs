//! Measurement cache: the per-node `(availW, availH, modeW, modeH) ->
//! (computedW, computedH)` ring buffer and its compatibility predicates.

use crate::value::{approx_eq, OptionalFloat};

pub const MAX_CACHED_RESULT_COUNT: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MeasureMode {
    #[default]
    Undefined,
    Exactly,
    AtMost,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CachedMeasurement {
    pub available_width: OptionalFloat,
    pub available_height: OptionalFloat,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub computed_width: OptionalFloat,
    pub computed_height: OptionalFloat,
}

impl CachedMeasurement {
    pub fn empty() -> Self {
        CachedMeasurement {
            available_width: OptionalFloat::UNDEFINED,
            available_height: OptionalFloat::UNDEFINED,
            width_mode: MeasureMode::Undefined,
            height_mode: MeasureMode::Undefined,
            computed_width: OptionalFloat::defined(-1.0),
            computed_height: OptionalFloat::defined(-1.0),
        }
    }
}

/// One axis of a cache-validity check. Each of the four rules is tried
/// independently per axis; both axes must be compatible for a hit.
fn axis_compatible(
    old_mode: MeasureMode,
    old_size: OptionalFloat,
    old_available: OptionalFloat,
    new_mode: MeasureMode,
    new_available: OptionalFloat,
) -> bool {
    let available_equal = match (old_available.value(), new_available.value()) {
        (Some(a), Some(b)) => approx_eq(a, b),
        (None, None) => true,
        _ => false,
    };

    // Exact mode and availability match.
    if old_mode == new_mode && available_equal {
        return true;
    }

    let Some(new_avail) = new_available.value() else {
        return old_mode == MeasureMode::Undefined && new_mode == MeasureMode::Undefined;
    };
    let Some(computed) = old_size.value() else {
        return false;
    };

    match (old_mode, new_mode) {
        // Exact reuse: new exact size equals the prior computed size.
        (_, MeasureMode::Exactly) => approx_eq(new_avail, computed),
        // Undefined -> AtMost still fits.
        (MeasureMode::Undefined, MeasureMode::AtMost) => new_avail >= computed,
        // AtMost -> AtMost tighter, but not smaller than the prior content.
        (MeasureMode::AtMost, MeasureMode::AtMost) => {
            let Some(old_avail) = old_available.value() else {
                return false;
            };
            new_avail < old_avail && new_avail >= computed
        }
        _ => false,
    }
}

/// Whether `entry` can serve a request for `(avail_width, avail_height,
/// width_mode, height_mode)` without recomputation.
pub fn cache_hit(
    entry: &CachedMeasurement,
    avail_width: OptionalFloat,
    avail_height: OptionalFloat,
    width_mode: MeasureMode,
    height_mode: MeasureMode,
) -> bool {
    let width_ok = axis_compatible(
        entry.width_mode,
        entry.computed_width,
        entry.available_width,
        width_mode,
        avail_width,
    );
    let height_ok = axis_compatible(
        entry.height_mode,
        entry.computed_height,
        entry.available_height,
        height_mode,
        avail_height,
    );
    width_ok && height_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn df(v: f32) -> OptionalFloat {
        OptionalFloat::defined(v)
    }

    #[test]
    fn exact_mode_and_size_match_hits() {
        let entry = CachedMeasurement {
            available_width: df(100.0),
            available_height: df(50.0),
            width_mode: MeasureMode::Exactly,
            height_mode: MeasureMode::AtMost,
            computed_width: df(100.0),
            computed_height: df(20.0),
        };
        assert!(cache_hit(&entry, df(100.0), df(50.0), MeasureMode::Exactly, MeasureMode::AtMost));
    }

    #[test]
    fn undefined_to_at_most_still_fits() {
        let entry = CachedMeasurement {
            available_width: OptionalFloat::UNDEFINED,
            available_height: OptionalFloat::UNDEFINED,
            width_mode: MeasureMode::Undefined,
            height_mode: MeasureMode::Undefined,
            computed_width: df(40.0),
            computed_height: df(40.0),
        };
        assert!(cache_hit(&entry, df(50.0), df(50.0), MeasureMode::AtMost, MeasureMode::AtMost));
        assert!(!cache_hit(&entry, df(30.0), df(50.0), MeasureMode::AtMost, MeasureMode::AtMost));
    }

    #[test]
    fn at_most_tighter_still_hits_if_not_below_content() {
        let entry = CachedMeasurement {
            available_width: df(100.0),
            available_height: df(100.0),
            width_mode: MeasureMode::AtMost,
            height_mode: MeasureMode::AtMost,
            computed_width: df(60.0),
            computed_height: df(60.0),
        };
        assert!(cache_hit(&entry, df(80.0), df(80.0), MeasureMode::AtMost, MeasureMode::AtMost));
        assert!(!cache_hit(&entry, df(50.0), df(80.0), MeasureMode::AtMost, MeasureMode::AtMost));
    }

    #[test]
    fn exact_reuse_when_new_avail_matches_old_computed() {
        let entry = CachedMeasurement {
            available_width: df(999.0),
            available_height: df(999.0),
            width_mode: MeasureMode::AtMost,
            height_mode: MeasureMode::AtMost,
            computed_width: df(42.0),
            computed_height: df(42.0),
        };
        assert!(cache_hit(&entry, df(42.0), df(42.0), MeasureMode::Exactly, MeasureMode::Exactly));
    }
}
