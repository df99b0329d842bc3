//! The flex algorithm: `calculate`, the cache gateway `layout_internal`,
//! and the eleven-step `layout_impl` recursion.

use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use crate::axis::{
    align_item, dim as axis_dim, flex_direction_cross, is_leading_position_defined, is_trailing_position_defined,
    leading_border, leading_margin, leading_padding, leading_position, margin_for_axis, resolve_direction,
    resolve_flex_direction, trailing_border, trailing_margin, trailing_padding, trailing_position,
};
use crate::cache::{cache_hit, CachedMeasurement, MeasureMode};
use crate::error::FlexError;
use crate::node::{BaselineFunc, Layout, MeasureFunc, Node};
use crate::rounding::round_to_pixel_grid;
use crate::style::{Align, Direction, Display, FlexDirection, JustifyContent, PositionType, Style};
use crate::value::{resolve_value, Dim, Value};
use crate::OptionalFloat;

static CURRENT_GENERATION: AtomicU32 = AtomicU32::new(0);

fn bump_generation() -> u32 {
    CURRENT_GENERATION.fetch_add(1, AtomicOrdering::Relaxed) + 1
}

fn current_generation() -> u32 {
    CURRENT_GENERATION.load(AtomicOrdering::Relaxed)
}

/// Resolves a value bounded by a node's min/max for `dim`, applying max
/// before min so an inverted min>max pair resolves with min winning.
fn bound_axis_within_min_max(style: &Style, dim: Dim, value: f32, owner_size: OptionalFloat) -> f32 {
    let min = resolve_value(style.min_dim(dim), owner_size);
    let max = resolve_value(style.max_dim(dim), owner_size);
    OptionalFloat::defined(value).bound(min, max).unwrap_or(value)
}

/// Entry point: computes layout for the whole tree rooted at `node`.
pub fn calculate(
    node: &Node,
    available_width: OptionalFloat,
    available_height: OptionalFloat,
    owner_direction: Direction,
) -> Result<(), FlexError> {
    bump_generation();

    let style = node.style();
    let margin_w = margin_for_axis(&style, FlexDirection::Row, available_width);
    let margin_h = margin_for_axis(&style, FlexDirection::Column, available_height);

    let (width, width_mode) = resolve_root_axis(style.dim(Dim::Width), style.max_dim(Dim::Width), available_width, margin_w);
    let (height, height_mode) = resolve_root_axis(style.dim(Dim::Height), style.max_dim(Dim::Height), available_height, margin_h);

    layout_internal(node, width, height, owner_direction, width_mode, height_mode, width, height, true);

    node.with_layout_mut(|l| {
        l.position[0] = 0.0;
        l.position[1] = 0.0;
    });

    let scale = node.config().borrow().point_scale_factor;
    if scale > 0.0 {
        round_to_pixel_grid(node, scale, 0.0, 0.0);
    }

    Ok(())
}

fn resolve_root_axis(style_dim: Value, style_max_dim: Value, avail: OptionalFloat, margin: f32) -> (OptionalFloat, MeasureMode) {
    if avail.is_defined() {
        return (avail, MeasureMode::Exactly);
    }
    if let Value::Point(p) = style_dim {
        return (OptionalFloat::defined(p + margin), MeasureMode::Exactly);
    }
    if let Value::Point(p) = style_max_dim {
        return (OptionalFloat::defined(p), MeasureMode::AtMost);
    }
    (OptionalFloat::UNDEFINED, MeasureMode::Undefined)
}

/// The cache gateway around `layout_impl`.
#[allow(clippy::too_many_arguments)]
fn layout_internal(
    node: &Node,
    available_width: OptionalFloat,
    available_height: OptionalFloat,
    owner_direction: Direction,
    width_measure_mode: MeasureMode,
    height_measure_mode: MeasureMode,
    owner_width: OptionalFloat,
    owner_height: OptionalFloat,
    perform_layout: bool,
) {
    let resolved_direction = resolve_direction(node.style().direction, owner_direction);

    let last_owner_direction = node.with_layout(|l| l.last_owner_direction);
    if last_owner_direction != Some(resolved_direction) {
        node.with_layout_mut(|l| l.clear_cache());
    }

    if !node.is_dirty() {
        if let Some((w, h)) = try_cache_hit(node, available_width, available_height, width_measure_mode, height_measure_mode, perform_layout) {
            node.with_layout_mut(|l| {
                l.measured_dimensions[0] = w;
                l.measured_dimensions[1] = h;
            });
            return;
        }
    }

    layout_impl(
        node,
        available_width,
        available_height,
        resolved_direction,
        width_measure_mode,
        height_measure_mode,
        owner_width,
        owner_height,
        perform_layout,
    );

    node.with_layout_mut(|l| {
        l.last_owner_direction = Some(resolved_direction);
        l.generation_count = current_generation();
    });
    node.clear_dirty();
    node.set_has_new_layout(true);

    let (mw, mh) = node.with_layout(|l| (l.measured_dimensions[0], l.measured_dimensions[1]));
    let entry = CachedMeasurement {
        available_width,
        available_height,
        width_mode: width_measure_mode,
        height_mode: height_measure_mode,
        computed_width: mw,
        computed_height: mh,
    };
    node.with_layout_mut(|l| {
        if perform_layout {
            l.cached_layout = entry;
        } else {
            l.push_cached_measurement(entry);
        }
    });
}

fn try_cache_hit(
    node: &Node,
    aw: OptionalFloat,
    ah: OptionalFloat,
    wm: MeasureMode,
    hm: MeasureMode,
    perform_layout: bool,
) -> Option<(OptionalFloat, OptionalFloat)> {
    let has_measure = node.has_measure_func();
    node.with_layout(|l| {
        if has_measure {
            if cache_hit(&l.cached_layout, aw, ah, wm, hm) {
                return Some((l.cached_layout.computed_width, l.cached_layout.computed_height));
            }
            l.cached_measurements
                .iter()
                .find(|e| cache_hit(e, aw, ah, wm, hm))
                .map(|e| (e.computed_width, e.computed_height))
        } else if perform_layout {
            cache_hit(&l.cached_layout, aw, ah, wm, hm).then(|| (l.cached_layout.computed_width, l.cached_layout.computed_height))
        } else {
            l.cached_measurements
                .iter()
                .find(|e| cache_hit(e, aw, ah, wm, hm))
                .map(|e| (e.computed_width, e.computed_height))
        }
    })
}

struct ResolvedEdges {
    margin: [f32; 4],  // left, top, right, bottom
    padding: [f32; 4],
    border: [f32; 4],
}

/// Physical Left/Top/Right/Bottom edges, resolved via the un-swapped
/// `Row`/`Column` axes — `Start`/`End` overrides are applied separately by
/// the caller via the direction-resolved row axis.
fn resolve_edges(style: &Style, owner_width: OptionalFloat, owner_height: OptionalFloat) -> ResolvedEdges {
    let row = FlexDirection::Row;
    let column = FlexDirection::Column;
    ResolvedEdges {
        margin: [
            leading_margin(style, row, owner_width),
            leading_margin(style, column, owner_height),
            trailing_margin(style, row, owner_width),
            trailing_margin(style, column, owner_height),
        ],
        padding: [
            leading_padding(style, row, owner_width),
            leading_padding(style, column, owner_height),
            trailing_padding(style, row, owner_width),
            trailing_padding(style, column, owner_height),
        ],
        border: [leading_border(style, row), leading_border(style, column), trailing_border(style, row), trailing_border(style, column)],
    }
}

/// The eleven-step layout recursion.
#[allow(clippy::too_many_arguments)]
fn layout_impl(
    node: &Node,
    available_width: OptionalFloat,
    available_height: OptionalFloat,
    direction: Direction,
    width_measure_mode: MeasureMode,
    height_measure_mode: MeasureMode,
    owner_width: OptionalFloat,
    owner_height: OptionalFloat,
    perform_layout: bool,
) {
    let style = node.style();

    // --- Step 0: setup ---
    let edges = resolve_edges(&style, owner_width, owner_height);
    let flex_row_resolved = resolve_flex_direction(FlexDirection::Row, direction);
    let margin_start = leading_margin(&style, flex_row_resolved, owner_width);
    let margin_end = trailing_margin(&style, flex_row_resolved, owner_width);
    let padding_start = leading_padding(&style, flex_row_resolved, owner_width);
    let padding_end = trailing_padding(&style, flex_row_resolved, owner_width);
    let border_start = leading_border(&style, flex_row_resolved);
    let border_end = trailing_border(&style, flex_row_resolved);

    node.with_layout_mut(|l| {
        l.direction = direction;
        l.margin = [edges.margin[0], edges.margin[1], edges.margin[2], edges.margin[3], margin_start, margin_end];
        l.padding = [edges.padding[0], edges.padding[1], edges.padding[2], edges.padding[3], padding_start, padding_end];
        l.border = [edges.border[0], edges.border[1], edges.border[2], edges.border[3], border_start, border_end];
    });

    let padding_border_width = edges.padding[0] + edges.padding[2] + edges.border[0] + edges.border[2];
    let padding_border_height = edges.padding[1] + edges.padding[3] + edges.border[1] + edges.border[3];

    if style.display == Display::None {
        zero_out_layout_recursively(node);
        return;
    }

    if let Some(measure) = node.measure_func() {
        layout_leaf_with_measure(
            node,
            &style,
            measure.as_ref(),
            available_width,
            available_height,
            width_measure_mode,
            height_measure_mode,
            owner_width,
            owner_height,
            padding_border_width,
            padding_border_height,
        );
        return;
    }

    let children: Vec<Node> = node
        .children()
        .into_iter()
        .filter(|c| {
            if c.style().display == Display::None {
                zero_out_layout_recursively(c);
                false
            } else {
                true
            }
        })
        .collect();

    if children.is_empty() {
        let width = size_with_mode(available_width, width_measure_mode, padding_border_width);
        let height = size_with_mode(available_height, height_measure_mode, padding_border_height);
        let width = bound_axis_within_min_max(&style, Dim::Width, width, owner_width).max(padding_border_width);
        let height = bound_axis_within_min_max(&style, Dim::Height, height, owner_height).max(padding_border_height);
        node.with_layout_mut(|l| {
            l.measured_dimensions = [OptionalFloat::defined(width), OptionalFloat::defined(height)];
        });
        return;
    }

    // --- Step 1: axes and available inner sizes ---
    let flex_direction = resolve_flex_direction(style.flex_direction, direction);
    let is_wrap = style.flex_wrap != crate::style::FlexWrap::NoWrap;

    let main_dim = axis_dim(flex_direction);
    let cross_direction = flex_direction_cross(style.flex_direction, direction);
    let cross_dim = axis_dim(cross_direction);

    let (available_main, main_mode) = if main_dim == Dim::Width {
        (available_width, width_measure_mode)
    } else {
        (available_height, height_measure_mode)
    };
    let (available_cross, cross_mode) = if cross_dim == Dim::Width {
        (available_width, width_measure_mode)
    } else {
        (available_height, height_measure_mode)
    };
    let main_padding_border = if main_dim == Dim::Width { padding_border_width } else { padding_border_height };
    let cross_padding_border = if cross_dim == Dim::Width { padding_border_width } else { padding_border_height };
    let owner_main = if main_dim == Dim::Width { owner_width } else { owner_height };
    let owner_cross = if cross_dim == Dim::Width { owner_width } else { owner_height };

    let mut available_inner_main = inner_available(available_main, main_mode, main_padding_border);
    let mut available_inner_cross = inner_available(available_cross, cross_mode, cross_padding_border);

    if let Some(v) = available_inner_main.value() {
        available_inner_main = OptionalFloat::defined(bound_axis_within_min_max(&style, main_dim, v, owner_main));
    }
    if let Some(v) = available_inner_cross.value() {
        available_inner_cross = OptionalFloat::defined(bound_axis_within_min_max(&style, cross_dim, v, owner_cross));
    }

    // --- Step 2: single flex child optimization ---
    // If exactly one non-absolute child is both growable and shrinkable and
    // the main axis is exactly-sized (not wrapping), that child will consume
    // all remaining space regardless of its content, so skip the content
    // measurement its flex basis would otherwise require.
    let single_flex_child = if main_mode == MeasureMode::Exactly && !is_wrap {
        let mut candidate: Option<usize> = None;
        let mut ok = true;
        for (idx, child) in children.iter().enumerate() {
            let cs = child.style();
            if cs.position_type == PositionType::Absolute {
                continue;
            }
            if cs.resolved_flex_grow() > 0.0 && cs.resolved_flex_shrink() > 0.0 {
                if candidate.is_some() {
                    ok = false;
                    break;
                }
                candidate = Some(idx);
            }
        }
        if ok {
            candidate
        } else {
            None
        }
    } else {
        None
    };

    // --- Step 3: compute flex basis per child ---
    struct Item {
        node: Node,
        is_absolute: bool,
        basis: f32,
        main_size: f32,
        cross_size: f32,
        frozen: bool,
        line_index: i32,
    }

    let mut items: Vec<Item> = Vec::with_capacity(children.len());
    for (idx, child) in children.iter().enumerate() {
        let child_style = child.style();
        let is_absolute = child_style.position_type == PositionType::Absolute;
        let basis = if is_absolute {
            0.0
        } else if Some(idx) == single_flex_child {
            0.0
        } else {
            compute_flex_basis(child, &child_style, flex_direction, main_dim, available_inner_main, available_inner_cross, owner_width, owner_height, direction)
        };
        child.with_layout_mut(|l| {
            l.computed_flex_basis = OptionalFloat::defined(basis);
            l.computed_flex_basis_generation = current_generation();
        });
        items.push(Item {
            node: child.clone(),
            is_absolute,
            basis,
            main_size: basis,
            cross_size: 0.0,
            frozen: false,
            line_index: 0,
        });
    }

    // --- Step 4: collect lines ---
    let mut lines: Vec<Vec<usize>> = vec![Vec::new()];
    {
        let mut line_main_size = 0.0_f32;
        for (idx, item) in items.iter().enumerate() {
            if item.is_absolute {
                lines.last_mut().unwrap().push(idx);
                continue;
            }
            let child_style = item.node.style();
            let item_outer = item.basis + margin_for_axis(&child_style, flex_direction, owner_main);
            if is_wrap
                && !lines.last().unwrap().is_empty()
                && available_inner_main.is_defined()
                && line_main_size + item_outer > available_inner_main.unwrap_or(f32::INFINITY) + crate::value::FLOAT_EPSILON
            {
                lines.push(Vec::new());
                line_main_size = 0.0;
            }
            line_main_size += item_outer;
            lines.last_mut().unwrap().push(idx);
        }
    }

    let mut had_overflow = false;

    // --- Step 5 & 6: resolve flexible lengths + justify, per line ---
    let mut line_cross_sizes: Vec<f32> = Vec::with_capacity(lines.len());
    let mut line_ascents: Vec<f32> = Vec::with_capacity(lines.len());

    for (line_idx, line) in lines.iter().enumerate() {
        let relative: Vec<usize> = line.iter().copied().filter(|&i| !items[i].is_absolute).collect();
        if relative.is_empty() {
            line_cross_sizes.push(0.0);
            line_ascents.push(0.0);
            continue;
        }

        let total_outer_basis: f32 = relative
            .iter()
            .map(|&i| items[i].basis + margin_for_axis(&items[i].node.style(), flex_direction, owner_main))
            .sum();
        let total_gap = style.gap[main_dim as usize] * (relative.len() as f32 - 1.0).max(0.0);
        let free_space = available_inner_main.value().map(|avail| avail - total_outer_basis - total_gap);

        if let Some(space) = free_space {
            if space < 0.0 {
                had_overflow = true;
            }
        }

        // Freeze items with no flex factor in the active direction up front.
        let growing = free_space.unwrap_or(0.0) > 0.0;
        for &i in &relative {
            let cs = items[i].node.style();
            let factor = if growing { cs.resolved_flex_grow() } else { cs.resolved_flex_shrink() * items[i].basis };
            if factor <= 0.0 {
                items[i].frozen = true;
            }
        }
        let mut remaining_space = free_space.unwrap_or(0.0);
        let mut active: Vec<usize> = relative.iter().copied().filter(|&i| !items[i].frozen).collect();

        // Pass A: detect violators against the line's initial factor total and
        // freeze them at their clamped size, removing their share from the
        // free space. Exactly one pass — not iterated to convergence.
        let total_factor_pass1: f32 = active
            .iter()
            .map(|&i| {
                let cs = items[i].node.style();
                if growing {
                    cs.resolved_flex_grow()
                } else {
                    cs.resolved_flex_shrink() * items[i].basis
                }
            })
            .sum();
        if total_factor_pass1 > 0.0 {
            let mut next_active = Vec::new();
            for &i in &active {
                let cs = items[i].node.style();
                let factor = if growing { cs.resolved_flex_grow() } else { cs.resolved_flex_shrink() * items[i].basis };
                let share = remaining_space * (factor / total_factor_pass1);
                let naive_size = items[i].basis + share;
                let min = resolve_value(cs.min_dim(main_dim), owner_main);
                let max = resolve_value(cs.max_dim(main_dim), owner_main);
                let clamped = OptionalFloat::defined(naive_size.max(0.0)).bound(min, max).unwrap_or(naive_size.max(0.0));
                if (clamped - naive_size).abs() > crate::value::FLOAT_EPSILON {
                    items[i].main_size = clamped;
                    items[i].frozen = true;
                    remaining_space -= clamped - items[i].basis;
                } else {
                    next_active.push(i);
                }
            }
            active = next_active;
        }

        // Pass B: sizing of whatever is still active. No further violation
        // checking — items that clamp here keep their clamped size even if
        // that changes the line's total main size, matching the original's
        // bounded two-pass cost.
        let totals: f32 = active
            .iter()
            .map(|&i| {
                let cs = items[i].node.style();
                if growing {
                    cs.resolved_flex_grow()
                } else {
                    cs.resolved_flex_shrink() * items[i].basis
                }
            })
            .sum();
        for &i in &active {
            let cs = items[i].node.style();
            let factor = if growing { cs.resolved_flex_grow() } else { cs.resolved_flex_shrink() * items[i].basis };
            let share = if totals > 0.0 { remaining_space * (factor / totals) } else { 0.0 };
            let naive_size = (items[i].basis + share).max(0.0);
            let min = resolve_value(cs.min_dim(main_dim), owner_main);
            let max = resolve_value(cs.max_dim(main_dim), owner_main);
            items[i].main_size = OptionalFloat::defined(naive_size).bound(min, max).unwrap_or(naive_size);
        }
        for &i in &relative {
            if !active.contains(&i) && !items[i].frozen {
                items[i].main_size = items[i].basis;
            }
            items[i].line_index = line_idx as i32;
            items[i].node.with_layout_mut(|l| l.line_index = line_idx as i32);
        }

        // Lay each relative item out at its resolved main size.
        for &i in &relative {
            let child = items[i].node.clone();
            let child_style = child.style();
            let main_size = items[i].main_size;
            let align = align_item(style.align_items, style.flex_direction, child_style.align_self);
            let stretch_cross = available_inner_cross.is_defined()
                && !is_wrap
                && align == Align::Stretch
                && !has_cross_auto_margin(&child_style, cross_direction)
                && !child_style.dim(cross_dim).is_defined();

            let (child_width, child_height, width_mode, height_mode) = axis_constraints(
                main_dim,
                cross_dim,
                main_size,
                available_inner_cross,
                stretch_cross,
                &child_style,
                owner_width,
                owner_height,
            );

            layout_internal(&child, child_width, child_height, direction, width_mode, height_mode, owner_width, owner_height, perform_layout);

            let (w, h) = child.with_layout(|l| (l.measured_dimensions[0].unwrap_or(0.0), l.measured_dimensions[1].unwrap_or(0.0)));
            items[i].cross_size = if cross_dim == Dim::Width { w } else { h };
        }

        // --- Step 6: main-axis justification ---
        let total_margin: f32 = relative.iter().map(|&i| margin_for_axis(&items[i].node.style(), flex_direction, owner_main)).sum();
        let total_main: f32 = relative.iter().map(|&i| items[i].main_size).sum::<f32>() + total_margin;
        let total_gap = style.gap[main_dim as usize] * (relative.len() as f32 - 1.0).max(0.0);
        let remaining = available_inner_main.value().map(|a| a - total_main - total_gap).unwrap_or(0.0);
        if remaining < 0.0 {
            had_overflow = true;
        }

        let auto_margin_count = relative
            .iter()
            .filter(|&&i| is_leading_main_margin_auto(&items[i].node.style(), flex_direction) || is_trailing_main_margin_auto(&items[i].node.style(), flex_direction))
            .count();

        let (leading, between_base) = if auto_margin_count > 0 {
            (0.0, 0.0)
        } else {
            justify_spacing(style.justify_content, remaining, relative.len())
        };
        let auto_margin_share = if auto_margin_count > 0 { remaining.max(0.0) / auto_margin_count as f32 } else { 0.0 };

        let mut main_cursor = leading;
        for (pos_in_line, &i) in relative.iter().enumerate() {
            let child_style = items[i].node.style();
            let mut leading_m = resolve_value_margin_leading(&child_style, flex_direction, owner_main);
            let trailing_m = resolve_value_margin_trailing(&child_style, flex_direction, owner_main);
            if auto_margin_count > 0 && is_leading_main_margin_auto(&child_style, flex_direction) {
                leading_m += auto_margin_share;
            }
            main_cursor += leading_m;
            let leading_edge = crate::axis::leading_edge(flex_direction);
            items[i].node.with_layout_mut(|l| {
                set_main_position(&mut l.position, leading_edge, main_cursor);
            });
            main_cursor += items[i].main_size + trailing_m;
            if pos_in_line + 1 < relative.len() {
                main_cursor += between_base + style.gap[main_dim as usize];
            }
        }

        // --- Step 7: cross-axis alignment within the line ---
        let line_cross_size = relative
            .iter()
            .map(|&i| items[i].cross_size + margin_for_axis(&items[i].node.style(), cross_direction, owner_cross))
            .fold(0.0_f32, f32::max);
        let mut line_ascent = 0.0_f32;
        for &i in &relative {
            let cs = items[i].node.style();
            let align = align_item(style.align_items, style.flex_direction, cs.align_self);
            if align == Align::Baseline {
                let baseline = compute_baseline(&items[i].node);
                line_ascent = line_ascent.max(baseline);
            }
        }
        line_cross_sizes.push(line_cross_size);
        line_ascents.push(line_ascent);
    }

    // --- Step 8: multi-line content alignment ---
    let total_lines_cross: f32 = line_cross_sizes.iter().sum::<f32>() + style.gap[cross_dim as usize] * (lines.len() as f32 - 1.0).max(0.0);
    let remaining_cross = available_inner_cross.value().map(|a| a - total_lines_cross).unwrap_or(0.0);
    if remaining_cross < 0.0 {
        had_overflow = true;
    }
    let (cross_leading, cross_between) = justify_spacing(justify_from_align(style.align_content), remaining_cross, lines.len());
    let stretch_lines = style.align_content == Align::Stretch && lines.len() > 1 && available_inner_cross.is_defined();
    let extra_per_line = if stretch_lines { remaining_cross.max(0.0) / lines.len() as f32 } else { 0.0 };

    let mut cross_cursor = cross_leading;
    for (line_idx, line) in lines.iter().enumerate() {
        let relative: Vec<usize> = line.iter().copied().filter(|&i| !items[i].is_absolute).collect();
        let this_line_cross = line_cross_sizes[line_idx] + extra_per_line;
        for &i in &relative {
            let cs = items[i].node.style();
            let align = align_item(style.align_items, style.flex_direction, cs.align_self);
            let child_cross_outer = items[i].cross_size + margin_for_axis(&cs, cross_direction, owner_cross);
            let remaining_in_line = (this_line_cross - child_cross_outer).max(0.0);
            let pos_within_line = match align {
                Align::FlexStart | Align::Stretch => 0.0,
                Align::FlexEnd => remaining_in_line,
                Align::Center => remaining_in_line / 2.0,
                Align::Baseline => line_ascents[line_idx] - compute_baseline(&items[i].node),
                _ => 0.0,
            };
            let leading_cross_margin = resolve_value_margin_leading(&cs, cross_direction, owner_cross);
            let leading_cross_edge = crate::axis::leading_edge(cross_direction);
            items[i].node.with_layout_mut(|l| {
                set_main_position(&mut l.position, leading_cross_edge, cross_cursor + pos_within_line + leading_cross_margin);
            });
        }
        cross_cursor += this_line_cross + cross_between + style.gap[cross_dim as usize];
    }

    // --- Step 9: final dimensions ---
    let content_main: f32 = lines
        .iter()
        .map(|line| {
            let relative: Vec<usize> = line.iter().copied().filter(|&i| !items[i].is_absolute).collect();
            let total_margin: f32 = relative.iter().map(|&i| margin_for_axis(&items[i].node.style(), flex_direction, owner_main)).sum();
            let total_gap = style.gap[main_dim as usize] * (relative.len() as f32 - 1.0).max(0.0);
            relative.iter().map(|&i| items[i].main_size).sum::<f32>() + total_margin + total_gap
        })
        .fold(0.0_f32, f32::max);
    let content_cross: f32 = line_cross_sizes.iter().sum::<f32>() + style.gap[cross_dim as usize] * (lines.len() as f32 - 1.0).max(0.0);

    let main_final = final_axis_size(main_mode, available_main, content_main, main_padding_border, style.overflow);
    let cross_final = final_axis_size(cross_mode, available_cross, content_cross, cross_padding_border, style.overflow);

    let main_final = bound_axis_within_min_max(&style, main_dim, main_final, owner_main).max(main_padding_border);
    let cross_final = bound_axis_within_min_max(&style, cross_dim, cross_final, owner_cross).max(cross_padding_border);

    let mut dims = [OptionalFloat::UNDEFINED; 2];
    dims[main_dim as usize] = OptionalFloat::defined(main_final);
    dims[cross_dim as usize] = OptionalFloat::defined(cross_final);

    node.with_layout_mut(|l| {
        l.measured_dimensions = dims;
        l.had_overflow = had_overflow;
    });

    // --- Step 10: absolute children ---
    let final_width = dims[Dim::Width as usize].unwrap_or(0.0);
    let final_height = dims[Dim::Height as usize].unwrap_or(0.0);
    for item in items.iter().filter(|it| it.is_absolute) {
        layout_absolute_child(&item.node, &style, final_width, final_height, direction, perform_layout);
    }

    // --- Step 11: trailing positions for reverse flows ---
    for item in items.iter().filter(|it| !it.is_absolute) {
        if flex_direction.is_reverse() {
            let trailing_edge = crate::axis::trailing_edge(flex_direction);
            let leading_edge = crate::axis::leading_edge(flex_direction);
            item.node.with_layout_mut(|l| {
                let leading_pos = get_main_position(&l.position, leading_edge);
                let child_size = item.main_size;
                let parent_size = if main_dim == Dim::Width { final_width } else { final_height };
                set_main_position(&mut l.position, trailing_edge, parent_size - child_size - leading_pos);
            });
        }
        if cross_direction.is_reverse() {
            let trailing_edge = crate::axis::trailing_edge(cross_direction);
            let leading_edge = crate::axis::leading_edge(cross_direction);
            item.node.with_layout_mut(|l| {
                let leading_pos = get_main_position(&l.position, leading_edge);
                let child_size = item.cross_size;
                let parent_size = if cross_dim == Dim::Width { final_width } else { final_height };
                set_main_position(&mut l.position, trailing_edge, parent_size - child_size - leading_pos);
            });
        }
        if style.flex_wrap == crate::style::FlexWrap::WrapReverse {
            let leading_edge = crate::axis::leading_edge(cross_direction);
            item.node.with_layout_mut(|l| {
                let old_pos = get_main_position(&l.position, leading_edge);
                let child_size = item.cross_size;
                let parent_cross = if cross_dim == Dim::Width { final_width } else { final_height };
                set_main_position(&mut l.position, leading_edge, parent_cross - old_pos - child_size);
            });
        }
    }
}

fn resolve_value_margin_leading(style: &Style, axis: FlexDirection, owner_size: OptionalFloat) -> f32 {
    leading_margin(style, axis, owner_size)
}

fn resolve_value_margin_trailing(style: &Style, axis: FlexDirection, owner_size: OptionalFloat) -> f32 {
    trailing_margin(style, axis, owner_size)
}

fn is_leading_main_margin_auto(style: &Style, axis: FlexDirection) -> bool {
    let edge = crate::axis::leading_edge(axis);
    matches!(style.margin(edge), Value::Auto) || (axis.is_row() && matches!(style.margin(crate::value::Edge::Start), Value::Auto))
}

fn is_trailing_main_margin_auto(style: &Style, axis: FlexDirection) -> bool {
    let edge = crate::axis::trailing_edge(axis);
    matches!(style.margin(edge), Value::Auto) || (axis.is_row() && matches!(style.margin(crate::value::Edge::End), Value::Auto))
}

fn has_cross_auto_margin(style: &Style, cross_axis: FlexDirection) -> bool {
    is_leading_main_margin_auto(style, cross_axis) || is_trailing_main_margin_auto(style, cross_axis)
}

fn justify_from_align(align: Align) -> JustifyContent {
    match align {
        Align::Center => JustifyContent::Center,
        Align::FlexEnd => JustifyContent::FlexEnd,
        Align::SpaceBetween => JustifyContent::SpaceBetween,
        Align::SpaceAround => JustifyContent::SpaceAround,
        _ => JustifyContent::FlexStart,
    }
}

/// Leading offset and between-item spacing for a `justifyContent` value,
/// given the remaining free space on a line.
fn justify_spacing(justify: JustifyContent, remaining: f32, item_count: usize) -> (f32, f32) {
    let remaining = remaining.max(0.0);
    let n = item_count.max(1) as f32;
    match justify {
        JustifyContent::FlexStart => (0.0, 0.0),
        JustifyContent::Center => (remaining / 2.0, 0.0),
        JustifyContent::FlexEnd => (remaining, 0.0),
        JustifyContent::SpaceBetween => {
            if item_count <= 1 {
                (0.0, 0.0)
            } else {
                (0.0, remaining / (item_count as f32 - 1.0))
            }
        }
        JustifyContent::SpaceAround => (remaining / n / 2.0, remaining / n),
        JustifyContent::SpaceEvenly => (remaining / (n + 1.0), remaining / (n + 1.0)),
    }
}

fn set_main_position(position: &mut [f32; 4], edge: crate::value::Edge, value: f32) {
    let idx = match edge {
        crate::value::Edge::Left => 0,
        crate::value::Edge::Top => 1,
        crate::value::Edge::Right => 2,
        crate::value::Edge::Bottom => 3,
        _ => return,
    };
    position[idx] = value;
}

fn get_main_position(position: &[f32; 4], edge: crate::value::Edge) -> f32 {
    let idx = match edge {
        crate::value::Edge::Left => 0,
        crate::value::Edge::Top => 1,
        crate::value::Edge::Right => 2,
        crate::value::Edge::Bottom => 3,
        _ => return 0.0,
    };
    position[idx]
}

/// A leaf with no `baseline` callback contributes its bottom edge as its
/// baseline.
fn compute_baseline(node: &Node) -> f32 {
    if let Some(baseline_fn) = node.baseline_func() {
        let (w, h) = node.with_layout(|l| (l.measured_dimensions[0].unwrap_or(0.0), l.measured_dimensions[1].unwrap_or(0.0)));
        return baseline_fn.baseline(w, h);
    }
    node.with_layout(|l| l.measured_dimensions[1].unwrap_or(0.0))
}

fn size_with_mode(available: OptionalFloat, mode: MeasureMode, padding_border: f32) -> f32 {
    match mode {
        MeasureMode::Exactly => available.unwrap_or(padding_border),
        MeasureMode::AtMost | MeasureMode::Undefined => padding_border,
    }
}

fn inner_available(available: OptionalFloat, mode: MeasureMode, padding_border: f32) -> OptionalFloat {
    match mode {
        MeasureMode::Undefined => OptionalFloat::UNDEFINED,
        _ => available.value().map_or(OptionalFloat::UNDEFINED, |a| OptionalFloat::defined((a - padding_border).max(0.0))),
    }
}

/// Clears a `display:none` node's layout, and recurses into its children so
/// stale sizes/positions from a prior `calculate()` never leak through —
/// a `display:none` subtree is never visited by `layout_impl` otherwise.
fn zero_out_layout_recursively(node: &Node) {
    node.with_layout_mut(|l| {
        *l = Layout::default();
    });
    node.set_has_new_layout(true);
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            zero_out_layout_recursively(&child);
        }
    }
}

fn final_axis_size(mode: MeasureMode, available: OptionalFloat, content: f32, padding_border: f32, overflow: crate::style::Overflow) -> f32 {
    match mode {
        MeasureMode::Exactly => available.unwrap_or(content + padding_border),
        MeasureMode::AtMost => {
            if overflow == crate::style::Overflow::Scroll {
                // atMost + overflow:scroll clamps to available space.
                let avail = available.unwrap_or(f32::INFINITY);
                (content + padding_border).min(avail.max(padding_border))
            } else {
                // visible/hidden: atMost behaves like undefined for
                // content-driven sizing, unclamped by available space.
                content + padding_border
            }
        }
        MeasureMode::Undefined => content + padding_border,
    }
}

#[allow(clippy::too_many_arguments)]
fn compute_flex_basis(
    child: &Node,
    child_style: &Style,
    flex_direction: FlexDirection,
    main_dim: Dim,
    available_inner_main: OptionalFloat,
    available_inner_cross: OptionalFloat,
    owner_width: OptionalFloat,
    owner_height: OptionalFloat,
    direction: Direction,
) -> f32 {
    let owner_main = if main_dim == Dim::Width { owner_width } else { owner_height };
    let padding_border_main = main_axis_padding_border(child_style, flex_direction, owner_width, owner_height);

    if let Value::Point(p) = child_style.flex_basis {
        return p.max(padding_border_main);
    }
    if let Value::Percent(p) = child_style.flex_basis {
        if let Some(resolved) = resolve_value(Value::Percent(p), owner_main).value() {
            return resolved.max(padding_border_main);
        }
    }
    if child_style.dim(main_dim).is_defined() {
        if let Some(resolved) = resolve_value(child_style.dim(main_dim), owner_main).value() {
            return resolved.max(padding_border_main);
        }
    }

    let cross_dim = if main_dim == Dim::Width { Dim::Height } else { Dim::Width };
    let owner_cross = if cross_dim == Dim::Width { owner_width } else { owner_height };
    let cross_resolved = resolve_value(child_style.dim(cross_dim), owner_cross).value();

    // `aspectRatio` derives the main dimension from an already-resolved
    // cross dimension before falling back to intrinsic measurement.
    if let (Some(aspect), Some(cross)) = (child_style.aspect_ratio.value(), cross_resolved) {
        let basis = if main_dim == Dim::Width { cross * aspect } else { cross / aspect };
        return basis.max(padding_border_main);
    }

    // Intrinsic measurement: lay the child out `atMost` in the main axis to
    // find its content size. The cross axis uses the child's own dimension
    // when it resolves to something definite, matching how it will actually
    // be constrained once laid out for real (Step 5).
    let (cross_size, cross_mode) = match cross_resolved {
        Some(v) => (OptionalFloat::defined(v), MeasureMode::Exactly),
        None => (available_inner_cross, mode_for(available_inner_cross)),
    };

    let (width, width_mode, height, height_mode) = if main_dim == Dim::Width {
        (available_inner_main, mode_for(available_inner_main), cross_size, cross_mode)
    } else {
        (cross_size, cross_mode, available_inner_main, mode_for(available_inner_main))
    };
    layout_internal(child, width, height, direction, width_mode, height_mode, owner_width, owner_height, false);
    let measured = child.with_layout(|l| l.measured_dimensions[main_dim as usize]);
    measured.unwrap_or(padding_border_main).max(padding_border_main)
}

fn mode_for(available: OptionalFloat) -> MeasureMode {
    if available.is_defined() {
        MeasureMode::AtMost
    } else {
        MeasureMode::Undefined
    }
}

fn main_axis_padding_border(style: &Style, axis: FlexDirection, owner_width: OptionalFloat, owner_height: OptionalFloat) -> f32 {
    if axis.is_row() {
        leading_padding(style, axis, owner_width) + trailing_padding(style, axis, owner_width) + leading_border(style, axis) + trailing_border(style, axis)
    } else {
        leading_padding(style, axis, owner_height) + trailing_padding(style, axis, owner_height) + leading_border(style, axis) + trailing_border(style, axis)
    }
}

/// Derive the `(width, height, width_mode, height_mode)` constraints to lay
/// a flex item out with, given its resolved main size. Respects
/// `aspectRatio` by deriving the cross dimension in `exactly` mode when the
/// main dimension is exact and the cross is not otherwise pinned.
#[allow(clippy::too_many_arguments)]
fn axis_constraints(
    main_dim: Dim,
    cross_dim: Dim,
    main_size: f32,
    available_inner_cross: OptionalFloat,
    stretch_cross: bool,
    child_style: &Style,
    owner_width: OptionalFloat,
    owner_height: OptionalFloat,
) -> (OptionalFloat, OptionalFloat, MeasureMode, MeasureMode) {
    let owner_cross = if cross_dim == Dim::Width { owner_width } else { owner_height };

    let mut cross_size;
    let mut cross_mode;
    if let Some(aspect) = child_style.aspect_ratio.value() {
        cross_size = if main_dim == Dim::Width { main_size / aspect } else { main_size * aspect };
        cross_mode = MeasureMode::Exactly;
    } else if stretch_cross {
        cross_size = available_inner_cross.unwrap_or(0.0);
        cross_mode = MeasureMode::Exactly;
    } else if let Some(v) = resolve_value(child_style.dim(cross_dim), owner_cross).value() {
        cross_size = v;
        cross_mode = MeasureMode::Exactly;
    } else {
        cross_size = available_inner_cross.unwrap_or(0.0);
        cross_mode = if available_inner_cross.is_defined() { MeasureMode::AtMost } else { MeasureMode::Undefined };
    }
    if cross_mode != MeasureMode::Exactly && !available_inner_cross.is_defined() {
        cross_size = 0.0;
    }

    let (width, height, width_mode, height_mode) = if main_dim == Dim::Width {
        (OptionalFloat::defined(main_size), if cross_mode == MeasureMode::Undefined { OptionalFloat::UNDEFINED } else { OptionalFloat::defined(cross_size) }, MeasureMode::Exactly, cross_mode)
    } else {
        (if cross_mode == MeasureMode::Undefined { OptionalFloat::UNDEFINED } else { OptionalFloat::defined(cross_size) }, OptionalFloat::defined(main_size), cross_mode, MeasureMode::Exactly)
    };
    (width, height, width_mode, height_mode)
}

#[allow(clippy::too_many_arguments)]
fn layout_leaf_with_measure(
    node: &Node,
    style: &Style,
    measure: &dyn MeasureFunc,
    available_width: OptionalFloat,
    available_height: OptionalFloat,
    width_measure_mode: MeasureMode,
    height_measure_mode: MeasureMode,
    owner_width: OptionalFloat,
    owner_height: OptionalFloat,
    padding_border_width: f32,
    padding_border_height: f32,
) {
    let inner_width = inner_available(available_width, width_measure_mode, padding_border_width);
    let inner_height = inner_available(available_height, height_measure_mode, padding_border_height);
    let (measured_w, measured_h) = measure.measure(inner_width, width_measure_mode, inner_height, height_measure_mode);

    let width = bound_axis_within_min_max(style, Dim::Width, measured_w.unwrap_or(0.0) + padding_border_width, owner_width).max(padding_border_width);
    let height = bound_axis_within_min_max(style, Dim::Height, measured_h.unwrap_or(0.0) + padding_border_height, owner_height).max(padding_border_height);

    node.with_layout_mut(|l| {
        l.measured_dimensions = [OptionalFloat::defined(width), OptionalFloat::defined(height)];
    });
}

/// Step 10: size and position one absolutely-positioned child.
fn layout_absolute_child(child: &Node, parent_style: &Style, parent_width: f32, parent_height: f32, direction: Direction, perform_layout: bool) {
    let child_style = child.style();
    let row_axis = resolve_flex_direction(FlexDirection::Row, direction);
    let column_axis = FlexDirection::Column;

    let width = resolve_value(child_style.dim(Dim::Width), OptionalFloat::defined(parent_width)).value().or_else(|| {
        if is_leading_position_defined(&child_style, row_axis) && is_trailing_position_defined(&child_style, row_axis) {
            let left = leading_position(&child_style, row_axis, OptionalFloat::defined(parent_width)).unwrap_or(0.0);
            let right = trailing_position(&child_style, row_axis, OptionalFloat::defined(parent_width)).unwrap_or(0.0);
            Some((parent_width - left - right).max(0.0))
        } else {
            None
        }
    });
    let height = resolve_value(child_style.dim(Dim::Height), OptionalFloat::defined(parent_height)).value().or_else(|| {
        if is_leading_position_defined(&child_style, column_axis) && is_trailing_position_defined(&child_style, column_axis) {
            let top = leading_position(&child_style, column_axis, OptionalFloat::defined(parent_height)).unwrap_or(0.0);
            let bottom = trailing_position(&child_style, column_axis, OptionalFloat::defined(parent_height)).unwrap_or(0.0);
            Some((parent_height - top - bottom).max(0.0))
        } else {
            None
        }
    });

    let width_mode = if width.is_some() { MeasureMode::Exactly } else { MeasureMode::AtMost };
    let height_mode = if height.is_some() { MeasureMode::Exactly } else { MeasureMode::AtMost };

    layout_internal(
        child,
        width.map_or(OptionalFloat::defined(parent_width), OptionalFloat::defined),
        height.map_or(OptionalFloat::defined(parent_height), OptionalFloat::defined),
        direction,
        width_mode,
        height_mode,
        OptionalFloat::defined(parent_width),
        OptionalFloat::defined(parent_height),
        perform_layout,
    );

    let (final_width, final_height) = child.with_layout(|l| (l.measured_dimensions[0].unwrap_or(0.0), l.measured_dimensions[1].unwrap_or(0.0)));

    let left = if is_leading_position_defined(&child_style, row_axis) {
        leading_position(&child_style, row_axis, OptionalFloat::defined(parent_width)).unwrap_or(0.0)
    } else if is_trailing_position_defined(&child_style, row_axis) {
        parent_width - final_width - trailing_position(&child_style, row_axis, OptionalFloat::defined(parent_width)).unwrap_or(0.0)
    } else {
        match parent_style.justify_content {
            JustifyContent::Center => (parent_width - final_width) / 2.0,
            JustifyContent::FlexEnd => parent_width - final_width,
            _ => match parent_style.align_items {
                Align::Center => (parent_width - final_width) / 2.0,
                Align::FlexEnd => parent_width - final_width,
                _ => 0.0,
            },
        }
    };
    let top = if is_leading_position_defined(&child_style, column_axis) {
        leading_position(&child_style, column_axis, OptionalFloat::defined(parent_height)).unwrap_or(0.0)
    } else if is_trailing_position_defined(&child_style, column_axis) {
        parent_height - final_height - trailing_position(&child_style, column_axis, OptionalFloat::defined(parent_height)).unwrap_or(0.0)
    } else {
        match parent_style.align_items {
            Align::Center => (parent_height - final_height) / 2.0,
            Align::FlexEnd => parent_height - final_height,
            _ => 0.0,
        }
    };

    child.with_layout_mut(|l| {
        l.position[0] = left;
        l.position[1] = top;
        l.position[2] = parent_width - left - final_width;
        l.position[3] = parent_height - top - final_height;
    });
}
