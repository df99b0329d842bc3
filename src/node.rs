//! The tree node, the computed `Layout` result, `Config`, callback
//! registration, dirty propagation, and the copy-on-write child-cloning
//! protocol.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::cache::{CachedMeasurement, MeasureMode, MAX_CACHED_RESULT_COUNT};
use crate::error::FlexError;
use crate::logging::{LogLevel, Logger};
use crate::style::{Align, Direction, Display, FlexDirection, FlexWrap, JustifyContent, Overflow, PositionType, Style};
use crate::value::{Dim, Edge, Value, DIM_COUNT, LAYOUT_EDGE_COUNT};
use crate::OptionalFloat;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NodeType {
    #[default]
    Default,
    Text,
}

pub type Size = (OptionalFloat, OptionalFloat);

pub trait MeasureFunc {
    fn measure(&self, width: OptionalFloat, width_mode: MeasureMode, height: OptionalFloat, height_mode: MeasureMode) -> Size;
}

impl<F> MeasureFunc for F
where
    F: Fn(OptionalFloat, MeasureMode, OptionalFloat, MeasureMode) -> Size,
{
    fn measure(&self, width: OptionalFloat, width_mode: MeasureMode, height: OptionalFloat, height_mode: MeasureMode) -> Size {
        self(width, width_mode, height, height_mode)
    }
}

pub trait BaselineFunc {
    fn baseline(&self, width: f32, height: f32) -> f32;
}

impl<F> BaselineFunc for F
where
    F: Fn(f32, f32) -> f32,
{
    fn baseline(&self, width: f32, height: f32) -> f32 {
        self(width, height)
    }
}

pub trait DirtiedFunc {
    fn dirtied(&self);
}

impl<F> DirtiedFunc for F
where
    F: Fn(),
{
    fn dirtied(&self) {
        self()
    }
}

/// Process-lifetime-safe bag of layout-wide options.
pub struct Config {
    pub use_web_defaults: bool,
    pub use_legacy_stretch_behaviour: bool,
    pub point_scale_factor: f32,
    pub experimental_features: ExperimentalFeatures,
    logger: Option<Rc<dyn Logger>>,
    clone_node: Option<Rc<dyn Fn(&Node) -> Node>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExperimentalFeatures {
    pub web_flex_basis: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            use_web_defaults: false,
            use_legacy_stretch_behaviour: false,
            point_scale_factor: 1.0,
            experimental_features: ExperimentalFeatures::default(),
            logger: None,
            clone_node: None,
        }
    }
}

impl Config {
    pub fn new() -> Rc<RefCell<Config>> {
        Rc::new(RefCell::new(Config::default()))
    }

    pub fn set_point_scale_factor(&mut self, factor: f32) -> Result<(), FlexError> {
        if factor < 0.0 {
            self.log(LogLevel::Fatal, "pointScaleFactor must not be negative");
            return Err(FlexError::Constraint("negative pointScaleFactor".into()));
        }
        self.point_scale_factor = factor;
        Ok(())
    }

    pub fn set_logger(&mut self, logger: Rc<dyn Logger>) {
        self.logger = Some(logger);
    }

    pub fn set_clone_node_func(&mut self, clone_node: Rc<dyn Fn(&Node) -> Node>) {
        self.clone_node = Some(clone_node);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if let Some(logger) = &self.logger {
            logger.log(level, message);
        } else {
            crate::logging::default_log(level, message);
        }
    }
}

/// The computed result of a layout pass.
#[derive(Clone, Debug)]
pub struct Layout {
    /// left, top, right, bottom, in owner-relative coordinates.
    pub position: [f32; 4],
    pub dimensions: [OptionalFloat; DIM_COUNT],
    pub margin: [f32; LAYOUT_EDGE_COUNT],
    pub border: [f32; LAYOUT_EDGE_COUNT],
    pub padding: [f32; LAYOUT_EDGE_COUNT],
    pub direction: Direction,
    pub had_overflow: bool,
    pub computed_flex_basis: OptionalFloat,
    pub computed_flex_basis_generation: u32,
    pub measured_dimensions: [OptionalFloat; DIM_COUNT],
    pub cached_layout: CachedMeasurement,
    pub cached_measurements: [CachedMeasurement; MAX_CACHED_RESULT_COUNT],
    pub next_cached_measurements_index: usize,
    pub last_owner_direction: Option<Direction>,
    pub generation_count: u32,
    pub did_use_legacy_flag: bool,
    pub does_legacy_stretch_flag_affect_layout: bool,
    pub line_index: i32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            position: [0.0; 4],
            dimensions: [OptionalFloat::UNDEFINED; DIM_COUNT],
            margin: [0.0; LAYOUT_EDGE_COUNT],
            border: [0.0; LAYOUT_EDGE_COUNT],
            padding: [0.0; LAYOUT_EDGE_COUNT],
            direction: Direction::Inherit,
            had_overflow: false,
            computed_flex_basis: OptionalFloat::UNDEFINED,
            computed_flex_basis_generation: 0,
            measured_dimensions: [OptionalFloat::UNDEFINED; DIM_COUNT],
            cached_layout: CachedMeasurement::empty(),
            cached_measurements: [CachedMeasurement::empty(); MAX_CACHED_RESULT_COUNT],
            next_cached_measurements_index: 0,
            last_owner_direction: None,
            generation_count: 0,
            did_use_legacy_flag: false,
            does_legacy_stretch_flag_affect_layout: false,
            line_index: 0,
        }
    }
}

impl Layout {
    pub fn clear_cache(&mut self) {
        self.cached_layout = CachedMeasurement::empty();
        self.cached_measurements = [CachedMeasurement::empty(); MAX_CACHED_RESULT_COUNT];
        self.next_cached_measurements_index = 0;
    }

    /// Insert a ring entry, wrapping to 0 when the 16-slot buffer is full.
    pub fn push_cached_measurement(&mut self, entry: CachedMeasurement) {
        if self.next_cached_measurements_index >= MAX_CACHED_RESULT_COUNT {
            self.next_cached_measurements_index = 0;
        }
        self.cached_measurements[self.next_cached_measurements_index] = entry;
        self.next_cached_measurements_index += 1;
    }
}

pub(crate) struct NodeData {
    pub id: NodeId,
    pub config: Rc<RefCell<Config>>,
    pub style: Style,
    pub layout: Layout,
    pub children: Vec<Node>,
    pub owner: Option<Weak<RefCell<NodeData>>>,
    pub node_type: NodeType,
    pub is_dirty: bool,
    pub has_new_layout: bool,
    pub measure: Option<Rc<dyn MeasureFunc>>,
    pub baseline: Option<Rc<dyn BaselineFunc>>,
    pub dirtied: Option<Rc<dyn DirtiedFunc>>,
}

/// A handle to a node. Cloning a `Node` clones the handle (cheap `Rc`
/// clone), not the underlying tree — see [`Node::clone_deep`] for that.
#[derive(Clone)]
pub struct Node(pub(crate) Rc<RefCell<NodeData>>);

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0.borrow().id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Node {
    pub fn new(config: &Rc<RefCell<Config>>) -> Node {
        let style = if config.borrow().use_web_defaults {
            Style::web_defaults()
        } else {
            Style::default()
        };
        Node(Rc::new(RefCell::new(NodeData {
            id: NodeId::next(),
            config: Rc::clone(config),
            style,
            layout: Layout::default(),
            children: Vec::new(),
            owner: None,
            node_type: NodeType::Default,
            is_dirty: true,
            has_new_layout: true,
            measure: None,
            baseline: None,
            dirtied: None,
        })))
    }

    pub fn id(&self) -> NodeId {
        self.0.borrow().id
    }

    /// Resets the node back to its default style and layout. Only legal
    /// when the node has no children and no parent.
    pub fn reset(&self) -> Result<(), FlexError> {
        let data = self.0.borrow();
        if !data.children.is_empty() {
            return Err(FlexError::Constraint("cannot reset a node with children".into()));
        }
        if data.owner.is_some() {
            return Err(FlexError::Constraint("cannot reset a node with a parent".into()));
        }
        drop(data);
        let config = Rc::clone(&self.0.borrow().config);
        let mut data = self.0.borrow_mut();
        let style = if config.borrow().use_web_defaults {
            Style::web_defaults()
        } else {
            Style::default()
        };
        data.style = style;
        data.layout = Layout::default();
        data.node_type = NodeType::Default;
        data.is_dirty = true;
        data.has_new_layout = true;
        data.measure = None;
        data.baseline = None;
        data.dirtied = None;
        Ok(())
    }

    /// Shallow clone: a new node sharing no mutable state and with no owner.
    /// Children are re-parented onto the clone by recursively cloning them
    /// too, matching `YGNodeClone`'s recursive default in the absence of a
    /// host clone callback.
    pub fn clone_deep(&self) -> Node {
        let config = Rc::clone(&self.0.borrow().config);
        if let Some(clone_fn) = config.borrow().clone_node.clone() {
            return clone_fn(self);
        }
        let data = self.0.borrow();
        let cloned = Node(Rc::new(RefCell::new(NodeData {
            id: NodeId::next(),
            config: Rc::clone(&data.config),
            style: data.style.clone(),
            layout: data.layout.clone(),
            children: Vec::new(),
            owner: None,
            node_type: data.node_type,
            is_dirty: data.is_dirty,
            has_new_layout: data.has_new_layout,
            measure: data.measure.clone(),
            baseline: data.baseline.clone(),
            dirtied: None,
        })));
        let children: Vec<Node> = data.children.iter().map(Node::clone_deep).collect();
        drop(data);
        for child in &children {
            child.0.borrow_mut().owner = Some(Rc::downgrade(&cloned.0));
        }
        cloned.0.borrow_mut().children = children;
        cloned
    }

    pub fn config(&self) -> Rc<RefCell<Config>> {
        Rc::clone(&self.0.borrow().config)
    }

    pub fn style(&self) -> Style {
        self.0.borrow().style.clone()
    }

    /// Replaces the node's style wholesale, comparing the two style structs
    /// and marking dirty only on an actual difference.
    pub fn set_style(&self, style: Style) {
        let changed = self.0.borrow().style != style;
        if changed {
            self.0.borrow_mut().style = style;
            self.mark_dirty_internal();
        }
    }

    fn with_style_mut(&self, f: impl FnOnce(&mut Style)) {
        let mut data = self.0.borrow_mut();
        let mut style = data.style.clone();
        f(&mut style);
        if style != data.style {
            data.style = style;
            drop(data);
            self.mark_dirty_internal();
        }
    }

    pub fn set_direction(&self, direction: Direction) {
        self.with_style_mut(|s| s.direction = direction);
    }
    pub fn set_flex_direction(&self, value: FlexDirection) {
        self.with_style_mut(|s| s.flex_direction = value);
    }
    pub fn set_justify_content(&self, value: JustifyContent) {
        self.with_style_mut(|s| s.justify_content = value);
    }
    pub fn set_align_content(&self, value: Align) {
        self.with_style_mut(|s| s.align_content = value);
    }
    pub fn set_align_items(&self, value: Align) {
        self.with_style_mut(|s| s.align_items = value);
    }
    pub fn set_align_self(&self, value: Align) {
        self.with_style_mut(|s| s.align_self = value);
    }
    pub fn set_position_type(&self, value: PositionType) {
        self.with_style_mut(|s| s.position_type = value);
    }
    pub fn set_flex_wrap(&self, value: FlexWrap) {
        self.with_style_mut(|s| s.flex_wrap = value);
    }
    pub fn set_overflow(&self, value: Overflow) {
        self.with_style_mut(|s| s.overflow = value);
    }
    pub fn set_display(&self, value: Display) {
        self.with_style_mut(|s| s.display = value);
    }
    pub fn set_flex(&self, value: OptionalFloat) {
        self.with_style_mut(|s| s.flex = value);
    }
    pub fn set_flex_grow(&self, value: OptionalFloat) {
        self.with_style_mut(|s| s.flex_grow = value);
    }
    pub fn set_flex_shrink(&self, value: OptionalFloat) {
        self.with_style_mut(|s| s.flex_shrink = value);
    }
    pub fn set_flex_basis(&self, value: Value) {
        self.with_style_mut(|s| s.flex_basis = value);
    }
    pub fn set_aspect_ratio(&self, value: OptionalFloat) {
        self.with_style_mut(|s| s.aspect_ratio = value);
    }
    pub fn set_gap(&self, dim: Dim, value: f32) {
        self.with_style_mut(|s| s.gap[dim as usize] = value);
    }
    pub fn set_margin(&self, edge: Edge, value: Value) {
        self.with_style_mut(|s| s.margin[edge as usize] = value);
    }
    pub fn set_position_edge(&self, edge: Edge, value: Value) {
        self.with_style_mut(|s| s.position[edge as usize] = value);
    }
    pub fn set_padding(&self, edge: Edge, value: Value) {
        self.with_style_mut(|s| s.padding[edge as usize] = value);
    }
    /// A negative border clamps to zero at read time, so the setter itself
    /// accepts any value but reads are clamped; see `axis`/`algorithm`.
    pub fn set_border(&self, edge: Edge, value: Value) {
        self.with_style_mut(|s| s.border[edge as usize] = value);
    }
    pub fn set_width(&self, value: Value) {
        self.with_style_mut(|s| s.dimensions[Dim::Width as usize] = value);
    }
    pub fn set_height(&self, value: Value) {
        self.with_style_mut(|s| s.dimensions[Dim::Height as usize] = value);
    }
    pub fn set_min_width(&self, value: Value) {
        self.with_style_mut(|s| s.min_dimensions[Dim::Width as usize] = value);
    }
    pub fn set_min_height(&self, value: Value) {
        self.with_style_mut(|s| s.min_dimensions[Dim::Height as usize] = value);
    }
    pub fn set_max_width(&self, value: Value) {
        self.with_style_mut(|s| s.max_dimensions[Dim::Width as usize] = value);
    }
    pub fn set_max_height(&self, value: Value) {
        self.with_style_mut(|s| s.max_dimensions[Dim::Height as usize] = value);
    }

    /// Setting a measure callback on a node with children is a constraint
    /// violation. Setting `None` reverts `nodeType` to `Default`.
    pub fn set_measure_func(&self, measure: Option<Rc<dyn MeasureFunc>>) -> Result<(), FlexError> {
        let mut data = self.0.borrow_mut();
        if measure.is_some() && !data.children.is_empty() {
            let config = Rc::clone(&data.config);
            drop(data);
            config.borrow().log(LogLevel::Fatal, "cannot set a measure function on a node with children");
            return Err(FlexError::Constraint("measure function set on a node with children".into()));
        }
        data.node_type = if measure.is_some() { NodeType::Text } else { NodeType::Default };
        data.measure = measure;
        drop(data);
        self.mark_dirty_internal();
        Ok(())
    }

    pub fn set_baseline_func(&self, baseline: Option<Rc<dyn BaselineFunc>>) {
        self.0.borrow_mut().baseline = baseline;
    }

    pub fn set_dirtied_func(&self, dirtied: Option<Rc<dyn DirtiedFunc>>) {
        self.0.borrow_mut().dirtied = dirtied;
    }

    pub fn has_measure_func(&self) -> bool {
        self.0.borrow().measure.is_some()
    }

    pub(crate) fn measure_func(&self) -> Option<Rc<dyn MeasureFunc>> {
        self.0.borrow().measure.clone()
    }

    pub(crate) fn baseline_func(&self) -> Option<Rc<dyn BaselineFunc>> {
        self.0.borrow().baseline.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.0.borrow().is_dirty
    }

    pub fn get_has_new_layout(&self) -> bool {
        self.0.borrow().has_new_layout
    }

    pub fn set_has_new_layout(&self, value: bool) {
        self.0.borrow_mut().has_new_layout = value;
    }

    /// Only legal on a leaf with a measure callback; invokes `dirtied`
    /// exactly once per clean-to-dirty transition and propagates to the
    /// owner chain.
    pub fn mark_dirty(&self) -> Result<(), FlexError> {
        let data = self.0.borrow();
        if data.measure.is_none() {
            return Err(FlexError::Constraint(
                "markDirty is only legal on a node with a measure function".into(),
            ));
        }
        drop(data);
        self.mark_dirty_internal();
        Ok(())
    }

    /// Internal dirty propagation shared by every style setter and the
    /// public `markDirty`. Propagates monotonically toward the root,
    /// stopping as soon as an already-dirty ancestor is found (invariant 4).
    pub(crate) fn mark_dirty_internal(&self) {
        let mut data = self.0.borrow_mut();
        if data.is_dirty {
            return;
        }
        data.is_dirty = true;
        data.layout.computed_flex_basis = OptionalFloat::UNDEFINED;
        let dirtied = data.dirtied.clone();
        let owner = data.owner.clone();
        drop(data);
        if let Some(dirtied) = dirtied {
            dirtied.dirtied();
        }
        if let Some(owner) = owner.and_then(|w| w.upgrade()) {
            Node(owner).mark_dirty_internal();
        }
    }

    pub(crate) fn clear_dirty(&self) {
        self.0.borrow_mut().is_dirty = false;
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.borrow().children.get(index).cloned()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().owner.as_ref().and_then(|w| w.upgrade()).map(Node)
    }

    /// Copy-on-write guard: before any mutation of the children vector,
    /// ensure every child is actually owned by `self`. If the first child's
    /// owner differs (or children were inserted without establishing
    /// ownership), every child is cloned and re-parented.
    fn ensure_owned_children(&self) {
        let needs_clone = {
            let data = self.0.borrow();
            match data.children.first() {
                Some(first) => match &first.0.borrow().owner {
                    Some(owner) => owner.upgrade().map_or(true, |o| !Rc::ptr_eq(&o, &self.0)),
                    None => true,
                },
                None => false,
            }
        };
        if !needs_clone {
            return;
        }
        let mut data = self.0.borrow_mut();
        let cloned: Vec<Node> = data.children.iter().map(Node::clone_deep).collect();
        data.children = cloned;
        for child in &data.children {
            child.0.borrow_mut().owner = Some(Rc::downgrade(&self.0));
        }
    }

    pub fn insert_child(&self, child: Node, index: usize) -> Result<(), FlexError> {
        if self.0.borrow().measure.is_some() {
            return Err(FlexError::Constraint("cannot insert a child into a node with a measure function".into()));
        }
        self.ensure_owned_children();
        child.0.borrow_mut().owner = Some(Rc::downgrade(&self.0));
        let mut data = self.0.borrow_mut();
        let index = index.min(data.children.len());
        data.children.insert(index, child);
        drop(data);
        self.mark_dirty_internal();
        Ok(())
    }

    pub fn remove_child(&self, child: &Node) {
        self.ensure_owned_children();
        let mut data = self.0.borrow_mut();
        if let Some(pos) = data.children.iter().position(|c| c == child) {
            let removed = data.children.remove(pos);
            drop(data);
            removed.0.borrow_mut().owner = None;
            self.mark_dirty_internal();
        }
    }

    pub fn remove_all_children(&self) {
        let mut data = self.0.borrow_mut();
        let removed = std::mem::take(&mut data.children);
        drop(data);
        for child in &removed {
            child.0.borrow_mut().owner = None;
        }
        if !removed.is_empty() {
            self.mark_dirty_internal();
        }
    }

    pub fn replace_child(&self, old: &Node, new: Node) {
        self.ensure_owned_children();
        let mut data = self.0.borrow_mut();
        if let Some(pos) = data.children.iter().position(|c| c == old) {
            old.0.borrow_mut().owner = None;
            new.0.borrow_mut().owner = Some(Rc::downgrade(&self.0));
            data.children[pos] = new;
            drop(data);
            self.mark_dirty_internal();
        }
    }

    pub(crate) fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn free_recursive(&self) {
        let children = self.0.borrow().children.clone();
        for child in &children {
            child.free_recursive();
        }
        self.remove_all_children();
        if let Some(owner) = self.parent() {
            owner.remove_child(self);
        }
    }

    // --- Layout readback ---

    pub fn layout(&self) -> Layout {
        self.0.borrow().layout.clone()
    }

    pub(crate) fn with_layout<R>(&self, f: impl FnOnce(&Layout) -> R) -> R {
        f(&self.0.borrow().layout)
    }

    pub(crate) fn with_layout_mut<R>(&self, f: impl FnOnce(&mut Layout) -> R) -> R {
        f(&mut self.0.borrow_mut().layout)
    }

    pub fn computed_left(&self) -> f32 {
        self.0.borrow().layout.position[0]
    }
    pub fn computed_top(&self) -> f32 {
        self.0.borrow().layout.position[1]
    }
    pub fn computed_right(&self) -> f32 {
        self.0.borrow().layout.position[2]
    }
    pub fn computed_bottom(&self) -> f32 {
        self.0.borrow().layout.position[3]
    }
    pub fn computed_width(&self) -> f32 {
        self.0.borrow().layout.measured_dimensions[Dim::Width as usize].unwrap_or(0.0)
    }
    pub fn computed_height(&self) -> f32 {
        self.0.borrow().layout.measured_dimensions[Dim::Height as usize].unwrap_or(0.0)
    }
    pub fn computed_direction(&self) -> Direction {
        self.0.borrow().layout.direction
    }
    pub fn had_overflow(&self) -> bool {
        self.0.borrow().layout.had_overflow
    }
    pub fn computed_margin(&self, edge: Edge) -> f32 {
        layout_edge(&self.0.borrow().layout.margin, edge)
    }
    pub fn computed_border(&self, edge: Edge) -> f32 {
        layout_edge(&self.0.borrow().layout.border, edge)
    }
    pub fn computed_padding(&self, edge: Edge) -> f32 {
        layout_edge(&self.0.borrow().layout.padding, edge)
    }
}

/// `Layout::margin`/`border`/`padding` store physical Left/Top/Right/Bottom
/// values directly (computed from the un-swapped `Row`/`Column` axes) plus
/// the direction-aware `Start`/`End` values; no further RTL swap is needed
/// on read.
fn layout_edge(values: &[f32; LAYOUT_EDGE_COUNT], edge: Edge) -> f32 {
    let idx = match edge {
        Edge::Left => 0,
        Edge::Top => 1,
        Edge::Right => 2,
        Edge::Bottom => 3,
        Edge::Start => 4,
        Edge::End => 5,
        _ => return 0.0,
    };
    values[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove_child_round_trips() {
        let config = Config::new();
        let parent = Node::new(&config);
        let child = Node::new(&config);
        parent.insert_child(child.clone(), 0).unwrap();
        assert_eq!(parent.child_count(), 1);
        assert!(child.parent().is_some());

        parent.remove_child(&child);
        assert_eq!(parent.child_count(), 0);
        assert!(child.parent().is_none());
    }

    #[test]
    fn setting_style_to_same_value_does_not_redirty() {
        let config = Config::new();
        let node = Node::new(&config);
        node.clear_dirty();
        node.set_flex_direction(FlexDirection::Column);
        assert!(!node.is_dirty());
        node.set_flex_direction(FlexDirection::Row);
        assert!(node.is_dirty());
    }

    #[test]
    fn dirty_propagates_to_owner_chain() {
        let config = Config::new();
        let root = Node::new(&config);
        let child = Node::new(&config);
        root.insert_child(child.clone(), 0).unwrap();
        root.clear_dirty();
        child.clear_dirty();

        child.set_width(Value::Point(10.0));
        assert!(child.is_dirty());
        assert!(root.is_dirty());
    }

    #[test]
    fn measure_func_on_node_with_children_is_rejected() {
        let config = Config::new();
        let parent = Node::new(&config);
        let child = Node::new(&config);
        parent.insert_child(child, 0).unwrap();
        let result = parent.set_measure_func(Some(Rc::new(|_, _, _, _| {
            (OptionalFloat::defined(0.0), OptionalFloat::defined(0.0))
        })));
        assert!(result.is_err());
    }

    #[test]
    fn copy_on_write_clones_shared_children() {
        let config = Config::new();
        let shared_child = Node::new(&config);

        let parent_a = Node::new(&config);
        parent_a.insert_child(shared_child.clone(), 0).unwrap();

        // Simulate a non-owning parent referencing the same child node.
        let parent_b = Node::new(&config);
        parent_b.0.borrow_mut().children.push(shared_child.clone());

        parent_b.insert_child(Node::new(&config), 1).unwrap();

        // parent_b's first child must now be a clone, not the original.
        let first = parent_b.child(0).unwrap();
        assert_ne!(first, shared_child);
        assert_eq!(parent_a.child(0).unwrap(), shared_child);
    }
}
