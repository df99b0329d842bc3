//! A flexbox layout engine: computes 2D box positions and sizes for a tree
//! of styled nodes.
//!
//! ```
//! use orbit_flex::prelude::*;
//!
//! let config = Config::new();
//! let root = Node::new(&config);
//! root.set_flex_direction(FlexDirection::Row);
//! root.set_width(Value::Point(200.0));
//! root.set_height(Value::Point(100.0));
//!
//! let child = Node::new(&config);
//! child.set_flex_grow(OptionalFloat::defined(1.0));
//! root.insert_child(child.clone(), 0).unwrap();
//!
//! calculate(&root, OptionalFloat::UNDEFINED, OptionalFloat::UNDEFINED, Direction::LTR).unwrap();
//! assert_eq!(child.computed_width(), 200.0);
//! ```

pub mod algorithm;
pub mod axis;
pub mod cache;
pub mod error;
pub mod logging;
pub mod node;
pub mod rounding;
pub mod style;
pub mod value;

pub use value::OptionalFloat;

/// Version of the crate, exposed for embedders that log it alongside layout
/// diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export of the types and entry points most callers need.
pub mod prelude {
    pub use crate::algorithm::calculate;
    pub use crate::cache::MeasureMode;
    pub use crate::error::FlexError;
    pub use crate::logging::{LogLevel, Logger};
    pub use crate::node::{BaselineFunc, Config, DirtiedFunc, MeasureFunc, Node, NodeId};
    pub use crate::style::{
        Align, Direction, Display, FlexDirection, FlexWrap, JustifyContent, Overflow, PositionType, Style,
    };
    pub use crate::value::{Dim, Edge, OptionalFloat, Value};
}
