//! Small and mostly local: programmer errors are `Constraint` violations,
//! everything else about bad input is a silent clamp handled inline rather
//! than surfaced as an error.

#[derive(Debug, thiserror::Error)]
pub enum FlexError {
    /// A programmer error: measure func set on a node with children,
    /// negative point-scale-factor, reset on a node with children/parent.
    /// Not recoverable — callers should treat this as a bug to fix, not a
    /// condition to handle.
    #[error("constraint violation: {0}")]
    Constraint(String),
}
