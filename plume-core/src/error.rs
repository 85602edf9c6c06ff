use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Structural errors raised while building or reconfiguring a model.
///
/// Physical parameters are never range-checked; only shapes that would make
/// the grid routines index out of bounds are rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("grid must have at least one cell per axis, got {nx}x{ny}")]
    EmptyGrid { nx: usize, ny: usize },

    #[error("reflective boundary needs at least 2 cells per axis, got {nx}x{ny}")]
    ReflectiveTooSmall { nx: usize, ny: usize },

    #[error("velocity field has {actual} cells, expected {expected}")]
    VelocityShape { expected: usize, actual: usize },

    #[error("unknown boundary mode '{0}' (expected open, periodic or reflective)")]
    UnknownBoundary(String),
}
