pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected grid dimension at construction time.
///
/// The engine never runs with a zero, negative, or absurd dimension; every
/// size goes through [`GridSize::new`](crate::GridSize::new) before a grid is
/// allocated.
#[derive(Debug, Clone, Copy, derive_more::Display, derive_more::Error)]
#[display(
    "grid dimension {rejected} outside supported range {}..={}",
    crate::core::grid::MIN_DIMENSION,
    crate::core::grid::MAX_DIMENSION
)]
pub struct SizeError {
    /// The offending width or height value.
    pub rejected: usize,
}
