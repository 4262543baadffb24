//! Collaborator doubles for exercising the pipeline without a real
//! drawing surface or font stack.

/// Recording drawing backend.
pub mod backend;
/// Deterministic measurers.
pub mod measure;

pub use backend::{PaintLog, PaintOp, TestBackend};
pub use measure::FixedMeasurer;
