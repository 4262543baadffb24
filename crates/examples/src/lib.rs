//! Example scenes and collaborators used by arbor demos.

/// A character-grid drawing backend.
pub mod canvas;
/// A text measurer based on display columns.
pub mod measure;
/// Demo display lists.
pub mod scenes;
/// A renderer wired to the example collaborators.
pub mod scenegym;
