//! Arbor: a retained-mode 2D scene pipeline.
//!
//! Application code builds a tree of [`DisplayNode`]s every frame. Arbor
//! resolves declared geometry into absolute rects with stack and flex
//! layout, decides whether the frame needs a full repaint, a single
//! scissor-clipped repaint or nothing at all, and hands each visible node to
//! a [`DrawBackend`]. Painted rects are kept in paint order for hit-testing,
//! and a quadtree of node bounds is maintained for region queries.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Renderer`] - Retained state across frames
//! - [`DisplayNode`] - One node of the per-frame tree
//! - [`DrawBackend`] - Implemented by whatever paints pixels
//! - [`Measurer`] - Reports the natural size of auto-sized leaves
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Expanse, Edges)
//! - [`layout`] - Dimension resolution, stacks and the flex solver
//! - [`walker`] - The paint pass, culling and the hit list
//! - [`hash`] and [`damage`] - Change detection between frames
//! - [`spatial`] - The quadtree index
//! - [`testing`] - Recording backend and fixed measurers for tests

#![warn(missing_docs)]

pub use arbor_geom as geom;

pub mod damage;
pub mod dimension;
/// Colored tree dumps for debugging.
pub mod dump;
/// Error types.
pub mod error;
pub mod event;
pub mod hash;
pub mod layout;
pub mod measure;
pub mod node;
pub mod render;
pub mod renderer;
pub mod spatial;
pub mod stats;
pub mod style;
pub mod testing;
pub mod walker;

pub use dimension::Dimension;
pub use error::{Error, Result};
pub use event::EventKind;
pub use geom::{Edges, Expanse, Point, Rect};
pub use measure::Measurer;
pub use node::{DisplayNode, NodeKey, NodeKind, NodePath};
pub use render::DrawBackend;
pub use renderer::{FrameOutcome, Renderer, RendererConfig};
pub use stats::Diagnostics;
pub use style::Color;
