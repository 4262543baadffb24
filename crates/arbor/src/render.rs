//! The drawing collaborator.

use arbor_geom::Rect;

use crate::{error::Result, node::DisplayNode};

/// The trait implemented by drawing backends.
///
/// The pipeline decides which node to paint where; the backend owns every
/// pixel operation. Calls arrive in paint order, parents before children.
pub trait DrawBackend {
    /// Paint a single node into its resolved rect. `clip` is the active
    /// scroll clip, if the node sits inside a scrollable container.
    fn paint(&mut self, node: &DisplayNode, rect: Rect, clip: Option<Rect>) -> Result<()>;

    /// Restrict all following output to a region, or lift the restriction.
    fn set_scissor(&mut self, region: Option<Rect>) -> Result<()>;

    /// Clear a region, or the whole target.
    fn clear(&mut self, region: Option<Rect>) -> Result<()>;

    /// Present the finished frame.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }

    /// Drop any cached textures or glyphs. Called when the render target
    /// resizes.
    fn invalidate(&mut self) {}
}
