//! The content-measurement collaborator.

use std::collections::HashMap;

use arbor_geom::Expanse;

use crate::{error::Result, hash::content_hash, node::DisplayNode};

/// Reports the natural size of a node whose width or height is `Auto`.
///
/// Implementations typically handle text, images and inputs; container kinds
/// are sized by the layout engine and only reach the measurer if a caller asks
/// directly. Errors are not caught by the pipeline.
pub trait Measurer {
    /// Natural size of `node` given the space available to it.
    fn measure(
        &mut self,
        node: &DisplayNode,
        available_width: u32,
        available_height: u32,
    ) -> Result<Expanse>;

    /// Drop any cached measurements. Called when the render target resizes.
    fn invalidate(&mut self) {}

    /// Called after every successful frame.
    fn end_frame(&mut self) {}
}

impl<F> Measurer for F
where
    F: FnMut(&DisplayNode, u32, u32) -> Result<Expanse>,
{
    fn measure(
        &mut self,
        node: &DisplayNode,
        available_width: u32,
        available_height: u32,
    ) -> Result<Expanse> {
        self(node, available_width, available_height)
    }
}

/// A measurer that reports zero size for everything. Used when no measurer is
/// installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroMeasurer;

impl Measurer for ZeroMeasurer {
    fn measure(&mut self, _node: &DisplayNode, _w: u32, _h: u32) -> Result<Expanse> {
        Ok(Expanse::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Cache key for keyed measurements.
struct MeasureKey {
    /// Identity name.
    name: String,
    /// Content hash of the node.
    content: u64,
    /// Available width.
    width: u32,
    /// Available height.
    height: u32,
}

/// Wraps a measurer with a cache for keyed nodes.
///
/// Entries are keyed by the node's identity name, its content hash and the
/// available space. Unkeyed nodes always go to the inner measurer. Entries
/// not used during a frame are dropped at the end of it.
pub struct CachingMeasurer<M> {
    /// The wrapped measurer.
    inner: M,
    /// Cached results and the frame each was last used in.
    cache: HashMap<MeasureKey, (Expanse, u64)>,
    /// Current frame number.
    frame: u64,
    /// Lookups answered from the cache.
    hits: u64,
}

impl<M: Measurer> CachingMeasurer<M> {
    /// Wrap a measurer.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
            frame: 0,
            hits: 0,
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Lookups answered from the cache so far.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// The wrapped measurer.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: Measurer> Measurer for CachingMeasurer<M> {
    fn measure(
        &mut self,
        node: &DisplayNode,
        available_width: u32,
        available_height: u32,
    ) -> Result<Expanse> {
        let Some(key) = node.key.as_ref() else {
            return self.inner.measure(node, available_width, available_height);
        };
        let key = MeasureKey {
            name: key.name.clone(),
            content: content_hash(node),
            width: available_width,
            height: available_height,
        };
        if let Some((size, used)) = self.cache.get_mut(&key) {
            self.hits += 1;
            *used = self.frame;
            return Ok(*size);
        }
        let size = self
            .inner
            .measure(node, available_width, available_height)?;
        self.cache.insert(key, (size, self.frame));
        Ok(size)
    }

    fn invalidate(&mut self) {
        self.cache.clear();
        self.inner.invalidate();
    }

    fn end_frame(&mut self) {
        let frame = self.frame;
        self.cache.retain(|_, (_, used)| *used == frame);
        self.frame += 1;
        self.inner.end_frame();
    }
}
