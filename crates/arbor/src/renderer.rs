//! The frame pipeline: decide, paint, index.
//!
//! Each call to [`Renderer::render`] takes a freshly built display list and
//! the current target size, and runs in a fixed order:
//!
//! 1. On a size change, every cache is dropped and the frame is forced full.
//! 2. In incremental mode the list is diffed against the previous frame and
//!    the dirty rects are merged. No regions skips the frame, one region is
//!    repainted under a scissor, and anything else falls back to a full
//!    repaint.
//! 3. The walker paints and rebuilds the hit list.
//! 4. The spatial index is rebuilt if the tree's structure changed.
//! 5. Cache entries not used by this frame are dropped.

use std::mem;

use arbor_geom::{Expanse, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{
    damage,
    error::Result,
    event::EventKind,
    hash::{HashCache, structural_hash},
    layout,
    measure::{Measurer, ZeroMeasurer},
    node::{DisplayNode, NodePath},
    render::DrawBackend,
    spatial::{QuadTreeConfig, SpatialIndex},
    stats::{CacheStats, CullStats, Diagnostics, RenderStats},
    walker::{HitEntry, LayoutCache, RenderWalker},
};

/// Renderer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Diff frames and repaint only what changed.
    pub incremental: bool,
    /// Dirty rects collapse into their bounding box when it costs no more
    /// than this multiple of their summed area.
    pub merge_ratio: f64,
    /// World bounds of the spatial index.
    pub index_bounds: Rect,
    /// Items per quadtree node before it splits.
    pub index_max_items: usize,
    /// Maximum quadtree depth.
    pub index_max_depth: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        let q = QuadTreeConfig::default();
        Self {
            incremental: false,
            merge_ratio: 2.0,
            index_bounds: q.bounds,
            index_max_items: q.max_items,
            index_max_depth: q.max_depth,
        }
    }
}

impl RendererConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// The spatial index settings.
    pub fn quadtree(&self) -> QuadTreeConfig {
        QuadTreeConfig {
            bounds: self.index_bounds,
            max_items: self.index_max_items,
            max_depth: self.index_max_depth,
        }
    }
}

/// What a call to [`Renderer::render`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The whole target was cleared and repainted.
    Full,
    /// One region was cleared and repainted under a scissor.
    Partial(Rect),
    /// Nothing changed; no draw calls were made.
    Skipped,
}

/// Retained state across frames.
pub struct Renderer<M: Measurer = ZeroMeasurer> {
    /// Settings.
    config: RendererConfig,
    /// Content measurer.
    measurer: M,
    /// The last rendered display list.
    previous: Option<Vec<DisplayNode>>,
    /// Target size of the last frame.
    size: Option<Expanse>,
    /// Structural hash the spatial index was built from.
    structure: Option<u64>,
    /// Content hashes by identity.
    hashes: HashCache,
    /// Stack placements.
    layout_cache: LayoutCache,
    /// Node bounds, keyed by path.
    index: SpatialIndex,
    /// Painted nodes of the last painted frame.
    hits: Vec<HitEntry>,
    /// Regions queued by `mark_dirty`.
    pending: Vec<Rect>,
    /// Force the next frame to repaint fully.
    force_full: bool,
    /// Render decisions.
    render_stats: RenderStats,
    /// Accumulated culling results.
    cull: CullStats,
}

impl Renderer<ZeroMeasurer> {
    /// A renderer whose auto-sized leaves measure as zero.
    pub fn new(config: RendererConfig) -> Self {
        Self::with_measurer(config, ZeroMeasurer)
    }
}

impl Default for Renderer<ZeroMeasurer> {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl<M: Measurer> Renderer<M> {
    /// A renderer using `measurer` for auto-sized nodes.
    pub fn with_measurer(config: RendererConfig, measurer: M) -> Self {
        let index = SpatialIndex::new(config.quadtree());
        Self {
            config,
            measurer,
            previous: None,
            size: None,
            structure: None,
            hashes: HashCache::new(),
            layout_cache: LayoutCache::new(),
            index,
            hits: Vec::new(),
            pending: Vec::new(),
            force_full: false,
            render_stats: RenderStats::default(),
            cull: CullStats::default(),
        }
    }

    /// Render one frame of `nodes` into a target of `size`.
    ///
    /// Collaborator errors propagate unchanged. A failed frame leaves the
    /// previous tree in place and forces the next frame to repaint fully.
    pub fn render(
        &mut self,
        nodes: Vec<DisplayNode>,
        size: Expanse,
        backend: &mut dyn DrawBackend,
    ) -> Result<FrameOutcome> {
        let result = self.frame(nodes, size, backend);
        if result.is_err() {
            // Hashes recorded for the failed tree do not describe `previous`.
            self.hashes.clear();
            self.force_full = true;
        }
        result
    }

    /// One frame, without failure recovery.
    fn frame(
        &mut self,
        nodes: Vec<DisplayNode>,
        size: Expanse,
        backend: &mut dyn DrawBackend,
    ) -> Result<FrameOutcome> {
        let target = Rect::from(size);
        let resized = self.size.is_some_and(|s| s != size);
        if resized {
            self.invalidate(backend);
        }
        self.size = Some(size);

        let outcome = self.decide(&nodes, target, resized)?;
        match outcome {
            FrameOutcome::Skipped => {
                self.render_stats.skipped_frames += 1;
            }
            FrameOutcome::Full => {
                backend.clear(None)?;
                self.walk(&nodes, target, backend)?;
                backend.present()?;
                self.render_stats.full_renders += 1;
            }
            FrameOutcome::Partial(region) => {
                backend.set_scissor(Some(region))?;
                backend.clear(Some(region))?;
                self.walk(&nodes, target, backend)?;
                backend.set_scissor(None)?;
                backend.present()?;
                self.render_stats.partial_renders += 1;
            }
        }
        debug!(?outcome, hits = self.hits.len(), "frame rendered");

        self.refresh_index(&nodes, target)?;
        self.previous = Some(nodes);
        self.force_full = false;
        if outcome != FrameOutcome::Skipped {
            self.layout_cache.end_frame();
        }
        self.hashes.end_frame();
        self.measurer.end_frame();
        Ok(outcome)
    }

    /// Choose how to paint this frame.
    fn decide(&mut self, nodes: &[DisplayNode], target: Rect, resized: bool) -> Result<FrameOutcome> {
        let pending = mem::take(&mut self.pending);
        if resized || self.force_full || !self.config.incremental {
            return Ok(FrameOutcome::Full);
        }
        let Some(previous) = &self.previous else {
            return Ok(FrameOutcome::Full);
        };
        let mut dirty = damage::diff(
            nodes,
            previous,
            target,
            &mut self.hashes,
            &mut self.measurer,
        )?;
        dirty.extend(pending);
        let regions = damage::merge(&dirty, self.config.merge_ratio);
        trace!(dirty = dirty.len(), regions = regions.len(), "dirty regions merged");
        Ok(match regions.as_slice() {
            [] => FrameOutcome::Skipped,
            [region] => match region.intersect(&target) {
                Some(r) => FrameOutcome::Partial(r),
                None => FrameOutcome::Skipped,
            },
            _ => FrameOutcome::Full,
        })
    }

    /// Paint `nodes` and replace the hit list.
    fn walk(&mut self, nodes: &[DisplayNode], target: Rect, backend: &mut dyn DrawBackend) -> Result<()> {
        let mut walker = RenderWalker::new(
            &mut self.measurer,
            backend,
            &mut self.layout_cache,
        );
        walker.render(nodes, target, target)?;
        let (hits, cull) = walker.finish();
        trace!(rendered = cull.rendered, skipped = cull.skipped, "culling");
        self.hits = hits;
        self.cull.rendered += cull.rendered;
        self.cull.skipped += cull.skipped;
        Ok(())
    }

    /// Drop every cache after a target resize.
    fn invalidate(&mut self, backend: &mut dyn DrawBackend) {
        info!(
            layouts = self.layout_cache.len(),
            hashes = self.hashes.len(),
            items = self.index.len(),
            "target resized, dropping caches"
        );
        self.layout_cache.clear();
        self.hashes.clear();
        self.index.clear();
        self.structure = None;
        self.measurer.invalidate();
        backend.invalidate();
    }

    /// Rebuild the spatial index if the tree's structure changed.
    fn refresh_index(&mut self, nodes: &[DisplayNode], target: Rect) -> Result<()> {
        let h = structural_hash(nodes);
        if self.structure == Some(h) {
            return Ok(());
        }
        self.index.clear();
        let index = &mut self.index;
        layout::for_each_rect(nodes, target, &mut self.measurer, &mut |path, _, rect| {
            index.insert(NodePath::from(path.to_vec()).to_string(), rect);
        })?;
        self.structure = Some(h);
        debug!(items = self.index.len(), "spatial index rebuilt");
        Ok(())
    }

    /// Queue a region for the next frame, or force a full repaint with
    /// `None`.
    pub fn mark_dirty(&mut self, region: Option<Rect>) {
        match region {
            Some(r) => self.pending.push(r),
            None => self.force_full = true,
        }
    }

    /// Turn incremental repaint on or off. Either way the next frame is
    /// painted fully.
    pub fn set_incremental(&mut self, enabled: bool) {
        self.config.incremental = enabled;
        self.force_full = true;
    }

    /// The stack placement cache.
    pub fn layout_cache(&self) -> &LayoutCache {
        &self.layout_cache
    }

    /// Content hashes remembered from the last frame.
    pub fn hash_cache(&self) -> &HashCache {
        &self.hashes
    }

    /// Is incremental repaint on?
    pub fn incremental(&self) -> bool {
        self.config.incremental
    }

    /// Current settings.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The measurer.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// The measurer, mutably.
    pub fn measurer_mut(&mut self) -> &mut M {
        &mut self.measurer
    }

    /// The last rendered display list.
    pub fn previous(&self) -> Option<&[DisplayNode]> {
        self.previous.as_deref()
    }

    /// Raw hit entries of the last painted frame, in paint order.
    pub fn hit_entries(&self) -> &[HitEntry] {
        &self.hits
    }

    /// Painted rects and nodes of the last painted frame, in paint order.
    pub fn hit_list(&self) -> Vec<(Rect, &DisplayNode)> {
        let nodes = self.previous.as_deref().unwrap_or_default();
        self.hits
            .iter()
            .filter_map(|e| e.path.resolve(nodes).map(|n| (e.rect, n)))
            .collect()
    }

    /// The topmost painted node at a point that listens for `kind`.
    pub fn find_target(&self, x: i32, y: i32, kind: EventKind) -> Option<&DisplayNode> {
        let nodes = self.previous.as_deref()?;
        self.hits
            .iter()
            .rev()
            .filter(|e| e.rect.contains_point((x, y)))
            .filter_map(|e| e.path.resolve(nodes))
            .find(|n| n.listens_for(kind))
    }

    /// Nodes whose indexed rect intersects `rect`, in tree order. Culled
    /// nodes are included.
    pub fn nodes_in(&mut self, rect: Rect) -> Vec<(NodePath, &DisplayNode)> {
        let ids = self.index.query(rect);
        let nodes = self.previous.as_deref().unwrap_or_default();
        let mut paths: Vec<NodePath> = ids.iter().filter_map(|id| NodePath::parse(id)).collect();
        paths.sort_by(|a, b| a.indices().cmp(b.indices()));
        paths
            .into_iter()
            .filter_map(|p| {
                let n = p.resolve(nodes)?;
                Some((p, n))
            })
            .collect()
    }

    /// The spatial index.
    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// The spatial index, mutably, for dirty tracking by external tools.
    pub fn spatial_index_mut(&mut self) -> &mut SpatialIndex {
        &mut self.index
    }

    /// Render decision counters.
    pub fn stats(&self) -> RenderStats {
        self.render_stats
    }

    /// Every counter in one snapshot.
    pub fn perf_stats(&self) -> Diagnostics {
        let (hits, misses) = self.hashes.stats();
        Diagnostics {
            render: self.render_stats,
            cull: self.cull,
            layout_cache: self.layout_cache.stats(),
            hash_cache: CacheStats { hits, misses },
            spatial: self.index.stats(),
            hit_list_len: self.hits.len(),
        }
    }

    /// Zero every counter. Cached data is kept.
    pub fn reset_stats(&mut self) {
        self.render_stats = RenderStats::default();
        self.cull = CullStats::default();
        self.layout_cache.reset_stats();
        self.hashes.reset_stats();
        self.index.reset_stats();
    }

    /// The last rendered display list as JSON. Image bytes and handles are
    /// replaced by placeholders.
    pub fn last_display_list_json(&self) -> Result<serde_json::Value> {
        let nodes = self.previous.as_deref().unwrap_or_default();
        Ok(serde_json::to_value(nodes)?)
    }
}
