//! The render walk: resolve, cull, clip, paint and record hits.

use std::collections::HashMap;

use arbor_geom::Rect;

use crate::{
    error::Result,
    hash::content_hash,
    layout::{self, resolve_rect},
    measure::Measurer,
    node::{DisplayNode, NodeKind, NodePath},
    render::DrawBackend,
    stats::{CacheStats, CullStats},
};

/// One painted node, in paint order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitEntry {
    /// Absolute rect the node was painted at.
    pub rect: Rect,
    /// Where the node sits in the display list.
    pub path: NodePath,
}

/// Cache key for a stack's child placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LayoutKey {
    /// Content hash of the stack itself.
    container: u64,
    /// Absolute rect of the stack.
    rect: Rect,
    /// Content hashes of the direct children.
    children: Vec<u64>,
}

/// Child rects of stack containers, remembered across frames.
///
/// Only direct children contribute to the key. A stack whose auto-sized
/// child changes size because of a grandchild edit will replay stale rects
/// until the next resize clears the cache. Placements not used during a
/// frame are dropped by [`LayoutCache::end_frame`].
#[derive(Debug, Default)]
pub struct LayoutCache {
    /// Cached placements and the frame each was last used in.
    map: HashMap<LayoutKey, (Vec<Rect>, u64)>,
    /// Current frame number.
    frame: u64,
    /// Lookup counters.
    stats: CacheStats,
}

impl LayoutCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Child rects of a stack, computed on a miss.
    pub fn stack_rects(
        &mut self,
        node: &DisplayNode,
        rect: Rect,
        measurer: &mut dyn Measurer,
    ) -> Result<Vec<Rect>> {
        let key = LayoutKey {
            container: content_hash(node),
            rect,
            children: node.children().iter().map(content_hash).collect(),
        };
        if let Some((rects, used)) = self.map.get_mut(&key) {
            self.stats.hits += 1;
            *used = self.frame;
            return Ok(rects.clone());
        }
        self.stats.misses += 1;
        let rects = layout::child_rects(node, rect, measurer)?;
        self.map.insert(key, (rects.clone(), self.frame));
        Ok(rects)
    }

    /// Drop placements not used this frame and start the next one.
    pub fn end_frame(&mut self) {
        let frame = self.frame;
        self.map.retain(|_, (_, used)| *used == frame);
        self.frame += 1;
    }

    /// Number of cached placements.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Lookup counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zero the lookup counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Forget every placement.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// A single paint pass over a display list.
///
/// Nodes are painted parents first. A node outside the active viewport is
/// skipped along with its whole subtree and never enters the hit list.
pub struct RenderWalker<'a> {
    /// Content measurer.
    measurer: &'a mut dyn Measurer,
    /// Drawing backend.
    backend: &'a mut dyn DrawBackend,
    /// Stack placement cache.
    layout_cache: &'a mut LayoutCache,
    /// Painted nodes, in paint order.
    hits: Vec<HitEntry>,
    /// Cull counters for this pass.
    cull: CullStats,
}

impl<'a> RenderWalker<'a> {
    /// A walker over borrowed collaborators and caches.
    pub fn new(
        measurer: &'a mut dyn Measurer,
        backend: &'a mut dyn DrawBackend,
        layout_cache: &'a mut LayoutCache,
    ) -> Self {
        Self {
            measurer,
            backend,
            layout_cache,
            hits: Vec::new(),
            cull: CullStats::default(),
        }
    }

    /// Walk `nodes` laid out inside `parent`, painting what intersects
    /// `viewport`.
    pub fn render(&mut self, nodes: &[DisplayNode], parent: Rect, viewport: Rect) -> Result<()> {
        let mut path = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            let rect = resolve_rect(node, parent, self.measurer)?;
            path.push(i);
            self.visit(node, rect, viewport, None, &mut path)?;
            path.pop();
        }
        Ok(())
    }

    /// The hit list and cull counters gathered so far.
    pub fn finish(self) -> (Vec<HitEntry>, CullStats) {
        (self.hits, self.cull)
    }

    /// Paint one node and descend.
    fn visit(
        &mut self,
        node: &DisplayNode,
        rect: Rect,
        viewport: Rect,
        clip: Option<Rect>,
        path: &mut Vec<usize>,
    ) -> Result<()> {
        if !rect.intersects(&viewport) {
            self.cull.skipped += 1;
            return Ok(());
        }
        self.cull.rendered += 1;
        self.hits.push(HitEntry {
            rect,
            path: NodePath::from(path.clone()),
        });
        self.backend.paint(node, rect, clip)?;

        let children = node.children();
        if children.is_empty() {
            return Ok(());
        }
        let (rects, viewport, clip) = match &node.kind {
            NodeKind::StackV { .. } | NodeKind::StackH { .. } => (
                self.layout_cache
                    .stack_rects(node, rect, self.measurer)?,
                viewport,
                clip,
            ),
            NodeKind::Scrollable { .. } => {
                let clip = match clip {
                    Some(outer) => match outer.intersect(&rect) {
                        Some(c) => c,
                        None => return Ok(()),
                    },
                    None => rect,
                };
                (
                    layout::child_rects(node, rect, self.measurer)?,
                    rect,
                    Some(clip),
                )
            }
            _ => (layout::child_rects(node, rect, self.measurer)?, viewport, clip),
        };
        for (i, (child, child_rect)) in children.iter().zip(rects).enumerate() {
            path.push(i);
            self.visit(child, child_rect, viewport, clip, path)?;
            path.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, measure::ZeroMeasurer, style::Color, testing::TestBackend};

    fn walk(
        nodes: &[DisplayNode],
        viewport: Rect,
        cache: &mut LayoutCache,
        backend: &mut TestBackend,
    ) -> Result<(Vec<HitEntry>, CullStats)> {
        let mut m = ZeroMeasurer;
        let mut w = RenderWalker::new(&mut m, backend, cache);
        w.render(nodes, viewport, viewport)?;
        Ok(w.finish())
    }

    fn keyed(name: &str, x: i32, y: i32, w: i32, h: i32) -> DisplayNode {
        DisplayNode::rect(Color::WHITE)
            .with_key(name)
            .at(x, y)
            .size(w, h)
    }

    #[test]
    fn culls_outside_viewport() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let nodes = vec![
            keyed("in", 10, 10, 20, 20),
            keyed("out", 500, 10, 20, 20),
            DisplayNode::container(vec![keyed("hidden", 0, 0, 5, 5)])
                .with_key("offscreen")
                .at(0, 400)
                .size(50, 50),
        ];
        let (hits, cull) = walk(&nodes, Rect::new(0, 0, 200, 200), &mut LayoutCache::new(), &mut backend)?;
        assert_eq!(cull, CullStats { rendered: 1, skipped: 2 });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path.to_string(), "0");
        assert_eq!(log.lock().unwrap().painted_keys(), vec!["in"]);
        Ok(())
    }

    #[test]
    fn scroll_shifts_and_clips() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let nodes = vec![DisplayNode::scrollable(
            50,
            300,
            vec![
                keyed("a", 0, 0, 100, 40),
                keyed("b", 0, 60, 100, 40),
                keyed("c", 0, 200, 100, 40),
            ],
        )
        .with_key("scroll")
        .size(100, 100)];
        let (hits, cull) = walk(&nodes, Rect::new(0, 0, 800, 600), &mut LayoutCache::new(), &mut backend)?;
        assert_eq!(cull, CullStats { rendered: 2, skipped: 2 });
        let log = log.lock().unwrap();
        assert_eq!(log.painted_keys(), vec!["scroll", "b"]);
        assert_eq!(log.rect_of("b"), Some(Rect::new(0, 10, 100, 40)));
        assert_eq!(log.clip_of("b"), Some(Some(Rect::new(0, 0, 100, 100))));
        assert_eq!(log.clip_of("scroll"), Some(None));
        assert_eq!(hits[1].path.to_string(), "0_1");
        Ok(())
    }

    #[test]
    fn nested_scroll_clips_intersect() -> Result<()> {
        let (log, mut backend) = TestBackend::create();
        let inner = DisplayNode::scrollable(0, 100, vec![keyed("leaf", 0, 0, 10, 10)])
            .with_key("inner")
            .at(50, 50)
            .size(100, 100);
        let nodes = vec![DisplayNode::scrollable(0, 200, vec![inner]).size(100, 100)];
        walk(&nodes, Rect::new(0, 0, 800, 600), &mut LayoutCache::new(), &mut backend)?;
        let log = log.lock().unwrap();
        assert_eq!(log.clip_of("inner"), Some(Some(Rect::new(0, 0, 100, 100))));
        assert_eq!(log.clip_of("leaf"), Some(Some(Rect::new(50, 50, 50, 50))));
        Ok(())
    }

    #[test]
    fn stack_layout_is_cached() -> Result<()> {
        let nodes = vec![
            DisplayNode::vstack(vec![keyed("a", 0, 0, 30, 10), keyed("b", 0, 0, 30, 10)])
                .size(100, 100),
        ];
        let mut cache = LayoutCache::new();
        let (log, mut backend) = TestBackend::create();
        walk(&nodes, Rect::new(0, 0, 800, 600), &mut cache, &mut backend)?;
        walk(&nodes, Rect::new(0, 0, 800, 600), &mut cache, &mut backend)?;
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.len(), 1);
        assert_eq!(log.lock().unwrap().rect_of("b"), Some(Rect::new(0, 10, 30, 10)));

        // Replayed rects are still culled against the current viewport.
        let (hits, cull) = walk(&nodes, Rect::new(0, 0, 800, 5), &mut cache, &mut backend)?;
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(cull.skipped, 1);
        cache.clear();
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn stack_cache_sees_keyed_edits() -> Result<()> {
        let list = |c| {
            vec![DisplayNode::vstack(vec![
                DisplayNode::rect(c).with_key("row").size(30, 10),
            ])
            .size(100, 100)]
        };
        let mut cache = LayoutCache::new();
        let (_, mut backend) = TestBackend::create();
        walk(&list(Color::WHITE), Rect::new(0, 0, 800, 600), &mut cache, &mut backend)?;
        walk(&list(Color::BLACK), Rect::new(0, 0, 800, 600), &mut cache, &mut backend)?;
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 2 });
        Ok(())
    }

    #[test]
    fn unused_placements_are_swept() -> Result<()> {
        let (_, mut backend) = TestBackend::create();
        let mut cache = LayoutCache::new();
        for i in 0..50 {
            let nodes = vec![
                DisplayNode::vstack(vec![keyed("row", 0, 0, 30, 10).with_revision(i)]).size(100, 100),
            ];
            walk(&nodes, Rect::new(0, 0, 800, 600), &mut cache, &mut backend)?;
            cache.end_frame();
        }
        assert_eq!(cache.len(), 1);
        cache.end_frame();
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn paint_errors_propagate() {
        let mut backend = TestBackend::failing("boom");
        let nodes = vec![keyed("a", 0, 0, 10, 10)];
        let err = walk(&nodes, Rect::new(0, 0, 100, 100), &mut LayoutCache::new(), &mut backend);
        assert_eq!(err.err(), Some(Error::Paint("boom".into())));
    }
}
