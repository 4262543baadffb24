//! A quadtree of node bounds, keyed by string id.

use std::collections::{HashMap, HashSet};

use arbor_geom::Rect;
use serde::{Deserialize, Serialize};

/// Quadtree tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadTreeConfig {
    /// World bounds. Items entirely outside are remembered but not indexed.
    pub bounds: Rect,
    /// Items a node holds before it splits.
    pub max_items: usize,
    /// Depth below which nodes stop splitting.
    pub max_depth: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0, 0, 4096, 4096),
            max_items: 8,
            max_depth: 6,
        }
    }
}

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpatialStats {
    /// Inserts, including replacements.
    pub inserts: u64,
    /// Successful removals.
    pub removes: u64,
    /// Queries.
    pub queries: u64,
    /// Dirty marks on known items.
    pub dirty_marks: u64,
    /// Items currently stored.
    pub total_items: usize,
    /// Items currently marked dirty.
    pub dirty_items: usize,
}

/// Closed-interval overlap, so zero-size rects on a quadrant edge still land
/// in a node. Results are filtered with [`Rect::intersects`].
fn touches(bounds: &Rect, rect: &Rect) -> bool {
    i64::from(rect.tl.x) <= bounds.right()
        && i64::from(bounds.tl.x) <= rect.right()
        && i64::from(rect.tl.y) <= bounds.bottom()
        && i64::from(bounds.tl.y) <= rect.bottom()
}

/// One quadrant.
#[derive(Debug)]
struct QuadNode {
    /// Area covered.
    bounds: Rect,
    /// Distance from the root.
    depth: usize,
    /// Items held here while this node is a leaf.
    items: Vec<(String, Rect)>,
    /// Quadrants once split: top-left, top-right, bottom-left, bottom-right.
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    /// An empty leaf.
    fn new(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    /// Insert into every leaf the rect touches. Returns false if the rect
    /// misses this node entirely.
    fn insert(&mut self, id: &str, rect: Rect, cfg: &QuadTreeConfig) -> bool {
        if !touches(&self.bounds, &rect) {
            return false;
        }
        if let Some(children) = self.children.as_mut() {
            for c in children.iter_mut() {
                c.insert(id, rect, cfg);
            }
            return true;
        }
        self.items.push((id.to_owned(), rect));
        if self.items.len() > cfg.max_items && self.depth < cfg.max_depth {
            self.subdivide(cfg);
        }
        true
    }

    /// Split into four quadrants and push held items down, duplicating any
    /// that span a boundary.
    fn subdivide(&mut self, cfg: &QuadTreeConfig) {
        let Rect { tl, w, h } = self.bounds;
        let (hw, hh) = (w / 2, h / 2);
        let mid_x = tl.x.saturating_add_unsigned(hw);
        let mid_y = tl.y.saturating_add_unsigned(hh);
        let d = self.depth + 1;
        let mut children = Box::new([
            Self::new(Rect::new(tl.x, tl.y, hw, hh), d),
            Self::new(Rect::new(mid_x, tl.y, w - hw, hh), d),
            Self::new(Rect::new(tl.x, mid_y, hw, h - hh), d),
            Self::new(Rect::new(mid_x, mid_y, w - hw, h - hh), d),
        ]);
        for (id, rect) in self.items.drain(..) {
            for c in children.iter_mut() {
                c.insert(&id, rect, cfg);
            }
        }
        self.children = Some(children);
    }

    /// Add ids whose rect intersects `rect`.
    fn query(&self, rect: &Rect, out: &mut HashSet<String>) {
        if !touches(&self.bounds, rect) {
            return;
        }
        for (id, r) in &self.items {
            if r.intersects(rect) {
                out.insert(id.clone());
            }
        }
        if let Some(children) = &self.children {
            for c in children.iter() {
                c.query(rect, out);
            }
        }
    }

    /// Drop every copy of `id`. Linear in the items of each visited node.
    fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|(i, _)| i != id);
        let mut found = self.items.len() != before;
        if let Some(children) = self.children.as_mut() {
            for c in children.iter_mut() {
                found |= c.remove(id);
            }
        }
        found
    }

    /// Count leaf entries, duplicates included.
    fn entries(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map_or(0, |c| c.iter().map(Self::entries).sum())
    }
}

/// Spatial index over string ids with dirty tracking.
#[derive(Debug)]
pub struct SpatialIndex {
    /// Tuning and world bounds.
    config: QuadTreeConfig,
    /// Quadtree root.
    root: QuadNode,
    /// Authoritative rect per id.
    rects: HashMap<String, Rect>,
    /// Ids needing redraw.
    dirty: HashSet<String>,
    /// Counters.
    stats: SpatialStats,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(QuadTreeConfig::default())
    }
}

impl SpatialIndex {
    /// An empty index.
    pub fn new(config: QuadTreeConfig) -> Self {
        Self {
            config,
            root: QuadNode::new(config.bounds, 0),
            rects: HashMap::new(),
            dirty: HashSet::new(),
            stats: SpatialStats::default(),
        }
    }

    /// Insert or replace an item.
    pub fn insert(&mut self, id: impl Into<String>, rect: Rect) {
        let id = id.into();
        if self.rects.contains_key(&id) {
            self.root.remove(&id);
        }
        self.root.insert(&id, rect, &self.config);
        self.rects.insert(id, rect);
        self.stats.inserts += 1;
    }

    /// Remove an item. Returns false if it was not present.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.rects.remove(id).is_none() {
            return false;
        }
        self.dirty.remove(id);
        self.root.remove(id);
        self.stats.removes += 1;
        true
    }

    /// Ids whose rect intersects `rect`.
    pub fn query(&mut self, rect: Rect) -> HashSet<String> {
        let mut out = HashSet::new();
        self.root.query(&rect, &mut out);
        self.stats.queries += 1;
        out
    }

    /// Mark a known item dirty.
    pub fn mark_dirty(&mut self, id: &str) {
        if self.rects.contains_key(id) {
            self.dirty.insert(id.to_owned());
            self.stats.dirty_marks += 1;
        }
    }

    /// Mark every item dirty.
    pub fn mark_all_dirty(&mut self) {
        self.dirty = self.rects.keys().cloned().collect();
    }

    /// Dirty items intersecting a viewport.
    pub fn dirty_in(&mut self, viewport: Rect) -> HashSet<String> {
        let visible = self.query(viewport);
        visible.intersection(&self.dirty).cloned().collect()
    }

    /// Clear every dirty flag.
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// The stored rect of an item.
    pub fn item_rect(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).copied()
    }

    /// Is `id` stored?
    pub fn contains(&self, id: &str) -> bool {
        self.rects.contains_key(id)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.root = QuadNode::new(self.config.bounds, 0);
        self.rects.clear();
        self.dirty.clear();
    }

    /// Rebuild with new world bounds, keeping every item.
    pub fn rebuild(&mut self, bounds: Rect) {
        self.config.bounds = bounds;
        self.root = QuadNode::new(bounds, 0);
        for (id, rect) in &self.rects {
            self.root.insert(id, *rect, &self.config);
        }
    }

    /// World bounds.
    pub fn bounds(&self) -> Rect {
        self.config.bounds
    }

    /// Leaf entries, counting items that span quadrants once per quadrant.
    pub fn entry_count(&self) -> usize {
        self.root.entries()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> SpatialStats {
        SpatialStats {
            total_items: self.rects.len(),
            dirty_items: self.dirty.len(),
            ..self.stats
        }
    }

    /// Zero the operation counters.
    pub fn reset_stats(&mut self) {
        self.stats = SpatialStats::default();
    }
}
