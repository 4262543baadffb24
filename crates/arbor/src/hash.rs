//! Content and structural hashing of display nodes.
//!
//! Every payload type hashes its typed fields directly; floats go in by bit
//! pattern and image providers by their opaque handle. Nothing here can fail.

use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
};

use crate::node::{DisplayNode, NodeKey, NodeKind};

/// Hash of everything about a node except its children.
pub fn content_hash(node: &DisplayNode) -> u64 {
    let mut h = DefaultHasher::new();
    node.kind.tag().hash(&mut h);
    node.geometry.hash(&mut h);
    node.padding.hash(&mut h);
    node.margin.hash(&mut h);
    node.key.hash(&mut h);
    node.listen.hash(&mut h);
    node.flex.hash(&mut h);
    node.background.hash(&mut h);
    match &node.kind {
        NodeKind::Container { .. } | NodeKind::StackV { .. } | NodeKind::StackH { .. } => {}
        NodeKind::Scrollable {
            scroll_y,
            content_height,
            ..
        } => {
            scroll_y.hash(&mut h);
            content_height.hash(&mut h);
        }
        NodeKind::Flex { style, .. } => style.hash(&mut h),
        NodeKind::Rect(s) => s.hash(&mut h),
        NodeKind::Text(t) => t.hash(&mut h),
        NodeKind::Image(i) => i.hash(&mut h),
        NodeKind::Input(i) => i.hash(&mut h),
        NodeKind::VectorPath(v) => v.hash(&mut h),
    }
    h.finish()
}

/// Whole-tree hash over identity, kind, declared geometry and children.
/// Style and content changes leave it untouched.
pub fn structural_hash(nodes: &[DisplayNode]) -> u64 {
    let mut h = DefaultHasher::new();
    nodes.len().hash(&mut h);
    for node in nodes {
        node_structure(node).hash(&mut h);
    }
    h.finish()
}

/// Structural hash of one subtree.
fn node_structure(node: &DisplayNode) -> u64 {
    let mut h = DefaultHasher::new();
    node.key.as_ref().map(|k| &k.name).hash(&mut h);
    node.kind.tag().hash(&mut h);
    node.geometry.hash(&mut h);
    structural_hash(node.children()).hash(&mut h);
    h.finish()
}

/// Last-frame content hashes of keyed nodes, one entry per identity name.
///
/// Hashes are written with [`HashCache::refresh`] while walking the new tree
/// and read back with [`HashCache::remembered`] when that tree becomes the
/// previous one. The new tree is always hashed fresh, so a keyed node whose
/// content changed at an unchanged revision still compares unequal.
/// Entries not refreshed during a frame are dropped by
/// [`HashCache::end_frame`].
#[derive(Debug, Default)]
pub struct HashCache {
    /// Latest entry per identity name.
    map: HashMap<String, Remembered>,
    /// Current frame number.
    frame: u64,
    /// Lookups answered from the map.
    hits: u64,
    /// Lookups that had to hash.
    misses: u64,
}

/// One remembered hash.
#[derive(Debug, Clone, Copy)]
struct Remembered {
    /// Revision of the node the hash was taken from.
    revision: u64,
    /// The hash, or `None` when two nodes with the same name disagreed.
    hash: Option<u64>,
    /// Frame the entry was written in.
    frame: u64,
}

impl HashCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content hash of a node from the previous frame, from the cache when
    /// its identity and revision match what was recorded.
    pub fn remembered(&mut self, node: &DisplayNode) -> u64 {
        let Some(key) = &node.key else {
            return content_hash(node);
        };
        match self.map.get(&key.name) {
            Some(Remembered {
                revision,
                hash: Some(h),
                ..
            }) if *revision == key.revision => {
                self.hits += 1;
                *h
            }
            _ => {
                self.misses += 1;
                content_hash(node)
            }
        }
    }

    /// Hash a node of the current frame and record it under its identity.
    pub fn refresh(&mut self, node: &DisplayNode) -> u64 {
        let h = content_hash(node);
        let Some(NodeKey { name, revision }) = &node.key else {
            return h;
        };
        let frame = self.frame;
        let entry = Remembered {
            revision: *revision,
            hash: Some(h),
            frame,
        };
        match self.map.get_mut(name) {
            Some(prev) if prev.frame == frame => {
                if prev.revision != *revision || prev.hash != Some(h) {
                    prev.hash = None;
                }
            }
            Some(prev) => *prev = entry,
            None => {
                self.map.insert(name.clone(), entry);
            }
        }
        h
    }

    /// Drop entries that were not refreshed this frame and start the next
    /// one.
    pub fn end_frame(&mut self) {
        let frame = self.frame;
        self.map.retain(|_, e| e.frame == frame);
        self.frame += 1;
    }

    /// Number of cached hashes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Cache hits and misses so far.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Zero the hit and miss counters.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Forget every cached hash.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}
