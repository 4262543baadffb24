//! Read-only counters exposed to profiling and automation tooling.

use serde::Serialize;

use crate::spatial::SpatialStats;

/// How frames were rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// Unclipped repaints, including multi-region fallbacks.
    pub full_renders: u64,
    /// Scissor-clipped repaints of a single region.
    pub partial_renders: u64,
    /// Frames with nothing to draw.
    pub skipped_frames: u64,
}

/// Viewport culling results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CullStats {
    /// Nodes that passed the viewport test.
    pub rendered: u64,
    /// Nodes culled along with their subtrees.
    pub skipped: u64,
}

/// Lookups against a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0 with no lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Everything the pipeline counts, in one serializable snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Render decisions.
    pub render: RenderStats,
    /// Culling.
    pub cull: CullStats,
    /// Stack layout cache.
    pub layout_cache: CacheStats,
    /// Content hashes looked up by identity.
    pub hash_cache: CacheStats,
    /// Spatial index operations.
    pub spatial: SpatialStats,
    /// Entries in the hit list of the last frame.
    pub hit_list_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
        let s = CacheStats { hits: 3, misses: 1 };
        assert_eq!(s.hit_rate(), 0.75);
    }

    #[test]
    fn serializes() -> Result<(), serde_json::Error> {
        let d = Diagnostics {
            render: RenderStats {
                full_renders: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let v = serde_json::to_value(d)?;
        assert_eq!(v["render"]["full_renders"], 2);
        assert_eq!(v["spatial"]["total_items"], 0);
        Ok(())
    }
}
