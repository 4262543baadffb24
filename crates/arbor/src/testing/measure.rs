use std::collections::HashMap;

use arbor_geom::Expanse;

use crate::{error::Result, measure::Measurer, node::DisplayNode};

/// A measurer returning a fixed size, with per-key overrides.
#[derive(Debug, Clone, Default)]
pub struct FixedMeasurer {
    /// Size reported for nodes without an override.
    size: Expanse,
    /// Sizes for specific identity names.
    overrides: HashMap<String, Expanse>,
    /// Number of `measure` calls received.
    pub calls: usize,
    /// Number of invalidations received.
    pub invalidations: usize,
}

impl FixedMeasurer {
    /// Report `size` for every node.
    pub fn new(size: Expanse) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Report `size` for nodes keyed `name`.
    pub fn with(mut self, name: impl Into<String>, size: Expanse) -> Self {
        self.overrides.insert(name.into(), size);
        self
    }
}

impl Measurer for FixedMeasurer {
    fn measure(&mut self, node: &DisplayNode, _w: u32, _h: u32) -> Result<Expanse> {
        self.calls += 1;
        Ok(node
            .key_name()
            .and_then(|k| self.overrides.get(k))
            .copied()
            .unwrap_or(self.size))
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
    }
}
