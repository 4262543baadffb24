use std::sync::{Arc, Mutex, MutexGuard};

use arbor_geom::Rect;

use crate::{
    error::{Error, Result},
    node::DisplayNode,
    render::DrawBackend,
};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintOp {
    /// A node was painted.
    Paint {
        /// Kind name of the node.
        kind: &'static str,
        /// Identity name, if any.
        key: Option<String>,
        /// Resolved rect.
        rect: Rect,
        /// Active scroll clip.
        clip: Option<Rect>,
    },
    /// The scissor region changed.
    Scissor(Option<Rect>),
    /// A region was cleared.
    Clear(Option<Rect>),
    /// The frame was presented.
    Present,
}

/// Calls captured by a [`TestBackend`].
#[derive(Debug, Default)]
pub struct PaintLog {
    /// Captured calls, in order.
    pub ops: Vec<PaintOp>,
}

impl PaintLog {
    /// Return true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of paint calls.
    pub fn paint_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, PaintOp::Paint { .. }))
            .count()
    }

    /// Identity names of painted nodes, in paint order. Unkeyed nodes are
    /// skipped.
    pub fn painted_keys(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Paint { key, .. } => key.clone(),
                _ => None,
            })
            .collect()
    }

    /// The rect a keyed node was last painted at.
    pub fn rect_of(&self, name: &str) -> Option<Rect> {
        self.ops.iter().rev().find_map(|op| match op {
            PaintOp::Paint { key, rect, .. } if key.as_deref() == Some(name) => Some(*rect),
            _ => None,
        })
    }

    /// The clip a keyed node was last painted with.
    pub fn clip_of(&self, name: &str) -> Option<Option<Rect>> {
        self.ops.iter().rev().find_map(|op| match op {
            PaintOp::Paint { key, clip, .. } if key.as_deref() == Some(name) => Some(*clip),
            _ => None,
        })
    }

    /// Regions passed to `clear`.
    pub fn clears(&self) -> Vec<Option<Rect>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Clear(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// Regions passed to `set_scissor`.
    pub fn scissors(&self) -> Vec<Option<Rect>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Scissor(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

/// A drawing backend for testing, which logs every call.
pub struct TestBackend {
    /// Shared log of captured calls.
    pub log: Arc<Mutex<PaintLog>>,
    /// When set, `paint` fails with this message.
    fail_paint: Option<String>,
    /// When set, scissor, clear and present fail with this message.
    fail_device: Option<String>,
    /// Number of cache invalidations received.
    pub invalidations: usize,
}

impl TestBackend {
    /// Create returns a `PaintLog` protected by a mutex, and a `TestBackend`
    /// instance writing to it.
    pub fn create() -> (Arc<Mutex<PaintLog>>, Self) {
        let log = Arc::new(Mutex::new(PaintLog::default()));
        let backend = Self {
            log: Arc::clone(&log),
            fail_paint: None,
            fail_device: None,
            invalidations: 0,
        };
        (log, backend)
    }

    /// A backend whose `paint` always fails.
    pub fn failing(message: impl Into<String>) -> Self {
        let (_, mut backend) = Self::create();
        backend.fail_paint = Some(message.into());
        backend
    }

    /// A backend whose scissor, clear and present calls always fail.
    pub fn unavailable(message: impl Into<String>) -> Self {
        let (_, mut backend) = Self::create();
        backend.fail_device = Some(message.into());
        backend
    }

    /// Lock the log, recovering from poisoning.
    pub fn lock(&self) -> MutexGuard<'_, PaintLog> {
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Forget captured calls.
    pub fn reset(&self) {
        self.lock().ops.clear();
    }

    /// Record a call, failing first if the device is unavailable.
    fn device(&self, op: PaintOp) -> Result<()> {
        if let Some(msg) = &self.fail_device {
            return Err(Error::Backend(msg.clone()));
        }
        self.push(op)
    }

    /// Record a call.
    fn push(&self, op: PaintOp) -> Result<()> {
        self.log
            .lock()
            .map_err(|_| Error::Internal("paint log poisoned".into()))?
            .ops
            .push(op);
        Ok(())
    }
}

impl DrawBackend for TestBackend {
    fn paint(&mut self, node: &DisplayNode, rect: Rect, clip: Option<Rect>) -> Result<()> {
        if let Some(msg) = &self.fail_paint {
            return Err(Error::Paint(msg.clone()));
        }
        self.push(PaintOp::Paint {
            kind: node.kind.name(),
            key: node.key_name().map(str::to_owned),
            rect,
            clip,
        })
    }

    fn set_scissor(&mut self, region: Option<Rect>) -> Result<()> {
        self.device(PaintOp::Scissor(region))
    }

    fn clear(&mut self, region: Option<Rect>) -> Result<()> {
        self.device(PaintOp::Clear(region))
    }

    fn present(&mut self) -> Result<()> {
        self.device(PaintOp::Present)
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
    }
}
