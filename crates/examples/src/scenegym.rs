use arbor::{
    DisplayNode, Expanse, FrameOutcome, Renderer, RendererConfig, Result, dump::dump,
    stats::Diagnostics,
};
use clap::ValueEnum;
use tracing::info;

use crate::{canvas::CharCanvas, measure::TextMeasurer, scenes};

/// Pixels per canvas cell.
pub const CELL: Expanse = Expanse { w: 8, h: 16 };

/// Which scene to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scene {
    /// Header, sidebar, scrolling log and footer.
    #[default]
    Dashboard,
    /// Randomly recolored tiles.
    Mosaic,
}

impl Scene {
    /// Build the display list for a frame.
    pub fn build(self, frame: u64) -> Vec<DisplayNode> {
        match self {
            Self::Dashboard => scenes::dashboard(frame),
            // Recolor every fourth frame so the rest are skipped.
            Self::Mosaic => scenes::mosaic(frame / 4, 12, 8, 24),
        }
    }
}

/// A renderer wired to a text measurer and a character canvas.
pub struct SceneGym {
    /// The scene being driven.
    scene: Scene,
    /// Retained pipeline state.
    renderer: Renderer<TextMeasurer>,
    /// Drawing target.
    canvas: CharCanvas,
    /// Current target size in pixels.
    size: Expanse,
    /// Next frame number.
    frame: u64,
}

impl SceneGym {
    /// A gym drawing `scene` into a `size` pixel target.
    pub fn new(scene: Scene, size: Expanse, config: RendererConfig) -> Self {
        Self {
            scene,
            renderer: Renderer::with_measurer(config, TextMeasurer::default()),
            canvas: CharCanvas::new(size, CELL),
            size,
            frame: 0,
        }
    }

    /// Render the next frame.
    pub fn step(&mut self) -> Result<FrameOutcome> {
        let nodes = self.scene.build(self.frame);
        let outcome = self.renderer.render(nodes, self.size, &mut self.canvas)?;
        info!(frame = self.frame, ?outcome, "frame");
        self.frame += 1;
        Ok(outcome)
    }

    /// Change the target size. The next frame repaints fully.
    pub fn resize(&mut self, size: Expanse) {
        self.size = size;
        self.canvas.resize(size);
    }

    /// The pipeline.
    pub fn renderer(&self) -> &Renderer<TextMeasurer> {
        &self.renderer
    }

    /// The pipeline, mutably.
    pub fn renderer_mut(&mut self) -> &mut Renderer<TextMeasurer> {
        &mut self.renderer
    }

    /// The drawing target.
    pub fn canvas(&self) -> &CharCanvas {
        &self.canvas
    }

    /// Counters from the pipeline.
    pub fn diagnostics(&self) -> Diagnostics {
        self.renderer.perf_stats()
    }

    /// A colored tree dump of the last frame.
    pub fn dump(&mut self) -> Result<String> {
        let nodes = self.renderer.previous().map(<[_]>::to_vec).unwrap_or_default();
        dump(&nodes, self.size.rect(), self.renderer.measurer_mut())
    }
}
