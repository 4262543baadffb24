use arbor::{
    DisplayNode, DrawBackend, Expanse, NodeKind, Rect, Result, node::ImageSource,
};
use tracing::{debug, trace};
use unicode_width::UnicodeWidthChar;

/// Draw call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanvasStats {
    /// Nodes painted.
    pub paints: u64,
    /// Regions cleared.
    pub clears: u64,
    /// Frames presented.
    pub frames: u64,
    /// Cache invalidations.
    pub invalidations: u64,
}

/// A drawing backend that rasterizes nodes into a grid of characters.
///
/// Each cell stands for `cell` pixels. A cell is drawn when its center lies
/// inside the node's rect, the active clip and the active scissor.
#[derive(Debug)]
pub struct CharCanvas {
    /// Pixels per cell.
    cell: Expanse,
    /// Grid size in cells.
    size: Expanse,
    /// Row-major cell contents.
    cells: Vec<char>,
    /// Active scissor, in pixels.
    scissor: Option<Rect>,
    /// Counters.
    stats: CanvasStats,
}

impl CharCanvas {
    /// A blank canvas covering `target` pixels at `cell` pixels per cell.
    pub fn new(target: Expanse, cell: Expanse) -> Self {
        let cell = Expanse::new(cell.w.max(1), cell.h.max(1));
        let size = Expanse::new(target.w / cell.w, target.h / cell.h);
        Self {
            cell,
            size,
            cells: vec![' '; size.area() as usize],
            scissor: None,
            stats: CanvasStats::default(),
        }
    }

    /// Resize the grid for a new target, blanking it.
    pub fn resize(&mut self, target: Expanse) {
        self.size = Expanse::new(target.w / self.cell.w, target.h / self.cell.h);
        self.cells = vec![' '; self.size.area() as usize];
    }

    /// Grid size in cells.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// Counters.
    pub fn stats(&self) -> CanvasStats {
        self.stats
    }

    /// The character at a cell.
    pub fn get(&self, x: u32, y: u32) -> Option<char> {
        if x >= self.size.w || y >= self.size.h {
            return None;
        }
        self.cells.get((y * self.size.w + x) as usize).copied()
    }

    /// The grid as text, one line per row, trailing blanks trimmed.
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(self.size.w.max(1) as usize) {
            let line: String = row.iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    /// Pixel center of a cell.
    fn center(&self, x: u32, y: u32) -> (i32, i32) {
        (
            (x * self.cell.w + self.cell.w / 2) as i32,
            (y * self.cell.h + self.cell.h / 2) as i32,
        )
    }

    /// Cell range along one axis that may have centers inside `[lo, hi)`.
    fn span(lo: i64, hi: i64, cell: u32, cells: u32) -> (u32, u32) {
        let c = i64::from(cell);
        let start = (lo / c).clamp(0, i64::from(cells)) as u32;
        let end = ((hi + c - 1) / c).clamp(0, i64::from(cells)) as u32;
        (start, end)
    }

    /// Visit every cell whose center lies in `region`.
    fn cells_in(&self, region: Rect, f: &mut dyn FnMut(u32, u32)) {
        let (x0, x1) = Self::span(i64::from(region.tl.x), region.right(), self.cell.w, self.size.w);
        let (y0, y1) = Self::span(i64::from(region.tl.y), region.bottom(), self.cell.h, self.size.h);
        for y in y0..y1 {
            for x in x0..x1 {
                if region.contains_point(self.center(x, y)) {
                    f(x, y);
                }
            }
        }
    }

    /// Set one cell, if it is on the grid.
    fn put(&mut self, x: u32, y: u32, c: char) {
        if x < self.size.w && y < self.size.h {
            let i = (y * self.size.w + x) as usize;
            self.cells[i] = c;
        }
    }

    /// Fill every visible cell of a region.
    fn fill(&mut self, region: Rect, c: char) {
        let mut hits = Vec::new();
        self.cells_in(region, &mut |x, y| hits.push((x, y)));
        for (x, y) in hits {
            self.put(x, y, c);
        }
    }

    /// Write lines of text from the top-left visible cell of `rect`,
    /// skipping cells outside `region`.
    fn write(&mut self, rect: Rect, region: Rect, text: &str) {
        let left = (rect.tl.x.max(0) as u32).div_ceil(self.cell.w);
        let top = (rect.tl.y.max(0) as u32).div_ceil(self.cell.h);
        for (row, line) in text.lines().enumerate() {
            let y = top + row as u32;
            let mut x = left;
            for c in line.chars() {
                let w = c.width().unwrap_or(0) as u32;
                if w > 0 && region.contains_point(self.center(x, y)) {
                    self.put(x, y, c);
                }
                x += w;
            }
        }
    }
}

impl DrawBackend for CharCanvas {
    fn paint(&mut self, node: &DisplayNode, rect: Rect, clip: Option<Rect>) -> Result<()> {
        self.stats.paints += 1;
        let mut region = Some(rect);
        for limit in [clip, self.scissor].into_iter().flatten() {
            region = region.and_then(|r| r.intersect(&limit));
        }
        let Some(region) = region else {
            trace!(kind = node.kind.name(), ?rect, "paint fully clipped");
            return Ok(());
        };
        trace!(kind = node.kind.name(), ?rect, ?clip, "paint");

        if node.background.is_some() {
            self.fill(region, '.');
        }
        match &node.kind {
            NodeKind::Rect(s) if s.fill.a > 0 => self.fill(region, '#'),
            NodeKind::Text(t) => self.write(rect, region, &t.text),
            NodeKind::Input(i) => {
                let shown = if i.text.is_empty() { &i.placeholder } else { &i.text };
                self.fill(region, '_');
                self.write(rect, region, shown);
            }
            NodeKind::Image(img) => {
                let c = match img.source {
                    ImageSource::Handle(_) => '%',
                    _ => '@',
                };
                self.fill(region, c);
            }
            NodeKind::VectorPath(_) => self.fill(region, '*'),
            _ => {}
        }
        Ok(())
    }

    fn set_scissor(&mut self, region: Option<Rect>) -> Result<()> {
        trace!(?region, "scissor");
        self.scissor = region;
        Ok(())
    }

    fn clear(&mut self, region: Option<Rect>) -> Result<()> {
        self.stats.clears += 1;
        match region {
            Some(r) => self.fill(r, ' '),
            None => self.cells.fill(' '),
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.stats.frames += 1;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.stats.invalidations += 1;
        debug!(size = ?self.size, "canvas invalidated");
    }
}
