use arbor_geom::{Edges, Expanse, Point, Rect};
use slotmap::{SlotMap, new_key_type};

use crate::{
    dimension::resolve_edges,
    error::Result,
    measure::Measurer,
    node::{DisplayNode, NodeKind},
    style::{AlignItems, FlexStyle, JustifyContent},
};

use super::intrinsic_size;

new_key_type! {
    /// Index of a node in a [`FlexTree`] arena.
    pub struct FlexId;
}

/// Solved box of an arena node. The origin is relative to the parent's
/// rect; the root's origin is supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Layout {
    /// Left edge relative to the parent.
    x: f32,
    /// Top edge relative to the parent.
    y: f32,
    /// Width.
    w: f32,
    /// Height.
    h: f32,
}

/// An arena node: a display node borrowed for the duration of one pass.
#[derive(Debug)]
struct FlexNode<'a> {
    /// The display node this entry lays out.
    source: &'a DisplayNode,
    /// Enclosing flex container. Non-owning.
    parent: Option<FlexId>,
    /// Flex children, in order. Empty for anything that isn't a flex
    /// container.
    children: Vec<FlexId>,
    /// Current solution.
    layout: Layout,
}

/// Per-child working state inside one container solve.
#[derive(Debug, Clone, Copy)]
struct Item {
    /// Arena id.
    id: FlexId,
    /// Leading and trailing main-axis margins.
    main_margin: (f32, f32),
    /// Leading and trailing cross-axis margins.
    cross_margin: (f32, f32),
    /// Hypothetical main size.
    basis: f32,
    /// Grow factor.
    grow: f32,
    /// Shrink factor.
    shrink: f32,
    /// Effective cross alignment.
    align: AlignItems,
    /// Natural size, measured on demand.
    natural: Option<(f32, f32)>,
    /// Final main size.
    main: f32,
    /// Final cross size.
    cross: f32,
}

/// Convert a float extent to the u32 used by dimension resolution.
fn len(v: f32) -> u32 {
    if v.is_finite() {
        v.clamp(0.0, u32::MAX as f32) as u32
    } else {
        0
    }
}

/// Resolve a margin box to floats.
fn float_edges(e: Edges<i32>) -> Edges<f32> {
    e.map(|v| v as f32)
}

/// Start offset and inter-item advance for a justification mode. Negative
/// free space is distributed as-is, so overflowing items overlap.
fn justify_offsets(justify: JustifyContent, free: f32, gap: f32, n: usize) -> (f32, f32) {
    let n_f = n as f32;
    match justify {
        JustifyContent::FlexStart => (0.0, gap),
        JustifyContent::Center => (free / 2.0, gap),
        JustifyContent::FlexEnd => (free, gap),
        JustifyContent::SpaceBetween if n > 1 => (0.0, gap + free / (n_f - 1.0)),
        JustifyContent::SpaceBetween => (0.0, gap),
        JustifyContent::SpaceAround if n > 0 => {
            let unit = free / (2.0 * n_f);
            (unit, gap + 2.0 * unit)
        }
        JustifyContent::SpaceAround => (0.0, gap),
        JustifyContent::SpaceEvenly => {
            let e = free / (n_f + 1.0);
            (e, gap + e)
        }
    }
}

/// Cross-axis offset of a child inside the line.
fn cross_offset(align: AlignItems, capacity: f32, size: f32, margin: (f32, f32)) -> f32 {
    match align {
        AlignItems::FlexStart | AlignItems::Stretch | AlignItems::Baseline => margin.0,
        AlignItems::Center => (capacity - (size + margin.0 + margin.1)) / 2.0 + margin.0,
        AlignItems::FlexEnd => capacity - size - margin.1,
    }
}

/// Arena of flex nodes built from a display subtree.
///
/// Nested flex containers are expanded into the arena so a single solve
/// covers the whole flex region; any other kind is a leaf here and keeps its
/// own children out of the arena.
#[derive(Debug)]
pub struct FlexTree<'a> {
    /// Arena storage.
    nodes: SlotMap<FlexId, FlexNode<'a>>,
    /// The outermost container.
    root: FlexId,
}

impl<'a> FlexTree<'a> {
    /// Build the arena for `root`.
    pub fn build(root: &'a DisplayNode) -> Self {
        let mut tree = Self {
            nodes: SlotMap::with_key(),
            root: FlexId::default(),
        };
        tree.root = tree.insert(root, None);
        tree
    }

    /// Add a subtree to the arena.
    fn insert(&mut self, node: &'a DisplayNode, parent: Option<FlexId>) -> FlexId {
        let id = self.nodes.insert(FlexNode {
            source: node,
            parent,
            children: Vec::new(),
            layout: Layout::default(),
        });
        if let NodeKind::Flex { children, .. } = &node.kind {
            let ids = children.iter().map(|c| self.insert(c, Some(id))).collect();
            self.nodes[id].children = ids;
        }
        id
    }

    /// The root container.
    pub fn root(&self) -> FlexId {
        self.root
    }

    /// Number of arena nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the arena empty?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flex children of a node.
    pub fn children(&self, id: FlexId) -> &[FlexId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The display node behind an arena entry.
    pub fn source(&self, id: FlexId) -> Option<&'a DisplayNode> {
        self.nodes.get(id).map(|n| n.source)
    }

    /// Absolute rect of a node after a solve, given the root's origin.
    /// Positions accumulate up the parent chain and are floored; sizes are
    /// taken so that adjacent boxes stay adjacent.
    pub fn absolute_rect(&self, id: FlexId, origin: Point) -> Rect {
        let Some(node) = self.nodes.get(id) else {
            return Rect::zero();
        };
        let mut x = f64::from(origin.x);
        let mut y = f64::from(origin.y);
        let mut cur = Some(id);
        while let Some(c) = cur {
            let n = &self.nodes[c];
            x += f64::from(n.layout.x);
            y += f64::from(n.layout.y);
            cur = n.parent;
        }
        let x0 = x.floor();
        let y0 = y.floor();
        let w = ((x + f64::from(node.layout.w)).floor() - x0).max(0.0);
        let h = ((y + f64::from(node.layout.h)).floor() - y0).max(0.0);
        Rect::new(
            x0.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
            y0.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32,
            w.min(f64::from(u32::MAX)) as u32,
            h.min(f64::from(u32::MAX)) as u32,
        )
    }

    /// Solved size of a node.
    pub fn size(&self, id: FlexId) -> Expanse {
        self.nodes.get(id).map_or(Expanse::default(), |n| {
            Expanse::new(len(n.layout.w.floor()), len(n.layout.h.floor()))
        })
    }

    /// Lay out `id` and its flex descendants.
    ///
    /// With `force`, the node takes exactly `avail_w` x `avail_h`. Otherwise
    /// explicit dimensions resolve against the available space and `Auto`
    /// axes shrink to content. Returns the node's size.
    pub fn calculate_layout(
        &mut self,
        id: FlexId,
        avail_w: f32,
        avail_h: f32,
        force: bool,
        measurer: &mut dyn Measurer,
    ) -> Result<(f32, f32)> {
        let node = self.nodes[id].source;
        let NodeKind::Flex { style, .. } = &node.kind else {
            let size = if force {
                (avail_w, avail_h)
            } else {
                let n = intrinsic_size(node, len(avail_w), len(avail_h), measurer)?;
                (n.w as f32, n.h as f32)
            };
            self.set_size(id, size);
            return Ok(size);
        };
        let style = *style;
        let is_row = style.direction.is_row();

        let g = &node.geometry;
        let (w, h) = if force {
            (Some(avail_w), Some(avail_h))
        } else {
            (
                g.width.resolve_size(len(avail_w)).map(|v| v as f32),
                g.height.resolve_size(len(avail_h)).map(|v| v as f32),
            )
        };
        let pad = float_edges(resolve_edges(
            &node.padding,
            len(w.unwrap_or(avail_w)),
            len(h.unwrap_or(avail_h)),
        ));
        let pad_x = pad.left + pad.right;
        let pad_y = pad.top + pad.bottom;
        let content_w = w.map(|w| (w - pad_x).max(0.0));
        let content_h = h.map(|h| (h - pad_y).max(0.0));
        let avail_cw = content_w.unwrap_or((avail_w - pad_x).max(0.0));
        let avail_ch = content_h.unwrap_or((avail_h - pad_y).max(0.0));
        let (main_cap, cross_cap) = if is_row {
            (content_w, content_h)
        } else {
            (content_h, content_w)
        };
        let (avail_main, avail_cross) = if is_row {
            (avail_cw, avail_ch)
        } else {
            (avail_ch, avail_cw)
        };

        let mut items = self.collect_items(id, style, avail_cw, avail_ch, avail_main, measurer)?;
        let n = items.len();
        let gap = style.gap as f32;
        let gaps = gap * n.saturating_sub(1) as f32;

        // Main axis: distribute free space.
        let used: f32 = items
            .iter()
            .map(|i| i.basis + i.main_margin.0 + i.main_margin.1)
            .sum::<f32>()
            + gaps;
        let cap = main_cap.unwrap_or(used);
        let free = cap - used;
        let total_grow: f32 = items.iter().map(|i| i.grow).sum();
        let total_shrink: f32 = items.iter().map(|i| i.shrink).sum();
        for item in &mut items {
            item.main = if free > 0.0 && total_grow > 0.0 {
                item.basis + free * item.grow / total_grow
            } else if free < 0.0 && total_shrink > 0.0 {
                (item.basis + free * item.shrink / total_shrink).max(0.0)
            } else {
                item.basis
            };
        }

        // Cross axis.
        for i in 0..n {
            let src = self.nodes[items[i].id].source;
            let declared = if is_row {
                src.geometry.height
            } else {
                src.geometry.width
            };
            let margins = items[i].cross_margin.0 + items[i].cross_margin.1;
            items[i].cross = if let Some(v) = declared.resolve_size(len(avail_cross)) {
                v as f32
            } else if let (AlignItems::Stretch, Some(cap)) = (items[i].align, cross_cap) {
                (cap - margins).max(0.0)
            } else {
                let natural = self.natural(&mut items[i], avail_cw, avail_ch, measurer)?;
                if is_row { natural.1 } else { natural.0 }
            };
        }
        let line_cross = cross_cap.unwrap_or_else(|| {
            items
                .iter()
                .map(|i| i.cross + i.cross_margin.0 + i.cross_margin.1)
                .fold(0.0, f32::max)
        });

        let (final_w, final_h) = if is_row {
            (w.unwrap_or(cap + pad_x), h.unwrap_or(line_cross + pad_y))
        } else {
            (w.unwrap_or(line_cross + pad_x), h.unwrap_or(cap + pad_y))
        };
        self.set_size(id, (final_w, final_h));

        // Positions.
        let occupied: f32 = items
            .iter()
            .map(|i| i.main + i.main_margin.0 + i.main_margin.1)
            .sum::<f32>()
            + gaps;
        let (start, advance) = justify_offsets(style.justify, cap - occupied, gap, n);
        let mut cursor = start;
        for item in &items {
            let pos = cursor + item.main_margin.0;
            cursor = pos + item.main + item.main_margin.1 + advance;
            let main_pos = if style.direction.is_reverse() {
                cap - pos - item.main
            } else {
                pos
            };
            let cross_pos = cross_offset(item.align, line_cross, item.cross, item.cross_margin);
            let (x, y, cw, ch) = if is_row {
                (pad.left + main_pos, pad.top + cross_pos, item.main, item.cross)
            } else {
                (pad.left + cross_pos, pad.top + main_pos, item.cross, item.main)
            };
            self.calculate_layout(item.id, cw, ch, true, measurer)?;
            let l = &mut self.nodes[item.id].layout;
            l.x = x;
            l.y = y;
        }

        Ok((final_w, final_h))
    }

    /// Gather children with margins, bases and flex factors.
    fn collect_items(
        &mut self,
        id: FlexId,
        style: FlexStyle,
        avail_cw: f32,
        avail_ch: f32,
        avail_main: f32,
        measurer: &mut dyn Measurer,
    ) -> Result<Vec<Item>> {
        let is_row = style.direction.is_row();
        let children = self.nodes[id].children.clone();
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            let src = self.nodes[child].source;
            let m = float_edges(resolve_edges(&src.margin, len(avail_cw), len(avail_ch)));
            let (main_margin, cross_margin) = if is_row {
                ((m.left, m.right), (m.top, m.bottom))
            } else {
                ((m.top, m.bottom), (m.left, m.right))
            };
            let mut item = Item {
                id: child,
                main_margin,
                cross_margin,
                basis: 0.0,
                grow: src.flex.grow.max(0.0),
                shrink: src.flex.shrink.max(0.0),
                align: src.flex.align_self.unwrap_or(style.align),
                natural: None,
                main: 0.0,
                cross: 0.0,
            };
            let declared_main = if is_row {
                src.geometry.width
            } else {
                src.geometry.height
            };
            item.basis = if let Some(b) = src.flex.basis.resolve_size(len(avail_main)) {
                b as f32
            } else if let Some(v) = declared_main.resolve_size(len(avail_main)) {
                v as f32
            } else {
                let natural = self.natural(&mut item, avail_cw, avail_ch, measurer)?;
                if is_row { natural.0 } else { natural.1 }
            };
            items.push(item);
        }
        Ok(items)
    }

    /// Natural size of an item, measured once per solve. Nested flex
    /// containers run a trial layout that is rolled back afterwards.
    fn natural(
        &mut self,
        item: &mut Item,
        avail_w: f32,
        avail_h: f32,
        measurer: &mut dyn Measurer,
    ) -> Result<(f32, f32)> {
        if let Some(n) = item.natural {
            return Ok(n);
        }
        let src = self.nodes[item.id].source;
        let size = if matches!(src.kind, NodeKind::Flex { .. }) {
            let saved = self.snapshot(item.id);
            let size = self.calculate_layout(item.id, avail_w, avail_h, false, measurer);
            self.restore(saved);
            size?
        } else {
            let n = intrinsic_size(src, len(avail_w), len(avail_h), measurer)?;
            (n.w as f32, n.h as f32)
        };
        item.natural = Some(size);
        Ok(size)
    }

    /// Set a node's solved size.
    fn set_size(&mut self, id: FlexId, (w, h): (f32, f32)) {
        let l = &mut self.nodes[id].layout;
        l.w = w;
        l.h = h;
    }

    /// Record the layouts of a subtree.
    fn snapshot(&self, id: FlexId) -> Vec<(FlexId, Layout)> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            let n = &self.nodes[c];
            out.push((c, n.layout));
            stack.extend(n.children.iter().copied());
        }
        out
    }

    /// Put back layouts recorded by [`Self::snapshot`].
    fn restore(&mut self, saved: Vec<(FlexId, Layout)>) {
        for (id, layout) in saved {
            if let Some(n) = self.nodes.get_mut(id) {
                n.layout = layout;
            }
        }
    }
}

/// Solve a flex container placed at `rect` and return the absolute rects of
/// its direct children. Non-flex nodes have no flex children.
pub fn layout(node: &DisplayNode, rect: Rect, measurer: &mut dyn Measurer) -> Result<Vec<Rect>> {
    if !matches!(node.kind, NodeKind::Flex { .. }) {
        return Ok(Vec::new());
    }
    let mut tree = FlexTree::build(node);
    let root = tree.root();
    tree.calculate_layout(root, rect.w as f32, rect.h as f32, true, measurer)?;
    Ok(tree
        .children(root)
        .iter()
        .map(|c| tree.absolute_rect(*c, rect.tl))
        .collect())
}

/// Natural size of a flex container given the space available to it.
pub fn measure(
    node: &DisplayNode,
    available_width: u32,
    available_height: u32,
    measurer: &mut dyn Measurer,
) -> Result<Expanse> {
    let mut tree = FlexTree::build(node);
    let root = tree.root();
    tree.calculate_layout(
        root,
        available_width as f32,
        available_height as f32,
        false,
        measurer,
    )?;
    Ok(tree.size(root))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        dimension::{Dimension, px},
        measure::ZeroMeasurer,
        style::{Color, FlexDirection},
        testing::FixedMeasurer,
    };

    fn leaf() -> DisplayNode {
        DisplayNode::rect(Color::BLACK)
    }

    fn solve(node: &DisplayNode, rect: Rect) -> Vec<Rect> {
        layout(node, rect, &mut ZeroMeasurer).unwrap_or_default()
    }

    #[test]
    fn grow_splits_free_space() {
        let row = DisplayNode::flex(
            FlexStyle::row(),
            vec![
                leaf().width(px(20)),
                leaf().grow(1.0).basis(0),
                leaf().grow(1.0).basis(0),
            ],
        );
        let r = solve(&row, Rect::new(0, 0, 100, 30));
        assert_eq!(
            r,
            vec![
                Rect::new(0, 0, 20, 30),
                Rect::new(20, 0, 40, 30),
                Rect::new(60, 0, 40, 30),
            ]
        );
    }

    #[test]
    fn shrink_is_weighted_and_clamped() {
        let col = DisplayNode::flex(
            FlexStyle::column(),
            vec![
                leaf().basis(50).shrink(1.0),
                leaf().basis(50).shrink(1.0),
                leaf().basis(50).shrink(3.0),
            ],
        );
        let r = solve(&col, Rect::new(0, 0, 10, 100));
        let heights: Vec<u32> = r.iter().map(|r| r.h).collect();
        assert_eq!(heights, vec![40, 40, 20]);
        assert_eq!(r[2].tl.y, 80);

        // Heavy overflow clamps at zero rather than going negative.
        let col = DisplayNode::flex(
            FlexStyle::column(),
            vec![leaf().basis(10).shrink(9.0), leaf().basis(200).shrink(1.0)],
        );
        let r = solve(&col, Rect::new(0, 0, 10, 100));
        assert_eq!(r[0].h, 0);
        assert_eq!(r[1].h, 189);
    }

    #[test]
    fn justify_center_and_align_center() {
        let row = DisplayNode::flex(
            FlexStyle::row()
                .justify(JustifyContent::Center)
                .align(AlignItems::Center),
            vec![leaf().size(50, 50)],
        );
        assert_eq!(solve(&row, Rect::new(0, 0, 100, 100)), vec![Rect::new(25, 25, 50, 50)]);
    }

    #[test]
    fn justify_modes() {
        let place = |justify| {
            let row = DisplayNode::flex(
                FlexStyle::row().justify(justify),
                vec![leaf().size(10, 10), leaf().size(10, 10)],
            );
            solve(&row, Rect::new(0, 0, 100, 10))
                .iter()
                .map(|r| r.tl.x)
                .collect::<Vec<_>>()
        };
        assert_eq!(place(JustifyContent::FlexStart), vec![0, 10]);
        assert_eq!(place(JustifyContent::FlexEnd), vec![80, 90]);
        assert_eq!(place(JustifyContent::Center), vec![40, 50]);
        assert_eq!(place(JustifyContent::SpaceBetween), vec![0, 90]);
        assert_eq!(place(JustifyContent::SpaceAround), vec![20, 70]);
        assert_eq!(place(JustifyContent::SpaceEvenly), vec![26, 63]);
    }

    #[test]
    fn justify_distributes_overflow() {
        let place = |justify| {
            let row = DisplayNode::flex(
                FlexStyle::row().justify(justify),
                vec![leaf().size(80, 10).shrink(0.0), leaf().size(80, 10).shrink(0.0)],
            );
            solve(&row, Rect::new(0, 0, 100, 10))
                .iter()
                .map(|r| r.tl.x)
                .collect::<Vec<_>>()
        };
        assert_eq!(place(JustifyContent::SpaceBetween), vec![0, 20]);
        assert_eq!(place(JustifyContent::SpaceAround), vec![-15, 35]);
        assert_eq!(place(JustifyContent::SpaceEvenly), vec![-20, 40]);
        assert_eq!(place(JustifyContent::FlexEnd), vec![-60, 20]);
    }

    #[test]
    fn gap_and_margins() {
        let row = DisplayNode::flex(
            FlexStyle::row().gap(5).align(AlignItems::FlexStart),
            vec![
                leaf().size(10, 10),
                leaf()
                    .size(10, 10)
                    .with_margin(Edges::new(px(2), px(3), px(0), px(4))),
                leaf().size(10, 10),
            ],
        );
        let r = solve(&row, Rect::new(0, 0, 100, 50));
        assert_eq!(
            r,
            vec![
                Rect::new(0, 0, 10, 10),
                Rect::new(19, 2, 10, 10),
                Rect::new(37, 0, 10, 10),
            ]
        );
    }

    #[test]
    fn stretch_and_align_self() {
        let row = DisplayNode::flex(
            FlexStyle::row(),
            vec![
                leaf().width(10).with_margin(Edges::symmetric(px(5), px(0))),
                leaf().size(10, 10).align_self(AlignItems::FlexEnd),
                leaf().width(10).align_self(AlignItems::Center),
            ],
        );
        let r = solve(&row, Rect::new(0, 0, 30, 40));
        assert_eq!(r[0], Rect::new(0, 5, 10, 30));
        assert_eq!(r[1], Rect::new(10, 30, 10, 10));
        // Centered items without an explicit cross size use their natural
        // size, which is zero here.
        assert_eq!(r[2], Rect::new(20, 20, 10, 0));
    }

    #[test]
    fn padding_offsets_content() {
        let row = DisplayNode::flex(
            FlexStyle::row().align(AlignItems::FlexStart),
            vec![leaf().size(10, 10).grow(1.0)],
        )
        .with_padding(Edges::all(px(5)));
        assert_eq!(solve(&row, Rect::new(100, 100, 50, 50)), vec![Rect::new(105, 105, 40, 10)]);
    }

    #[test]
    fn reverse_direction_mirrors() {
        let row = DisplayNode::flex(
            FlexStyle::row().direction(FlexDirection::RowReverse),
            vec![leaf().size(10, 10), leaf().size(20, 10)],
        );
        let xs: Vec<i32> = solve(&row, Rect::new(0, 0, 100, 10))
            .iter()
            .map(|r| r.tl.x)
            .collect();
        assert_eq!(xs, vec![90, 70]);
    }

    #[test]
    fn auto_basis_uses_measurement() -> Result<()> {
        let mut m = FixedMeasurer::new(Expanse::new(30, 12));
        let row = DisplayNode::flex(
            FlexStyle::row().align(AlignItems::FlexStart),
            vec![DisplayNode::text("a", 12), DisplayNode::text("b", 12)],
        );
        let r = layout(&row, Rect::new(0, 0, 100, 50), &mut m)?;
        assert_eq!(r, vec![Rect::new(0, 0, 30, 12), Rect::new(30, 0, 30, 12)]);
        Ok(())
    }

    #[test]
    fn nested_auto_flex_measures_content() -> Result<()> {
        let mut m = FixedMeasurer::new(Expanse::new(30, 12));
        let inner = DisplayNode::flex(
            FlexStyle::row().gap(4),
            vec![DisplayNode::text("a", 12), DisplayNode::text("b", 12)],
        );
        let outer = DisplayNode::flex(
            FlexStyle::row().align(AlignItems::FlexStart),
            vec![inner.clone(), leaf().size(5, 5)],
        );
        let r = layout(&outer, Rect::new(0, 0, 200, 100), &mut m)?;
        assert_eq!(r[0], Rect::new(0, 0, 64, 12));
        assert_eq!(r[1], Rect::new(64, 0, 5, 5));
        assert_eq!(measure(&inner, 500, 500, &mut m)?, Expanse::new(64, 12));
        Ok(())
    }

    #[test]
    fn measurement_rolls_back() -> Result<()> {
        let inner = DisplayNode::flex(FlexStyle::row(), vec![leaf().size(10, 10)]);
        let outer = DisplayNode::flex(FlexStyle::column(), vec![inner]);
        let mut tree = FlexTree::build(&outer);
        let root = tree.root();
        let inner_id = tree.children(root)[0];
        let leaf_id = tree.children(inner_id)[0];
        let mut item = Item {
            id: inner_id,
            main_margin: (0.0, 0.0),
            cross_margin: (0.0, 0.0),
            basis: 0.0,
            grow: 0.0,
            shrink: 1.0,
            align: AlignItems::Stretch,
            natural: None,
            main: 0.0,
            cross: 0.0,
        };
        let n = tree.natural(&mut item, 100.0, 100.0, &mut ZeroMeasurer)?;
        assert_eq!(n, (10.0, 10.0));
        assert_eq!(tree.size(inner_id), Expanse::default());
        assert_eq!(tree.size(leaf_id), Expanse::default());
        assert_eq!(tree.len(), 3);
        Ok(())
    }

    #[test]
    fn nested_rects_accumulate_through_parents() -> Result<()> {
        let row2 = DisplayNode::flex(
            FlexStyle::row()
                .justify(JustifyContent::Center)
                .align(AlignItems::Center),
            vec![leaf().size(100, 100)],
        )
        .height(200);
        let col = DisplayNode::flex(
            FlexStyle::column(),
            vec![DisplayNode::flex(FlexStyle::row(), vec![]).height(100), row2],
        );
        let mut tree = FlexTree::build(&col);
        let root = tree.root();
        tree.calculate_layout(root, 800.0, 300.0, true, &mut ZeroMeasurer)?;
        let row2_id = tree.children(root)[1];
        let child = tree.children(row2_id)[0];
        assert_eq!(tree.absolute_rect(row2_id, Point::zero()), Rect::new(0, 100, 800, 200));
        assert_eq!(tree.absolute_rect(child, Point::zero()), Rect::new(350, 150, 100, 100));
        assert_eq!(tree.source(child).map(|n| n.geometry.width), Some(Dimension::Fixed(100)));
        Ok(())
    }

    proptest! {
        #[test]
        fn shrink_only_reduces(
            bases in prop::collection::vec(1i32..200, 1..6),
            shrinks in prop::collection::vec(1u8..5, 6),
            cap in 1u32..300,
        ) {
            let children: Vec<DisplayNode> = bases
                .iter()
                .zip(&shrinks)
                .map(|(b, s)| leaf().basis(*b).shrink(f32::from(*s)))
                .collect();
            let total: i64 = bases.iter().map(|b| i64::from(*b)).sum();
            let row = DisplayNode::flex(FlexStyle::row(), children);
            let r = solve(&row, Rect::new(0, 0, cap, 10));
            prop_assert_eq!(r.len(), bases.len());
            for (rect, basis) in r.iter().zip(&bases) {
                prop_assert!(i64::from(rect.w) <= i64::from(*basis));
            }
            for pair in r.windows(2) {
                prop_assert!(pair[1].tl.x >= pair[0].tl.x);
            }
            if total <= i64::from(cap) {
                prop_assert_eq!(r[r.len() - 1].right(), total);
            }
        }

        #[test]
        fn grow_fills_capacity(
            grows in prop::collection::vec(1u8..5, 1..6),
            cap in 10u32..500,
        ) {
            let children: Vec<DisplayNode> = grows
                .iter()
                .map(|g| leaf().basis(0).grow(f32::from(*g)))
                .collect();
            let row = DisplayNode::flex(FlexStyle::row(), children);
            let r = solve(&row, Rect::new(0, 0, cap, 10));
            prop_assert_eq!(r[0].tl.x, 0);
            let last = r[r.len() - 1];
            prop_assert!((last.right() - i64::from(cap)).abs() <= 1);
        }
    }
}
