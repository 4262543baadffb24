//! Turning declared geometry into absolute rectangles.
//!
//! Three rules apply, chosen by the parent's kind: direct geometry for
//! children of plain and scrollable containers, the stacking cursor for
//! `StackV`/`StackH`, and the flex solver for `Flex`.

use arbor_geom::{Axis, Expanse, Rect};

use crate::{
    dimension::resolve_edges,
    error::Result,
    measure::Measurer,
    node::{DisplayNode, NodeKind},
};

/// The flexbox solver.
pub mod flex;
/// The stacking layout.
pub mod stack;

/// Resolve a node's rect against its parent rect from its own geometry.
/// `Auto` axes are sized by [`intrinsic_size`].
pub fn resolve_rect(node: &DisplayNode, parent: Rect, measurer: &mut dyn Measurer) -> Result<Rect> {
    let g = &node.geometry;
    let width = g.width.resolve_size(parent.w);
    let height = g.height.resolve_size(parent.h);
    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            let natural = intrinsic_size(
                node,
                width.unwrap_or(parent.w),
                height.unwrap_or(parent.h),
                measurer,
            )?;
            (width.unwrap_or(natural.w), height.unwrap_or(natural.h))
        }
    };
    let x = g.x.resolve_or_zero(parent.w);
    let y = g.y.resolve_or_zero(parent.h);
    Ok(Rect::new(
        parent.tl.x.saturating_add(x),
        parent.tl.y.saturating_add(y),
        w,
        h,
    ))
}

/// Natural size of a node given the space available to it. Explicit axes
/// resolve against the available space; `Auto` axes come from content.
pub fn intrinsic_size(
    node: &DisplayNode,
    available_width: u32,
    available_height: u32,
    measurer: &mut dyn Measurer,
) -> Result<Expanse> {
    let g = &node.geometry;
    let width = g.width.resolve_size(available_width);
    let height = g.height.resolve_size(available_height);
    if let (Some(w), Some(h)) = (width, height) {
        return Ok(Expanse::new(w, h));
    }
    let avail_w = width.unwrap_or(available_width);
    let avail_h = height.unwrap_or(available_height);

    let natural = match &node.kind {
        NodeKind::StackV { children } => {
            let probe = Rect::new(0, 0, avail_w, avail_h);
            let l = stack::layout(children, Axis::Vertical, &node.padding, probe, measurer)?;
            Expanse::new(l.cross, l.extent)
        }
        NodeKind::StackH { children } => {
            let probe = Rect::new(0, 0, avail_w, avail_h);
            let l = stack::layout(children, Axis::Horizontal, &node.padding, probe, measurer)?;
            Expanse::new(l.extent, l.cross)
        }
        NodeKind::Flex { .. } => {
            flex::measure(node, available_width, available_height, measurer)?
        }
        NodeKind::Container { children } | NodeKind::Scrollable { children, .. } => {
            children_extent(node, children, avail_w, avail_h, measurer)?
        }
        NodeKind::Rect(_)
        | NodeKind::Text(_)
        | NodeKind::Image(_)
        | NodeKind::Input(_)
        | NodeKind::VectorPath(_) => measurer.measure(node, avail_w, avail_h)?,
    };
    Ok(Expanse::new(
        width.unwrap_or(natural.w),
        height.unwrap_or(natural.h),
    ))
}

/// Bounding extent of directly positioned children, plus padding.
fn children_extent(
    node: &DisplayNode,
    children: &[DisplayNode],
    avail_w: u32,
    avail_h: u32,
    measurer: &mut dyn Measurer,
) -> Result<Expanse> {
    let pad = resolve_edges(&node.padding, avail_w, avail_h);
    let content = Rect::new(0, 0, avail_w, avail_h).inset(pad);
    let mut right = 0i64;
    let mut bottom = 0i64;
    for child in children {
        let r = resolve_rect(child, content, measurer)?;
        right = right.max(r.right());
        bottom = bottom.max(r.bottom());
    }
    let w = right + i64::from(pad.right);
    let h = bottom + i64::from(pad.bottom);
    Ok(Expanse::new(
        w.clamp(0, i64::from(u32::MAX)) as u32,
        h.clamp(0, i64::from(u32::MAX)) as u32,
    ))
}

/// Absolute rects of a node's children, given the node's own resolved rect.
/// Leaves have no children and yield an empty list.
pub fn child_rects(node: &DisplayNode, rect: Rect, measurer: &mut dyn Measurer) -> Result<Vec<Rect>> {
    match &node.kind {
        NodeKind::Container { children } => {
            let content = content_rect(node, rect);
            children
                .iter()
                .map(|c| resolve_rect(c, content, measurer))
                .collect()
        }
        NodeKind::Scrollable {
            scroll_y, children, ..
        } => {
            let virtual_parent = content_rect(node, rect).shift(0, scroll_y.saturating_neg());
            children
                .iter()
                .map(|c| resolve_rect(c, virtual_parent, measurer))
                .collect()
        }
        NodeKind::StackV { children } => {
            Ok(stack::layout(children, Axis::Vertical, &node.padding, rect, measurer)?.children)
        }
        NodeKind::StackH { children } => {
            Ok(stack::layout(children, Axis::Horizontal, &node.padding, rect, measurer)?.children)
        }
        NodeKind::Flex { .. } => flex::layout(node, rect, measurer),
        NodeKind::Rect(_)
        | NodeKind::Text(_)
        | NodeKind::Image(_)
        | NodeKind::Input(_)
        | NodeKind::VectorPath(_) => Ok(Vec::new()),
    }
}

/// A node's rect minus its padding.
pub fn content_rect(node: &DisplayNode, rect: Rect) -> Rect {
    rect.inset(resolve_edges(&node.padding, rect.w, rect.h))
}

/// Visit every node in a list with its absolute rect, depth first, parents
/// before children. Nothing is culled.
pub fn for_each_rect(
    nodes: &[DisplayNode],
    parent: Rect,
    measurer: &mut dyn Measurer,
    f: &mut dyn FnMut(&[usize], &DisplayNode, Rect),
) -> Result<()> {
    let mut path = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let rect = resolve_rect(node, parent, measurer)?;
        path.push(i);
        visit_rects(node, rect, measurer, &mut path, f)?;
        path.pop();
    }
    Ok(())
}

/// Recursive step of [`for_each_rect`].
fn visit_rects(
    node: &DisplayNode,
    rect: Rect,
    measurer: &mut dyn Measurer,
    path: &mut Vec<usize>,
    f: &mut dyn FnMut(&[usize], &DisplayNode, Rect),
) -> Result<()> {
    f(path, node, rect);
    let rects = child_rects(node, rect, measurer)?;
    for (i, (child, child_rect)) in node.children().iter().zip(rects).enumerate() {
        path.push(i);
        visit_rects(child, child_rect, measurer, path, f)?;
        path.pop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use arbor_geom::Edges;

    use super::*;
    use crate::{
        dimension::{Dimension, pct, px},
        measure::ZeroMeasurer,
        style::Color,
        testing::FixedMeasurer,
    };

    #[test]
    fn direct_geometry() -> Result<()> {
        let parent = Rect::new(10, 20, 200, 100);
        let node = DisplayNode::rect(Color::WHITE)
            .at(pct(10.0), 5)
            .size(pct(50.0), px(30));
        assert_eq!(
            resolve_rect(&node, parent, &mut ZeroMeasurer)?,
            Rect::new(30, 25, 100, 30)
        );
        Ok(())
    }

    #[test]
    fn auto_leaf_is_measured() -> Result<()> {
        let mut m = FixedMeasurer::new(Expanse::new(40, 12));
        let node = DisplayNode::text("hello", 12).width(px(90));
        assert_eq!(
            resolve_rect(&node, Rect::new(0, 0, 200, 200), &mut m)?,
            Rect::new(0, 0, 90, 12)
        );
        // Without a measurer, auto leaves collapse to zero.
        let node = DisplayNode::text("hello", 12);
        assert_eq!(
            resolve_rect(&node, Rect::new(5, 5, 200, 200), &mut ZeroMeasurer)?,
            Rect::new(5, 5, 0, 0)
        );
        Ok(())
    }

    #[test]
    fn container_children_respect_padding() -> Result<()> {
        let node = DisplayNode::container(vec![
            DisplayNode::rect(Color::BLACK).at(5, 5).size(10, 10),
        ])
        .with_padding(Edges::all(Dimension::Fixed(2)));
        let rects = child_rects(&node, Rect::new(100, 100, 50, 50), &mut ZeroMeasurer)?;
        assert_eq!(rects, vec![Rect::new(107, 107, 10, 10)]);
        let natural = intrinsic_size(&node, 500, 500, &mut ZeroMeasurer)?;
        assert_eq!(natural, Expanse::new(19, 19));
        Ok(())
    }

    #[test]
    fn scrollable_shifts_children() -> Result<()> {
        let node = DisplayNode::scrollable(
            30,
            400,
            vec![DisplayNode::rect(Color::BLACK).at(0, 10).size(20, 20)],
        );
        let rects = child_rects(&node, Rect::new(0, 100, 50, 50), &mut ZeroMeasurer)?;
        assert_eq!(rects, vec![Rect::new(0, 80, 20, 20)]);
        Ok(())
    }

    #[test]
    fn walks_every_node() -> Result<()> {
        let tree = vec![DisplayNode::vstack(vec![
            DisplayNode::rect(Color::BLACK).size(10, 10),
            DisplayNode::container(vec![DisplayNode::rect(Color::WHITE).size(3, 3)]).size(10, 10),
        ])
        .size(100, 100)];
        let mut seen = Vec::new();
        for_each_rect(&tree, Rect::new(0, 0, 100, 100), &mut ZeroMeasurer, &mut |p, _, r| {
            seen.push((p.to_vec(), r));
        })?;
        assert_eq!(
            seen,
            vec![
                (vec![0], Rect::new(0, 0, 100, 100)),
                (vec![0, 0], Rect::new(0, 0, 10, 10)),
                (vec![0, 1], Rect::new(0, 10, 10, 10)),
                (vec![0, 1, 0], Rect::new(0, 10, 3, 3)),
            ]
        );
        Ok(())
    }
}
