use arbor_geom::{Axis, Edges, Rect};

use crate::{
    dimension::{Dimension, resolve_edges},
    error::Result,
    measure::Measurer,
    node::DisplayNode,
};

use super::intrinsic_size;

/// Result of laying out a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLayout {
    /// Absolute rect of every child, in declaration order.
    pub children: Vec<Rect>,
    /// Auto size along the stacking axis: final cursor plus trailing padding.
    pub extent: u32,
    /// Auto size across the stacking axis: widest child plus margins and
    /// padding.
    pub cross: u32,
}

/// Clamp an i64 length into u32.
fn to_len(v: i64) -> u32 {
    v.clamp(0, i64::from(u32::MAX)) as u32
}

/// Lay out `children` along `axis` inside `rect`.
///
/// Every child gets a rect, visible or not, since later siblings depend on
/// the cursor. Margins resolve against the padding-reduced inner extent.
pub fn layout(
    children: &[DisplayNode],
    axis: Axis,
    padding: &Edges<Dimension>,
    rect: Rect,
    measurer: &mut dyn Measurer,
) -> Result<StackLayout> {
    let pad = resolve_edges(padding, rect.w, rect.h);
    let inner_w = to_len(i64::from(rect.w) - i64::from(pad.horizontal()));
    let inner_h = to_len(i64::from(rect.h) - i64::from(pad.vertical()));

    let (origin_main, lead_pad, trail_pad) = match axis {
        Axis::Vertical => (i64::from(rect.tl.y), pad.top, pad.bottom),
        Axis::Horizontal => (i64::from(rect.tl.x), pad.left, pad.right),
    };
    let mut cursor = origin_main + i64::from(lead_pad);
    let mut cross_max = 0i64;
    let mut rects = Vec::with_capacity(children.len());

    for child in children {
        let m = resolve_edges(&child.margin, inner_w, inner_h);
        let g = &child.geometry;
        let width = g.width.resolve_size(inner_w);
        let height = g.height.resolve_size(inner_h);
        let (w, h) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                let natural = intrinsic_size(
                    child,
                    width.unwrap_or(inner_w),
                    height.unwrap_or(inner_h),
                    measurer,
                )?;
                (width.unwrap_or(natural.w), height.unwrap_or(natural.h))
            }
        };

        let r = match axis {
            Axis::Vertical => {
                let x = i64::from(rect.tl.x) + i64::from(pad.left) + i64::from(m.left);
                let y = cursor + i64::from(m.top);
                cursor = y + i64::from(h) + i64::from(m.bottom);
                cross_max = cross_max.max(i64::from(m.left) + i64::from(w) + i64::from(m.right));
                Rect::new(clamp_coord(x), clamp_coord(y), w, h)
            }
            Axis::Horizontal => {
                let x = cursor + i64::from(m.left);
                let y = i64::from(rect.tl.y) + i64::from(pad.top) + i64::from(m.top);
                cursor = x + i64::from(w) + i64::from(m.right);
                cross_max = cross_max.max(i64::from(m.top) + i64::from(h) + i64::from(m.bottom));
                Rect::new(clamp_coord(x), clamp_coord(y), w, h)
            }
        };
        rects.push(r);
    }

    let cross_pad = match axis {
        Axis::Vertical => pad.horizontal(),
        Axis::Horizontal => pad.vertical(),
    };
    Ok(StackLayout {
        children: rects,
        extent: to_len(cursor - origin_main + i64::from(trail_pad)),
        cross: to_len(cross_max + i64::from(cross_pad)),
    })
}

/// Clamp an i64 coordinate into i32.
fn clamp_coord(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
