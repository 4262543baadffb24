//! Dirty-region detection between consecutive frames.
//!
//! Trees are compared by position, not identity: a list whose length changed
//! is dirty as a whole, and a reordered list reports every moved entry.

use arbor_geom::Rect;

use crate::{
    error::Result,
    hash::HashCache,
    layout::{child_rects, resolve_rect},
    measure::Measurer,
    node::DisplayNode,
};

/// Collect dirty rects between `old` and `new`, both laid out inside
/// `parent`.
pub fn diff(
    new: &[DisplayNode],
    old: &[DisplayNode],
    parent: Rect,
    hashes: &mut HashCache,
    measurer: &mut dyn Measurer,
) -> Result<Vec<Rect>> {
    let mut out = Vec::new();
    if new.len() != old.len() {
        out.push(parent);
        return Ok(out);
    }
    let new_rects = new
        .iter()
        .map(|n| resolve_rect(n, parent, measurer))
        .collect::<Result<Vec<_>>>()?;
    let old_rects = old
        .iter()
        .map(|n| resolve_rect(n, parent, measurer))
        .collect::<Result<Vec<_>>>()?;
    diff_pairs(new, &new_rects, old, &old_rects, hashes, measurer, &mut out)?;
    Ok(out)
}

/// Compare two equal-length lists with already resolved rects.
fn diff_pairs(
    new: &[DisplayNode],
    new_rects: &[Rect],
    old: &[DisplayNode],
    old_rects: &[Rect],
    hashes: &mut HashCache,
    measurer: &mut dyn Measurer,
    out: &mut Vec<Rect>,
) -> Result<()> {
    for (i, (n, o)) in new.iter().zip(old).enumerate() {
        let (nr, or) = (new_rects[i], old_rects[i]);
        let changed = hashes.refresh(n) != hashes.remembered(o);
        let moved = nr != or;
        if changed || moved {
            out.push(or);
            if moved {
                out.push(nr);
            }
        }

        let (nc, oc) = (n.children(), o.children());
        if nc.len() != oc.len() {
            out.push(nr);
            continue;
        }
        if nc.is_empty() {
            continue;
        }
        let ncr = child_rects(n, nr, measurer)?;
        let ocr = child_rects(o, or, measurer)?;
        diff_pairs(nc, &ncr, oc, &ocr, hashes, measurer, out)?;
    }
    Ok(())
}

/// Collapse candidate rects into redraw regions.
///
/// If the bounding box costs no more than `ratio` times the summed areas,
/// the single bounding box is returned. Otherwise the distinct rects are
/// returned in first-seen order.
pub fn merge(rects: &[Rect], ratio: f64) -> Vec<Rect> {
    if rects.len() <= 1 {
        return rects.to_vec();
    }
    let Some(bbox) = Rect::bounding(rects) else {
        return Vec::new();
    };
    let sum: f64 = rects.iter().map(|r| r.area() as f64).sum();
    if bbox.area() as f64 <= ratio * sum {
        return vec![bbox];
    }
    let mut out: Vec<Rect> = Vec::with_capacity(rects.len());
    for r in rects {
        if !out.contains(r) {
            out.push(*r);
        }
    }
    out
}
