use crate::foundation::core::Rect;
use crate::foundation::ids::SlotId;

/// Supplies the current layout rectangle of a slot, in the same space as the viewport.
///
/// `None` means the element is not laid out (detached or `display: none`) and never intersects.
pub trait LayoutSource {
    /// Layout rectangle of `id`, if any.
    fn rect_of(&self, id: SlotId) -> Option<Rect>;
}

impl<F> LayoutSource for F
where
    F: Fn(SlotId) -> Option<Rect>,
{
    fn rect_of(&self, id: SlotId) -> Option<Rect> {
        self(id)
    }
}

/// Expand `viewport` by `margin_px` on every side. Negative margins shrink it.
///
/// A shrink past the centre yields an inverted rectangle, which [`intersect`] treats as an empty
/// root.
pub fn expand_root(viewport: Rect, margin_px: f64) -> Rect {
    viewport.abs().inflate(margin_px, margin_px)
}

/// Result of one intersection test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// The element touches the root at all (edge-adjacent counts).
    pub touching: bool,
    /// Visible fraction of the element in `[0, 1]`.
    pub ratio: f64,
}

/// Compute how much of `target` lies inside `root`.
///
/// Zero-area targets inside the root report a ratio of `1.0`, matching how browsers treat
/// empty elements. An inverted `root` (`x0 > x1` or `y0 > y1`) intersects nothing.
pub fn intersect(target: Rect, root: Rect) -> Intersection {
    let target = target.abs();
    let touching = root.x0 <= root.x1
        && root.y0 <= root.y1
        && target.x0 <= root.x1
        && target.x1 >= root.x0
        && target.y0 <= root.y1
        && target.y1 >= root.y0;
    if !touching {
        return Intersection {
            touching: false,
            ratio: 0.0,
        };
    }

    let area = target.area();
    if area <= 0.0 {
        return Intersection {
            touching: true,
            ratio: 1.0,
        };
    }
    let overlap = target.intersect(root).area();
    Intersection {
        touching: true,
        ratio: (overlap / area).clamp(0.0, 1.0),
    }
}

/// Apply threshold semantics: intersecting iff touching and `ratio >= threshold`.
///
/// A zero threshold still requires the element to touch the root.
pub fn is_intersecting(hit: Intersection, threshold: f64) -> bool {
    hit.touching && hit.ratio >= threshold
}

#[cfg(test)]
#[path = "../../tests/unit/sensor/geometry.rs"]
mod tests;
