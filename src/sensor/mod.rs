//! Viewport visibility sensing.

/// Intersection math over [`kurbo::Rect`].
pub mod geometry;
/// The visibility sensor and its event queue.
pub mod visibility;
