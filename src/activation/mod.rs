//! Attaching loaded content and driving video playback.

/// Content swap and container state updates.
pub mod controller;
/// The playback seam towards the presentation layer.
pub mod playback;
