//! Source resolution and non-blocking fetch plumbing.

/// The fetcher seam, load requests and in-flight tracking.
pub mod fetch;
/// Image resize-endpoint rewriting and video source selection.
pub mod resolve;
