//! Per-slot media descriptors and the id -> descriptor registry.

/// Descriptor, container and lifecycle state types.
pub mod descriptor;
/// Registry keyed by [`crate::SlotId`].
pub mod store;
