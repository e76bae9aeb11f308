//! Substitute sources for failed loads.

/// Fallback selection policy.
pub mod policy;
