//! Translation from element attributes to pipeline slots.

/// The `data-src` / `data-quality` attribute contract.
pub mod attributes;
