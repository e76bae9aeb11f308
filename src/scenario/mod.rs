//! Scripted runs of a [`crate::MediaPipeline`] against a simulated page.
//!
//! A scenario lists slots with layout rectangles and a sequence of steps (scrolls, completions,
//! re-scans, removals). Running it yields a [`ScenarioReport`] with the final descriptor states,
//! every playback call and every pipeline event.

mod model;
mod runner;

pub use model::{Scenario, ScenarioSlot, Step};
pub use runner::{ScenarioReport, SlotReport, run_scenario};
