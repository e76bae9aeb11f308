//! lazymedia is a viewport-driven media activation pipeline.
//!
//! It defers loading images and videos until they are about to scroll into view, and keeps video
//! playback in step with visibility. The pipeline is DOM-independent: the UI layer maps elements
//! to [`SlotId`]s, feeds layout or platform visibility events in, and implements the
//! [`MediaFetcher`] and [`PlaybackSurface`] seams.
//!
//! # Pipeline overview
//!
//! 1. **Sense**: [`VisibilitySensor`] turns layout samples into visibility transitions.
//! 2. **Register**: [`MediaRegistry`] holds one [`MediaDescriptor`] per slot.
//! 3. **Load**: sources are resolved (resize endpoint for images, quality hint for videos) and
//!    fetched without blocking; at most one load per slot ever starts.
//! 4. **Activate**: [`ActivationController`] attaches content, updates the container's CSS
//!    state hooks and plays/pauses videos.
//! 5. **Fall back**: [`FallbackPolicy`] substitutes a placeholder source after a failure and the
//!    slot settles as degraded.
//!
//! [`MediaPipeline`] owns all of the above.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod activation;
mod dom;
mod fallback;
mod foundation;
mod loader;
mod pipeline;
mod registry;
mod sensor;

/// JSON-driven scenarios for exercising a pipeline outside a browser.
pub mod scenario;

pub use activation::controller::{ActivationController, PlaybackState};
pub use activation::playback::{PlaybackRejected, PlaybackSurface, RecordingSurface, SurfaceCall};
pub use dom::attributes::{DATA_QUALITY, DATA_SRC, MediaSlot, SlotAttributes};
pub use fallback::policy::{FallbackConfig, FallbackPolicy, FallbackSelection};
pub use foundation::core::{MediaKind, Quality, Rect, Timestamp};
pub use foundation::error::{LoadFailureKind, MediaError, MediaResult};
pub use foundation::ids::{LoadTicket, SlotId};
pub use loader::fetch::{
    FetchStart, LoadOutcome, LoadRequest, MediaFetcher, ScriptedFetcher, ScriptedFetcherOpts,
};
pub use loader::resolve::{ResizeEndpoint, VideoPlan, file_name, plan_video};
pub use pipeline::config::{DiscoveryPreset, PipelineConfig, SensorPresets};
pub use pipeline::events::PipelineEvent;
pub use pipeline::session::{MediaPipeline, SensorChannel};
pub use registry::descriptor::{
    Container, ContainerClass, MediaDescriptor, MediaState, Placeholder, TransitionExtra,
};
pub use registry::store::MediaRegistry;
pub use sensor::geometry::{Intersection, LayoutSource, expand_root, intersect, is_intersecting};
pub use sensor::visibility::{ObserveMode, SensorOptions, VisibilityEvent, VisibilitySensor};
