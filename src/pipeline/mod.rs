//! The pipeline instance that owns every component.

/// Pipeline configuration and sensor presets.
pub mod config;
/// Events emitted by the pipeline.
pub mod events;
/// [`MediaPipeline`](session::MediaPipeline) itself.
pub mod session;
