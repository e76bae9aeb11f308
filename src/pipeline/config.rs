use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::fallback::policy::FallbackConfig;
use crate::foundation::error::{MediaError, MediaResult};
use crate::loader::resolve::ResizeEndpoint;
use crate::sensor::visibility::{ObserveMode, SensorOptions};

/// Which discovery preset a slot is observed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPreset {
    /// Gallery tiles: wide margin, 10% threshold.
    Gallery,
    /// Generic page images: small margin, any visible pixel.
    #[default]
    Images,
}

/// Sensor options used by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorPresets {
    /// One-shot discovery for gallery media.
    pub gallery: SensorOptions,
    /// One-shot discovery for generic images.
    pub images: SensorOptions,
    /// Continuous observation driving video play/pause.
    pub playback: SensorOptions,
}

impl Default for SensorPresets {
    fn default() -> Self {
        Self {
            gallery: SensorOptions::one_shot(100.0, 0.1),
            images: SensorOptions::one_shot(50.0, 0.01),
            playback: SensorOptions::continuous(0.0, 0.5),
        }
    }
}

impl SensorPresets {
    /// Options for `preset`.
    pub fn discovery(&self, preset: DiscoveryPreset) -> SensorOptions {
        match preset {
            DiscoveryPreset::Gallery => self.gallery,
            DiscoveryPreset::Images => self.images,
        }
    }

    fn validate(&self) -> MediaResult<()> {
        for (name, opts, mode) in [
            ("gallery", self.gallery, ObserveMode::OneShot),
            ("images", self.images, ObserveMode::OneShot),
            ("playback", self.playback, ObserveMode::Continuous),
        ] {
            opts.validate()
                .map_err(|e| MediaError::config(format!("sensor preset '{name}': {e}")))?;
            if opts.mode != mode {
                return Err(MediaError::config(format!(
                    "sensor preset '{name}' must use {mode:?} mode"
                )));
            }
        }
        Ok(())
    }
}

/// Everything tunable about a [`crate::MediaPipeline`].
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Image resize endpoint.
    pub resize: ResizeEndpoint,
    /// Fallback sources for failed loads.
    pub fallback: FallbackConfig,
    /// Sensor presets.
    pub sensors: SensorPresets,
    /// Preset for slots that do not name one.
    pub default_discovery: DiscoveryPreset,
    /// Loads still in flight after this many milliseconds fail with a timeout. `None` waits forever.
    pub load_timeout_ms: Option<u64>,
    /// Placeholder fade-out duration.
    pub fade_ms: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resize: ResizeEndpoint::default(),
            fallback: FallbackConfig::default(),
            sensors: SensorPresets::default(),
            default_discovery: DiscoveryPreset::default(),
            load_timeout_ms: Some(15_000),
            fade_ms: 300,
        }
    }
}

impl PipelineConfig {
    /// Validate every section.
    pub fn validate(&self) -> MediaResult<()> {
        self.resize.validate()?;
        self.fallback.validate()?;
        self.sensors.validate()?;
        if self.load_timeout_ms == Some(0) {
            return Err(MediaError::config("load_timeout_ms must be > 0 when set"));
        }
        Ok(())
    }

    /// Parse and validate a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MediaResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| MediaError::serde(format!("parse pipeline config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> MediaResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse and validate a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MediaError::config(format!("open pipeline config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty JSON rendering.
    pub fn to_json_pretty(&self) -> MediaResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MediaError::serde(format!("serialize pipeline config: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
