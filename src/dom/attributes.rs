use std::collections::BTreeMap;

use crate::foundation::core::{MediaKind, Quality};
use crate::foundation::error::{MediaError, MediaResult};
use crate::foundation::ids::SlotId;
use crate::pipeline::config::DiscoveryPreset;

/// Attribute carrying the deferred source.
pub const DATA_SRC: &str = "data-src";
/// Attribute carrying the video quality hint.
pub const DATA_QUALITY: &str = "data-quality";

/// Raw view of one element as seen by the UI layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlotAttributes {
    /// Lowercase tag name (`img`, `video`).
    pub tag: String,
    /// Element attributes.
    pub attributes: BTreeMap<String, String>,
    /// `src` of the first `<source>` child (video only).
    pub source_src: Option<String>,
}

/// One element opted into the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaSlot {
    /// Stable id assigned by the UI layer.
    pub id: SlotId,
    /// Image or video.
    pub kind: MediaKind,
    /// Deferred source.
    pub deferred_source: String,
    /// Optional quality hint.
    #[serde(default)]
    pub quality: Option<Quality>,
    /// Source already attached to the element.
    #[serde(default)]
    pub active_source: Option<String>,
    /// Discovery preset; `None` uses the pipeline default.
    #[serde(default)]
    pub preset: Option<DiscoveryPreset>,
}

impl MediaSlot {
    /// Image slot with default settings.
    pub fn image(id: SlotId, deferred_source: impl Into<String>) -> Self {
        Self {
            id,
            kind: MediaKind::Image,
            deferred_source: deferred_source.into(),
            quality: None,
            active_source: None,
            preset: None,
        }
    }

    /// Video slot with default settings.
    pub fn video(id: SlotId, deferred_source: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            ..Self::image(id, deferred_source)
        }
    }

    /// Use `preset` for discovery.
    pub fn with_preset(mut self, preset: DiscoveryPreset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Set the quality hint.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the already-attached source.
    pub fn with_active_source(mut self, source: impl Into<String>) -> Self {
        self.active_source = Some(source.into());
        self
    }

    /// Build a slot from element attributes.
    ///
    /// Returns `Ok(None)` for elements that do not opt in (no `data-src`, or a tag other than
    /// `img`/`video`). An unknown `data-quality` falls back to `medium`.
    pub fn from_attributes(id: SlotId, el: &SlotAttributes) -> MediaResult<Option<Self>> {
        let kind = match el.tag.to_ascii_lowercase().as_str() {
            "img" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => return Ok(None),
        };
        let Some(src) = el.attributes.get(DATA_SRC) else {
            return Ok(None);
        };
        if src.trim().is_empty() {
            return Err(MediaError::validation(format!(
                "{id}: {DATA_SRC} must be non-empty"
            )));
        }

        let mut slot = Self::image(id, src.trim());
        slot.kind = kind;
        if kind == MediaKind::Video {
            slot.quality = el.attributes.get(DATA_QUALITY).map(|q| {
                Quality::parse(q).unwrap_or_else(|e| {
                    tracing::warn!(%id, error = %e, "falling back to medium quality");
                    Quality::Medium
                })
            });
            slot.active_source = el.source_src.clone().filter(|s| !s.is_empty());
        }
        Ok(Some(slot))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/attributes.rs"]
mod tests;
