use std::fmt;

use crate::foundation::error::{MediaError, MediaResult};

pub use kurbo::Rect;

/// Monotonic event time in milliseconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Timestamp `ms` milliseconds later, saturating at `u64::MAX`.
    pub fn after_ms(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

/// What kind of element a slot holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// `<img>` element.
    Image,
    /// `<video>` element.
    Video,
}

impl MediaKind {
    /// Human label used in failure notices ("Image", "Video").
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
        }
    }
}

/// Video quality hint taken from `data-quality`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// `low`
    Low,
    /// `medium` (default)
    #[default]
    Medium,
    /// `high`
    High,
}

impl Quality {
    /// Parse an attribute value. Matching is case-insensitive and ignores surrounding whitespace.
    pub fn parse(value: &str) -> MediaResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(MediaError::validation(format!(
                "unknown quality hint '{other}' (expected low|medium|high)"
            ))),
        }
    }

    /// Attribute spelling of this quality.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
