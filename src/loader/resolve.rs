use crate::foundation::core::Quality;
use crate::foundation::error::{MediaError, MediaResult};

/// Image resize endpoint contract: `<endpoint>?url=<asset_dir><file>&w=<width>&q=<quality>`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeEndpoint {
    /// Endpoint path, e.g. `/.netlify/images`.
    pub endpoint: String,
    /// Directory prefix the endpoint resolves originals from.
    pub asset_dir: String,
    /// Target width in pixels.
    pub width: u32,
    /// Encoder quality `1..=100`.
    pub quality: u8,
}

impl Default for ResizeEndpoint {
    fn default() -> Self {
        Self {
            endpoint: "/.netlify/images".to_string(),
            asset_dir: "/assets/images/".to_string(),
            width: 800,
            quality: 75,
        }
    }
}

impl ResizeEndpoint {
    /// Check the endpoint is usable.
    pub fn validate(&self) -> MediaResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(MediaError::config("resize endpoint must be non-empty"));
        }
        if self.width == 0 {
            return Err(MediaError::config("resize width must be > 0"));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(MediaError::config("resize quality must be within 1..=100"));
        }
        Ok(())
    }

    /// Return `true` if `source` already goes through this endpoint.
    pub fn is_resized(&self, source: &str) -> bool {
        source.contains(self.endpoint.as_str())
    }

    /// Rewrite `source` through the endpoint, or return it unchanged if it is already resized.
    ///
    /// Only the file name of `source` is kept; the endpoint resolves it against `asset_dir`.
    pub fn rewrite(&self, source: &str) -> String {
        if self.is_resized(source) {
            return source.to_string();
        }
        format!(
            "{}?url={}{}&w={}&q={}",
            self.endpoint,
            self.asset_dir,
            file_name(source),
            self.width,
            self.quality
        )
    }
}

/// Last `/`-separated segment of `source`, ignoring any query or fragment.
pub fn file_name(source: &str) -> &str {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    path.rsplit('/').next().unwrap_or(path)
}

/// How a video slot's playable source should be updated.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoPlan {
    /// Source to attach.
    pub source: String,
    /// Quality variant to request.
    pub quality: Quality,
    /// `true` if the `<source>` must be rewritten and the media reloaded.
    pub rewrite: bool,
}

/// Pick the playable source for a video slot.
///
/// The `<source>` is only rewritten when it does not already reference `deferred`, which avoids
/// restarting a download the element has already begun.
pub fn plan_video(deferred: &str, active: Option<&str>, hint: Option<Quality>) -> VideoPlan {
    let rewrite = !active.is_some_and(|a| a.contains(deferred));
    VideoPlan {
        source: deferred.to_string(),
        quality: hint.unwrap_or_default(),
        rewrite,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/resolve.rs"]
mod tests;
