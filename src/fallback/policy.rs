use crate::foundation::error::{MediaError, MediaResult};
use crate::loader::resolve::ResizeEndpoint;

/// How the substitute source is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FallbackSelection {
    /// Cycle through the list in order.
    RoundRobin,
    /// Seeded pseudo-random pick; the same seed yields the same sequence.
    Random {
        /// Generator seed.
        seed: u64,
    },
}

impl Default for FallbackSelection {
    fn default() -> Self {
        Self::Random { seed: 0x5EED }
    }
}

/// Known-good placeholder sources and how they are requested.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    /// Placeholder sources. Absolute URLs get `w`/`q` query parameters, relative paths go through
    /// the resize endpoint.
    pub sources: Vec<String>,
    /// `w` parameter for absolute sources.
    pub width: u32,
    /// `q` parameter for absolute sources.
    pub quality: u8,
    /// Selection strategy.
    pub selection: FallbackSelection,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                "https://images.unsplash.com/photo-1558769132-cb1aea458c5e".to_string(),
                "https://images.unsplash.com/photo-1509631179647-0177331693ae".to_string(),
                "https://images.unsplash.com/photo-1581338834647-b0fb40704e21".to_string(),
            ],
            width: 800,
            quality: 80,
            selection: FallbackSelection::default(),
        }
    }
}

impl FallbackConfig {
    /// Check sizes are usable. An empty source list is allowed and disables substitution.
    pub fn validate(&self) -> MediaResult<()> {
        if self.width == 0 {
            return Err(MediaError::config("fallback width must be > 0"));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(MediaError::config("fallback quality must be within 1..=100"));
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(MediaError::config("fallback sources must be non-empty"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct Rng64 {
    state: u64,
}

impl Rng64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Supplies substitute sources after a failed load.
#[derive(Debug)]
pub struct FallbackPolicy {
    cfg: FallbackConfig,
    next_index: usize,
    rng: Rng64,
}

impl FallbackPolicy {
    /// Build a policy from config.
    pub fn new(cfg: FallbackConfig) -> Self {
        let seed = match cfg.selection {
            FallbackSelection::Random { seed } => seed,
            FallbackSelection::RoundRobin => 0,
        };
        Self {
            cfg,
            next_index: 0,
            rng: Rng64::new(seed),
        }
    }

    /// Choose the next substitute and shape it for fetching. `None` when no source is configured.
    pub fn pick(&mut self, endpoint: &ResizeEndpoint) -> Option<String> {
        let n = self.cfg.sources.len();
        if n == 0 {
            return None;
        }
        let i = match self.cfg.selection {
            FallbackSelection::RoundRobin => {
                let i = self.next_index % n;
                self.next_index = self.next_index.wrapping_add(1);
                i
            }
            FallbackSelection::Random { .. } => (self.rng.next_u64() % n as u64) as usize,
        };
        Some(self.shape(&self.cfg.sources[i], endpoint))
    }

    /// Return `true` if `source` could have been produced by [`FallbackPolicy::pick`].
    pub fn is_fallback(&self, source: &str, endpoint: &ResizeEndpoint) -> bool {
        self.cfg
            .sources
            .iter()
            .any(|s| self.shape(s, endpoint) == source)
    }

    fn shape(&self, source: &str, endpoint: &ResizeEndpoint) -> String {
        if is_absolute_url(source) {
            let sep = if source.contains('?') { '&' } else { '?' };
            format!("{source}{sep}w={}&q={}", self.cfg.width, self.cfg.quality)
        } else {
            endpoint.rewrite(source)
        }
    }
}

fn is_absolute_url(source: &str) -> bool {
    source.starts_with("https://") || source.starts_with("http://")
}

#[cfg(test)]
#[path = "../../tests/unit/fallback/policy.rs"]
mod tests;
