use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::dom::attributes::SlotAttributes;
use crate::foundation::core::Rect;
use crate::foundation::error::{LoadFailureKind, MediaError, MediaResult};
use crate::foundation::ids::SlotId;
use crate::loader::fetch::{LoadOutcome, ScriptedFetcherOpts};

/// One element on the simulated page.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSlot {
    /// Slot id.
    pub id: SlotId,
    /// Tag name (`img`, `video`).
    pub tag: String,
    /// Element attributes (`data-src`, `data-quality`, ...).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// `src` of the `<source>` child (video only).
    #[serde(default)]
    pub source_src: Option<String>,
    /// Layout rectangle in page coordinates.
    pub rect: Rect,
}

impl ScenarioSlot {
    /// Attribute view handed to [`crate::MediaSlot::from_attributes`].
    pub fn attributes(&self) -> SlotAttributes {
        SlotAttributes {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            source_src: self.source_src.clone(),
        }
    }
}

/// One scripted action.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum Step {
    /// Initial document scan.
    Register {
        /// Elements present at page load.
        slots: Vec<ScenarioSlot>,
    },
    /// `contentChanged`: new elements were inserted.
    ContentChanged {
        /// Elements now in the document (known ones are skipped).
        slots: Vec<ScenarioSlot>,
    },
    /// Scroll the viewport so its top edge is at `y`, then sample.
    Scroll {
        /// New scroll offset.
        y: f64,
        /// Sample time in milliseconds.
        at: u64,
    },
    /// Move one element.
    MoveSlot {
        /// Slot to move.
        id: SlotId,
        /// New layout rectangle.
        rect: Rect,
    },
    /// Complete the in-flight load of a slot.
    Complete {
        /// Slot whose load finishes.
        slot: SlotId,
        /// `None` (or absent) succeeds; otherwise the load fails with this kind.
        #[serde(default)]
        failure: Option<LoadFailureKind>,
    },
    /// Advance the clock (expires timed-out loads).
    Tick {
        /// Time in milliseconds.
        at: u64,
    },
    /// Element removed from the document.
    Remove {
        /// Slot removed.
        id: SlotId,
    },
    /// Toggle the simulated autoplay restriction.
    SetAutoplayBlocked {
        /// Reject `play()` while set.
        blocked: bool,
    },
}

/// A simulated page and the actions applied to it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Viewport at scroll offset 0.
    pub viewport: Rect,
    /// Fetcher behavior.
    #[serde(default)]
    pub fetcher: ScriptedFetcherOpts,
    /// Start with autoplay blocked.
    #[serde(default)]
    pub autoplay_blocked: bool,
    /// Actions in order.
    pub steps: Vec<Step>,
}

impl Step {
    /// Completion outcome for a [`Step::Complete`].
    pub fn outcome(failure: Option<LoadFailureKind>) -> LoadOutcome {
        match failure {
            None => LoadOutcome::Loaded,
            Some(kind) => LoadOutcome::failed(kind, format!("scripted {kind} failure")),
        }
    }
}

impl Scenario {
    /// Parse a scenario from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MediaResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MediaError::serde(format!("parse scenario JSON: {e}")))
    }

    /// Parse a scenario from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MediaError::validation(format!("open scenario JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}
