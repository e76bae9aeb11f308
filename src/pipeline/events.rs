use crate::foundation::error::LoadFailureKind;
use crate::foundation::ids::{LoadTicket, SlotId};

/// Observable outcome of pipeline work, drained with [`crate::MediaPipeline::drain_events`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum PipelineEvent {
    /// A fetch was started.
    LoadStarted {
        /// Slot being loaded.
        slot: SlotId,
        /// Ticket of the load.
        ticket: LoadTicket,
        /// Source requested.
        source: String,
    },
    /// Real content is attached.
    Loaded {
        /// Slot.
        slot: SlotId,
        /// Source attached.
        source: String,
    },
    /// A load failed, or was cancelled because its slot was removed.
    Failed {
        /// Slot.
        slot: SlotId,
        /// Failure classification.
        kind: LoadFailureKind,
    },
    /// A fallback source was attached after a failure.
    Degraded {
        /// Slot.
        slot: SlotId,
        /// Fallback source attached.
        source: String,
    },
    /// `play()` succeeded.
    PlaybackStarted {
        /// Slot.
        slot: SlotId,
    },
    /// `pause()` was issued.
    PlaybackPaused {
        /// Slot.
        slot: SlotId,
    },
    /// `play()` was refused by the environment.
    PlaybackRejected {
        /// Slot.
        slot: SlotId,
    },
    /// The slot left the document.
    Removed {
        /// Slot.
        slot: SlotId,
        /// `true` if an in-flight load was cancelled.
        cancelled_load: bool,
    },
}
