use crate::foundation::ids::SlotId;
use crate::registry::descriptor::MediaState;

/// Convenience result type used across the pipeline.
pub type MediaResult<T> = Result<T, MediaError>;

/// Why a single load did not produce content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailureKind {
    /// Transport-level failure.
    Network,
    /// Bytes arrived but could not be decoded.
    Decode,
    /// No completion before the configured deadline.
    Timeout,
    /// The slot was removed while the load was in flight.
    Cancelled,
}

impl LoadFailureKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for LoadFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    /// A state change that the lifecycle does not allow.
    #[error("invalid transition for {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Slot whose descriptor rejected the move.
        id: SlotId,
        /// Current state.
        from: MediaState,
        /// Requested state.
        to: MediaState,
    },

    /// A load failed for one slot.
    #[error("load failure for {id} ({kind}): {message}")]
    LoadFailure {
        /// Slot whose load failed.
        id: SlotId,
        /// Failure classification.
        kind: LoadFailureKind,
        /// Detail reported by the fetcher.
        message: String,
    },

    /// The id is not registered.
    #[error("unknown slot: {0}")]
    UnknownSlot(SlotId),

    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MediaError {
    /// Build a [`MediaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MediaError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MediaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`MediaError::LoadFailure`] value.
    pub fn load_failure(id: SlotId, kind: LoadFailureKind, msg: impl Into<String>) -> Self {
        Self::LoadFailure {
            id,
            kind,
            message: msg.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
