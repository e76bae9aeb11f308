use crate::foundation::ids::SlotId;

/// The environment refused to start playback (autoplay policy, no user gesture, ...).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("playback rejected for {id}: {reason}")]
pub struct PlaybackRejected {
    /// Slot whose `play()` was refused.
    pub id: SlotId,
    /// Reason given by the environment.
    pub reason: String,
}

/// Presentation-side control of video elements.
pub trait PlaybackSurface {
    /// Start playback of `id`.
    fn play(&mut self, id: SlotId) -> Result<(), PlaybackRejected>;
    /// Pause playback of `id`.
    fn pause(&mut self, id: SlotId);
}

/// One call made on a [`RecordingSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "call", content = "slot")]
pub enum SurfaceCall {
    /// `play()` was attempted.
    Play(SlotId),
    /// `pause()` was called.
    Pause(SlotId),
}

/// Surface that records calls and can simulate an autoplay-restricted environment.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    block_autoplay: bool,
}

impl RecordingSurface {
    /// Surface that accepts every `play()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every `play()` while `blocked` is set.
    pub fn set_autoplay_blocked(&mut self, blocked: bool) {
        self.block_autoplay = blocked;
    }

    /// Calls in order.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Calls concerning `id`, in order.
    pub fn calls_for(&self, id: SlotId) -> Vec<SurfaceCall> {
        self.calls
            .iter()
            .copied()
            .filter(|c| match c {
                SurfaceCall::Play(s) | SurfaceCall::Pause(s) => *s == id,
            })
            .collect()
    }
}

impl PlaybackSurface for RecordingSurface {
    fn play(&mut self, id: SlotId) -> Result<(), PlaybackRejected> {
        self.calls.push(SurfaceCall::Play(id));
        if self.block_autoplay {
            return Err(PlaybackRejected {
                id,
                reason: "autoplay blocked".to_string(),
            });
        }
        Ok(())
    }

    fn pause(&mut self, id: SlotId) {
        self.calls.push(SurfaceCall::Pause(id));
    }
}
