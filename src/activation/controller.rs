use std::collections::{HashMap, HashSet};

use crate::activation::playback::PlaybackSurface;
use crate::foundation::core::MediaKind;
use crate::foundation::error::{MediaError, MediaResult};
use crate::foundation::ids::SlotId;
use crate::pipeline::events::PipelineEvent;
use crate::registry::descriptor::{ContainerClass, Placeholder};
use crate::registry::store::MediaRegistry;
use crate::sensor::visibility::VisibilityEvent;

/// Last command issued to a video element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Not playing (never started, paused, or `play()` was rejected).
    Paused,
    /// `play()` succeeded and no pause followed.
    Playing,
}

/// Swaps placeholders for content and keeps video playback in step with visibility.
///
/// Playback commands are idempotent: `play` is only issued to a paused element and `pause` only
/// to a playing one.
#[derive(Debug)]
pub struct ActivationController {
    fade_ms: u32,
    visible: HashSet<SlotId>,
    playback: HashMap<SlotId, PlaybackState>,
}

impl ActivationController {
    /// Controller whose placeholders fade out over `fade_ms`.
    pub fn new(fade_ms: u32) -> Self {
        Self {
            fade_ms,
            visible: HashSet::new(),
            playback: HashMap::new(),
        }
    }

    /// Return `true` if `id` is currently in the continuous-mode visible set.
    pub fn is_visible(&self, id: SlotId) -> bool {
        self.visible.contains(&id)
    }

    /// Last playback command for `id`.
    pub fn playback_state(&self, id: SlotId) -> PlaybackState {
        self.playback
            .get(&id)
            .copied()
            .unwrap_or(PlaybackState::Paused)
    }

    /// Attach the resolved source of a `Loaded` slot and start video playback if visible.
    pub(crate) fn on_loaded(
        &mut self,
        registry: &mut MediaRegistry,
        id: SlotId,
        surface: &mut dyn PlaybackSurface,
        events: &mut Vec<PipelineEvent>,
    ) -> MediaResult<()> {
        let kind = self.attach(registry, id)?;
        let container = registry.container_mut(id)?;
        container.remove(ContainerClass::Loading);
        container.add(ContainerClass::Loaded);
        self.after_attach(kind, id, surface, events);
        Ok(())
    }

    /// Attach the fallback source of a `Degraded` slot and style it as degraded.
    pub(crate) fn on_degraded(
        &mut self,
        registry: &mut MediaRegistry,
        id: SlotId,
        surface: &mut dyn PlaybackSurface,
        events: &mut Vec<PipelineEvent>,
    ) -> MediaResult<()> {
        let kind = self.attach(registry, id)?;
        let container = registry.container_mut(id)?;
        container.remove(ContainerClass::Loading);
        container.remove(ContainerClass::Error);
        container.add(ContainerClass::Loaded);
        container.add(ContainerClass::Degraded);
        container.notice = Some(failure_notice(kind));
        self.after_attach(kind, id, surface, events);
        Ok(())
    }

    /// Style a `Failed` slot as broken. A later [`Self::on_degraded`] replaces this style.
    pub(crate) fn on_failed(
        &mut self,
        registry: &mut MediaRegistry,
        id: SlotId,
    ) -> MediaResult<()> {
        let kind = registry.get(id).ok_or(MediaError::UnknownSlot(id))?.kind;
        let container = registry.container_mut(id)?;
        container.remove(ContainerClass::Loading);
        container.add(ContainerClass::Error);
        container.notice = Some(failure_notice(kind));
        Ok(())
    }

    /// Apply a continuous-mode visibility change.
    ///
    /// The visible set is always updated; play/pause only happens once the slot is settled with
    /// a source.
    pub(crate) fn on_visibility(
        &mut self,
        registry: &MediaRegistry,
        event: VisibilityEvent,
        surface: &mut dyn PlaybackSurface,
        events: &mut Vec<PipelineEvent>,
    ) {
        let id = event.target;
        if event.is_intersecting {
            self.visible.insert(id);
        } else {
            self.visible.remove(&id);
        }

        let Some(desc) = registry.get(id) else {
            return;
        };
        if desc.kind != MediaKind::Video || !desc.state().is_settled() {
            return;
        }
        if event.is_intersecting {
            self.try_play(id, surface, events);
        } else {
            self.pause(id, surface, events);
        }
    }

    /// Drop all state for a removed slot.
    pub(crate) fn forget(&mut self, id: SlotId) {
        self.visible.remove(&id);
        self.playback.remove(&id);
    }

    fn attach(&self, registry: &mut MediaRegistry, id: SlotId) -> MediaResult<MediaKind> {
        let desc = registry.get_mut(id).ok_or(MediaError::UnknownSlot(id))?;
        let source = desc
            .resolved_source()
            .ok_or_else(|| MediaError::validation(format!("{id}: no resolved source to attach")))?
            .to_string();
        desc.active_source = Some(source);
        desc.container.placeholder = Placeholder::FadingOut {
            duration_ms: self.fade_ms,
        };
        Ok(desc.kind)
    }

    fn after_attach(
        &mut self,
        kind: MediaKind,
        id: SlotId,
        surface: &mut dyn PlaybackSurface,
        events: &mut Vec<PipelineEvent>,
    ) {
        if kind == MediaKind::Video && self.visible.contains(&id) {
            self.try_play(id, surface, events);
        }
    }

    fn try_play(
        &mut self,
        id: SlotId,
        surface: &mut dyn PlaybackSurface,
        events: &mut Vec<PipelineEvent>,
    ) {
        if self.playback_state(id) == PlaybackState::Playing {
            return;
        }
        match surface.play(id) {
            Ok(()) => {
                self.playback.insert(id, PlaybackState::Playing);
                events.push(PipelineEvent::PlaybackStarted { slot: id });
            }
            Err(err) => {
                tracing::debug!(%id, reason = %err.reason, "video playback rejected");
                self.playback.insert(id, PlaybackState::Paused);
                events.push(PipelineEvent::PlaybackRejected { slot: id });
            }
        }
    }

    fn pause(
        &mut self,
        id: SlotId,
        surface: &mut dyn PlaybackSurface,
        events: &mut Vec<PipelineEvent>,
    ) {
        if self.playback_state(id) != PlaybackState::Playing {
            return;
        }
        surface.pause(id);
        self.playback.insert(id, PlaybackState::Paused);
        events.push(PipelineEvent::PlaybackPaused { slot: id });
    }
}

fn failure_notice(kind: MediaKind) -> String {
    format!("{} Failed to Load", kind.label())
}

#[cfg(test)]
#[path = "../../tests/unit/activation/controller.rs"]
mod tests;
