use std::collections::HashMap;

use crate::foundation::core::MediaKind;
use crate::foundation::error::{MediaError, MediaResult};
use crate::foundation::ids::SlotId;
use crate::registry::descriptor::{Container, MediaDescriptor, MediaState, TransitionExtra};

/// Owns every [`MediaDescriptor`], keyed by [`SlotId`].
///
/// Lookups are O(1). [`MediaRegistry::ids`] returns a snapshot so callers can register or remove
/// slots while walking it.
#[derive(Debug, Default)]
pub struct MediaRegistry {
    descriptors: HashMap<SlotId, MediaDescriptor>,
}

impl MediaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the descriptor for `id`, creating a `Pending` one if absent.
    ///
    /// An existing descriptor is returned untouched even if `kind`/`deferred_source` differ.
    pub fn create_or_get(
        &mut self,
        id: SlotId,
        kind: MediaKind,
        deferred_source: &str,
    ) -> MediaResult<&mut MediaDescriptor> {
        if deferred_source.trim().is_empty() {
            return Err(MediaError::validation(format!(
                "{id}: deferred source must be non-empty"
            )));
        }
        Ok(self
            .descriptors
            .entry(id)
            .or_insert_with(|| MediaDescriptor::new(id, kind, deferred_source.to_string())))
    }

    /// Apply a lifecycle transition.
    ///
    /// Fails with [`MediaError::InvalidTransition`] when the move is illegal and with
    /// [`MediaError::Validation`] when `extra` does not match the target state. The descriptor is
    /// left unchanged on error.
    pub fn transition(
        &mut self,
        id: SlotId,
        to: MediaState,
        extra: TransitionExtra,
    ) -> MediaResult<&MediaDescriptor> {
        let desc = self
            .descriptors
            .get_mut(&id)
            .ok_or(MediaError::UnknownSlot(id))?;
        let from = desc.state;
        if !from.can_transition_to(to) {
            return Err(MediaError::InvalidTransition { id, from, to });
        }
        match (to.has_resolved_source(), extra.resolved_source) {
            (true, Some(src)) => desc.resolved_source = Some(src),
            (true, None) => {
                return Err(MediaError::validation(format!(
                    "{id}: entering {to:?} requires a resolved source"
                )));
            }
            (false, Some(_)) => {
                return Err(MediaError::validation(format!(
                    "{id}: {to:?} must not carry a resolved source"
                )));
            }
            (false, None) => {}
        }
        desc.state = to;
        Ok(desc)
    }

    /// Borrow the descriptor for `id`.
    pub fn get(&self, id: SlotId) -> Option<&MediaDescriptor> {
        self.descriptors.get(&id)
    }

    /// Mutably borrow the descriptor for `id`.
    ///
    /// Lifecycle fields stay private; use [`MediaRegistry::transition`] to change state.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut MediaDescriptor> {
        self.descriptors.get_mut(&id)
    }

    /// Mutably borrow the container of `id`.
    pub fn container_mut(&mut self, id: SlotId) -> MediaResult<&mut Container> {
        self.descriptors
            .get_mut(&id)
            .map(|d| &mut d.container)
            .ok_or(MediaError::UnknownSlot(id))
    }

    /// Drop the descriptor for `id`, returning it if present.
    pub fn remove(&mut self, id: SlotId) -> Option<MediaDescriptor> {
        self.descriptors.remove(&id)
    }

    /// Return `true` if `id` is registered.
    pub fn contains(&self, id: SlotId) -> bool {
        self.descriptors.contains_key(&id)
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Return `true` if no slot is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Sorted snapshot of registered ids.
    pub fn ids(&self) -> Vec<SlotId> {
        let mut ids: Vec<SlotId> = self.descriptors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate descriptors in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &MediaDescriptor> {
        self.descriptors.values()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/store.rs"]
mod tests;
