use std::collections::BTreeSet;

use crate::foundation::core::{MediaKind, Quality};
use crate::foundation::ids::SlotId;

/// Lifecycle state of one media slot.
///
/// `Pending -> Loading -> {Loaded | Failed}`, then `Failed -> Degraded`. `Loaded` and `Degraded`
/// are settled: no further load attempt happens for that descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaState {
    /// Registered, waiting for its first visibility.
    Pending,
    /// A load is in flight.
    Loading,
    /// Real content is attached.
    Loaded,
    /// The load failed and no substitute has been applied yet.
    Failed,
    /// A fallback source replaced the failed one.
    Degraded,
}

impl MediaState {
    /// Return `true` if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: MediaState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Loading)
                | (Self::Loading, Self::Loaded)
                | (Self::Loading, Self::Failed)
                | (Self::Failed, Self::Degraded)
        )
    }

    /// `Loaded` or `Degraded`.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Loaded | Self::Degraded)
    }

    /// States that carry a resolved source.
    pub fn has_resolved_source(self) -> bool {
        self.is_settled()
    }
}

/// CSS state hooks toggled on a slot's container.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContainerClass {
    /// `loading`
    Loading,
    /// `loaded`
    Loaded,
    /// `error`
    Error,
    /// `degraded`
    Degraded,
}

impl ContainerClass {
    /// Class name as it appears in the document.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Error => "error",
            Self::Degraded => "degraded",
        }
    }
}

/// The blurred/spinner affordance shown before content arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Placeholder {
    /// Still covering the slot.
    #[default]
    Visible,
    /// Fading out after content was attached.
    FadingOut {
        /// Fade duration in milliseconds.
        duration_ms: u32,
    },
    /// Removed.
    Hidden,
}

/// Owning layout slot of a media element and its presentation state.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Container {
    classes: BTreeSet<ContainerClass>,
    /// Loading affordance state.
    pub placeholder: Placeholder,
    /// Failure text shown inside the slot.
    pub notice: Option<String>,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            classes: BTreeSet::from([ContainerClass::Loading]),
            placeholder: Placeholder::Visible,
            notice: None,
        }
    }
}

impl Container {
    /// Return `true` if `class` is set.
    pub fn has(&self, class: ContainerClass) -> bool {
        self.classes.contains(&class)
    }

    /// Add `class`.
    pub fn add(&mut self, class: ContainerClass) {
        self.classes.insert(class);
    }

    /// Remove `class`.
    pub fn remove(&mut self, class: ContainerClass) {
        self.classes.remove(&class);
    }

    /// Set classes in stable order.
    pub fn classes(&self) -> impl Iterator<Item = ContainerClass> + '_ {
        self.classes.iter().copied()
    }

    /// Space-separated class list, e.g. `"loaded degraded"`.
    pub fn class_list(&self) -> String {
        self.classes
            .iter()
            .map(|c| c.css_name())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The pipeline's record of one media slot.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaDescriptor {
    /// Stable slot identifier.
    pub id: SlotId,
    /// Image or video.
    pub kind: MediaKind,
    /// Not-yet-loaded source from `data-src`.
    pub deferred_source: String,
    /// Optional `data-quality` hint (video only).
    pub quality: Option<Quality>,
    /// Source currently attached to the element (the `<source>` child for video).
    pub active_source: Option<String>,
    pub(crate) resolved_source: Option<String>,
    pub(crate) state: MediaState,
    /// Presentation state of the owning container.
    pub container: Container,
}

impl MediaDescriptor {
    pub(crate) fn new(id: SlotId, kind: MediaKind, deferred_source: String) -> Self {
        Self {
            id,
            kind,
            deferred_source,
            quality: None,
            active_source: None,
            resolved_source: None,
            state: MediaState::Pending,
            container: Container::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MediaState {
        self.state
    }

    /// URL actually fetched; `Some` iff the state is settled.
    pub fn resolved_source(&self) -> Option<&str> {
        self.resolved_source.as_deref()
    }
}

/// Extra data attached to a [`crate::MediaRegistry::transition`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionExtra {
    /// Resolved source; required when entering a settled state, forbidden otherwise.
    pub resolved_source: Option<String>,
}

impl TransitionExtra {
    /// No extra data.
    pub fn none() -> Self {
        Self::default()
    }

    /// Carry a resolved source.
    pub fn resolved(source: impl Into<String>) -> Self {
        Self {
            resolved_source: Some(source.into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/descriptor.rs"]
mod tests;
