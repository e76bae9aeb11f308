use std::collections::{BTreeMap, VecDeque};

use crate::foundation::core::{Rect, Timestamp};
use crate::foundation::error::{MediaError, MediaResult};
use crate::foundation::ids::SlotId;
use crate::sensor::geometry::{Intersection, LayoutSource, expand_root, intersect, is_intersecting};

/// How long a registration lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserveMode {
    /// Retired after the first `is_intersecting = true` event. Drives loading.
    OneShot,
    /// Every enter/leave transition is delivered until unregistered. Drives playback.
    Continuous,
}

/// Per-registration trigger margin, threshold and mode.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorOptions {
    /// Pixels added around the viewport on every side before testing.
    pub root_margin_px: f64,
    /// Minimum visible fraction in `[0, 1]`.
    pub threshold: f64,
    /// Registration lifetime.
    pub mode: ObserveMode,
}

impl SensorOptions {
    /// One-shot options.
    pub fn one_shot(root_margin_px: f64, threshold: f64) -> Self {
        Self {
            root_margin_px,
            threshold,
            mode: ObserveMode::OneShot,
        }
    }

    /// Continuous options.
    pub fn continuous(root_margin_px: f64, threshold: f64) -> Self {
        Self {
            root_margin_px,
            threshold,
            mode: ObserveMode::Continuous,
        }
    }

    /// Reject non-finite margins and thresholds outside `[0, 1]`.
    pub fn validate(&self) -> MediaResult<()> {
        if !self.root_margin_px.is_finite() {
            return Err(MediaError::validation("root_margin_px must be finite"));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(MediaError::validation("threshold must be within [0, 1]"));
        }
        Ok(())
    }
}

/// A viewport-intersection change for one slot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisibilityEvent {
    /// Slot the event is about.
    pub target: SlotId,
    /// Whether the slot meets its threshold.
    pub is_intersecting: bool,
    /// Visible fraction in `[0, 1]`.
    pub intersection_ratio: f64,
    /// When the change was observed.
    pub timestamp: Timestamp,
}

#[derive(Debug)]
struct Watch {
    opts: SensorOptions,
    last_intersecting: Option<bool>,
    last_ts: Option<Timestamp>,
}

/// Observes registered slots and queues [`VisibilityEvent`]s multiplexed by target.
///
/// Events for one target are queued in timestamp order. Unregistering a target drops its queued
/// events, so nothing is ever reported for an id after `unregister` returns.
#[derive(Debug, Default)]
pub struct VisibilitySensor {
    watches: BTreeMap<SlotId, Watch>,
    queue: VecDeque<VisibilityEvent>,
}

impl VisibilitySensor {
    /// Create a sensor with no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin observing `id`. Re-registering replaces the options and keeps the last known state.
    pub fn register(&mut self, id: SlotId, opts: SensorOptions) -> MediaResult<()> {
        opts.validate()?;
        self.watches
            .entry(id)
            .and_modify(|w| w.opts = opts)
            .or_insert(Watch {
                opts,
                last_intersecting: None,
                last_ts: None,
            });
        Ok(())
    }

    /// Stop observing `id`. Returns `true` if a registration was removed; calling it again is a
    /// no-op.
    pub fn unregister(&mut self, id: SlotId) -> bool {
        let removed = self.watches.remove(&id).is_some();
        self.queue.retain(|e| e.target != id);
        removed
    }

    /// Return `true` if `id` is observed.
    pub fn is_registered(&self, id: SlotId) -> bool {
        self.watches.contains_key(&id)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    /// Return `true` if nothing is observed.
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Number of queued, undelivered events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Test every registration against `viewport` and queue state changes.
    ///
    /// The first sample after registration always reports; later samples report only when
    /// `is_intersecting` flips. Returns the number of events queued.
    pub fn sample(&mut self, viewport: Rect, layout: &dyn LayoutSource, now: Timestamp) -> usize {
        let mut queued = 0usize;
        let mut retired = Vec::new();

        for (&id, watch) in self.watches.iter_mut() {
            if watch.last_ts.is_some_and(|t| now < t) {
                tracing::warn!(%id, now = now.0, "visibility sample older than last event; skipped");
                continue;
            }
            let hit = layout
                .rect_of(id)
                .map(|r| intersect(r, expand_root(viewport, watch.opts.root_margin_px)))
                .unwrap_or(Intersection {
                    touching: false,
                    ratio: 0.0,
                });
            let visible = is_intersecting(hit, watch.opts.threshold);
            if watch.last_intersecting == Some(visible) {
                continue;
            }

            watch.last_intersecting = Some(visible);
            watch.last_ts = Some(now);
            self.queue.push_back(VisibilityEvent {
                target: id,
                is_intersecting: visible,
                intersection_ratio: hit.ratio,
                timestamp: now,
            });
            queued += 1;

            if visible && watch.opts.mode == ObserveMode::OneShot {
                retired.push(id);
            }
        }

        for id in retired {
            self.watches.remove(&id);
        }
        queued
    }

    /// Inject an event observed by the platform.
    ///
    /// Dropped (returns `false`) if the target is not registered or the event is older than the
    /// last one seen for that target.
    pub fn deliver(&mut self, event: VisibilityEvent) -> bool {
        let Some(watch) = self.watches.get_mut(&event.target) else {
            tracing::debug!(id = %event.target, "visibility event for unobserved slot dropped");
            return false;
        };
        if watch.last_ts.is_some_and(|t| event.timestamp < t) {
            tracing::warn!(id = %event.target, "out-of-order visibility event dropped");
            return false;
        }

        let event = VisibilityEvent {
            intersection_ratio: event.intersection_ratio.clamp(0.0, 1.0),
            ..event
        };
        watch.last_intersecting = Some(event.is_intersecting);
        watch.last_ts = Some(event.timestamp);
        let retire = event.is_intersecting && watch.opts.mode == ObserveMode::OneShot;
        self.queue.push_back(event);
        if retire {
            self.watches.remove(&event.target);
        }
        true
    }

    /// Pop the oldest queued event.
    pub fn next_event(&mut self) -> Option<VisibilityEvent> {
        self.queue.pop_front()
    }

    /// Drain every queued event in order.
    pub fn drain(&mut self) -> impl Iterator<Item = VisibilityEvent> + '_ {
        self.queue.drain(..)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sensor/visibility.rs"]
mod tests;
