use std::collections::VecDeque;

use crate::activation::controller::ActivationController;
use crate::activation::playback::PlaybackSurface;
use crate::dom::attributes::MediaSlot;
use crate::fallback::policy::FallbackPolicy;
use crate::foundation::core::{MediaKind, Rect, Timestamp};
use crate::foundation::error::{LoadFailureKind, MediaError, MediaResult};
use crate::foundation::ids::{LoadTicket, SlotId};
use crate::loader::fetch::{FetchStart, LoadOutcome, LoadRequest, LoadTracker, MediaFetcher};
use crate::loader::resolve::plan_video;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::events::PipelineEvent;
use crate::registry::descriptor::{MediaDescriptor, MediaState, TransitionExtra};
use crate::registry::store::MediaRegistry;
use crate::sensor::geometry::LayoutSource;
use crate::sensor::visibility::{VisibilityEvent, VisibilitySensor};

/// Which sensor an injected [`VisibilityEvent`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    /// One-shot observation that triggers loading.
    Discovery,
    /// Continuous observation that drives video play/pause.
    Playback,
}

/// Viewport-driven media activation pipeline.
///
/// One instance owns the registry, both sensors, in-flight load tracking, activation and
/// fallback state. It is constructed once and passed by reference to whatever registers slots.
///
/// All work is cooperative and single-threaded: entry points queue sensor events and completions,
/// then process them to quiescence before returning. Synchronous completions reported by the
/// fetcher are queued rather than handled re-entrantly.
pub struct MediaPipeline<F: MediaFetcher, S: PlaybackSurface> {
    cfg: PipelineConfig,
    registry: MediaRegistry,
    discovery: VisibilitySensor,
    playback: VisibilitySensor,
    loads: LoadTracker,
    activation: ActivationController,
    fallback: FallbackPolicy,
    fetcher: F,
    surface: S,
    ready: VecDeque<(LoadTicket, LoadOutcome)>,
    events: Vec<PipelineEvent>,
    now: Timestamp,
}

impl<F: MediaFetcher, S: PlaybackSurface> MediaPipeline<F, S> {
    /// Build a pipeline after validating `cfg`.
    pub fn new(cfg: PipelineConfig, fetcher: F, surface: S) -> MediaResult<Self> {
        cfg.validate()?;
        Ok(Self {
            activation: ActivationController::new(cfg.fade_ms),
            fallback: FallbackPolicy::new(cfg.fallback.clone()),
            cfg,
            registry: MediaRegistry::new(),
            discovery: VisibilitySensor::new(),
            playback: VisibilitySensor::new(),
            loads: LoadTracker::new(),
            fetcher,
            surface,
            ready: VecDeque::new(),
            events: Vec::new(),
            now: Timestamp::default(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Read access to every descriptor.
    pub fn registry(&self) -> &MediaRegistry {
        &self.registry
    }

    /// Descriptor for `id`.
    pub fn descriptor(&self, id: SlotId) -> Option<&MediaDescriptor> {
        self.registry.get(id)
    }

    /// Activation state (visible set, playback state).
    pub fn activation(&self) -> &ActivationController {
        &self.activation
    }

    /// The fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The fetcher, mutably.
    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    /// The playback surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The playback surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of loads in flight.
    pub fn in_flight(&self) -> usize {
        self.loads.len()
    }

    /// Ticket of the in-flight load for `id`, if any.
    pub fn ticket_for(&self, id: SlotId) -> Option<LoadTicket> {
        self.loads.ticket_for(id)
    }

    /// Return `true` if the discovery sensor still observes `id`.
    pub fn is_awaiting_visibility(&self, id: SlotId) -> bool {
        self.discovery.is_registered(id)
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<PipelineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Register one slot. Returns `true` if it was new.
    ///
    /// Known ids are left untouched, so re-registering never restarts a load.
    #[tracing::instrument(level = "debug", skip(self, slot), fields(id = %slot.id))]
    pub fn register(&mut self, slot: MediaSlot) -> MediaResult<bool> {
        if self.registry.contains(slot.id) {
            return Ok(false);
        }
        let preset = slot.preset.unwrap_or(self.cfg.default_discovery);
        let discovery_opts = self.cfg.sensors.discovery(preset);
        let playback_opts = self.cfg.sensors.playback;

        let desc = self
            .registry
            .create_or_get(slot.id, slot.kind, &slot.deferred_source)?;
        desc.quality = slot.quality;
        desc.active_source = slot.active_source;

        self.discovery.register(slot.id, discovery_opts)?;
        if slot.kind == MediaKind::Video {
            self.playback.register(slot.id, playback_opts)?;
        }
        Ok(true)
    }

    /// Re-scan after a `contentChanged` signal: register every slot not seen before.
    ///
    /// A slot that fails validation is logged and skipped; the others are still registered.
    /// Returns the number of newly registered slots.
    pub fn content_changed(&mut self, slots: impl IntoIterator<Item = MediaSlot>) -> usize {
        let mut added = 0usize;
        for slot in slots {
            let id = slot.id;
            match self.register(slot) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(e) => tracing::error!(%id, error = %e, "slot skipped during re-scan"),
            }
        }
        added
    }

    /// The slot's element left the document: stop observing it, cancel its load and drop its
    /// descriptor. Returns `false` for unknown ids.
    pub fn remove(&mut self, id: SlotId) -> bool {
        self.discovery.unregister(id);
        self.playback.unregister(id);
        self.activation.forget(id);
        let cancelled = self.loads.cancel_slot(id);
        if let Some(inflight) = &cancelled {
            self.fetcher.cancel(inflight.ticket);
            self.ready.retain(|(t, _)| *t != inflight.ticket);
        }
        if self.registry.remove(id).is_none() {
            return false;
        }
        if cancelled.is_some() {
            tracing::debug!(%id, "in-flight load cancelled by removal");
            self.events.push(PipelineEvent::Failed {
                slot: id,
                kind: LoadFailureKind::Cancelled,
            });
        }
        self.events.push(PipelineEvent::Removed {
            slot: id,
            cancelled_load: cancelled.is_some(),
        });
        true
    }

    /// Sample both sensors against the current layout and process the resulting transitions.
    pub fn sample(&mut self, viewport: Rect, layout: &dyn LayoutSource, now: Timestamp) {
        self.advance_clock(now);
        self.discovery.sample(viewport, layout, now);
        self.playback.sample(viewport, layout, now);
        self.pump();
    }

    /// Inject an event observed by the platform. Returns `false` if the sensor dropped it.
    pub fn deliver(&mut self, channel: SensorChannel, event: VisibilityEvent) -> bool {
        self.advance_clock(event.timestamp);
        let accepted = match channel {
            SensorChannel::Discovery => self.discovery.deliver(event),
            SensorChannel::Playback => self.playback.deliver(event),
        };
        self.pump();
        accepted
    }

    /// Report completion of the load identified by `ticket`.
    ///
    /// Returns `false` if the ticket is unknown, already completed, timed out or cancelled.
    pub fn complete(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> bool {
        let accepted = self.finish_load(ticket, outcome);
        self.pump();
        accepted
    }

    /// Advance the clock and fail every load whose deadline has passed.
    pub fn tick(&mut self, now: Timestamp) {
        self.advance_clock(now);
        for ticket in self.loads.expired(now) {
            self.fetcher.cancel(ticket);
            self.finish_load(
                ticket,
                LoadOutcome::failed(LoadFailureKind::Timeout, "load deadline exceeded"),
            );
        }
        self.pump();
    }

    fn advance_clock(&mut self, now: Timestamp) {
        self.now = self.now.max(now);
    }

    /// Process queued sensor events and completions until nothing is left.
    fn pump(&mut self) {
        loop {
            let mut progressed = false;
            while let Some(event) = self.discovery.next_event() {
                progressed = true;
                if event.is_intersecting {
                    self.begin_load(event.target);
                }
            }
            while let Some(event) = self.playback.next_event() {
                progressed = true;
                self.activation.on_visibility(
                    &self.registry,
                    event,
                    &mut self.surface,
                    &mut self.events,
                );
            }
            while let Some((ticket, outcome)) = self.ready.pop_front() {
                progressed = true;
                self.finish_load(ticket, outcome);
            }
            if !progressed {
                break;
            }
        }
    }

    fn begin_load(&mut self, id: SlotId) {
        // One-shot: discovery ends with the first intersecting event.
        self.discovery.unregister(id);
        if let Err(e) = self.try_begin_load(id) {
            tracing::error!(%id, error = %e, "could not start load");
        }
    }

    fn try_begin_load(&mut self, id: SlotId) -> MediaResult<()> {
        let desc = self.registry.get(id).ok_or(MediaError::UnknownSlot(id))?;
        if desc.state() != MediaState::Pending {
            tracing::debug!(%id, state = ?desc.state(), "slot already past discovery");
            return Ok(());
        }

        let request = match desc.kind {
            MediaKind::Image => LoadRequest {
                slot: id,
                kind: MediaKind::Image,
                source: self.cfg.resize.rewrite(&desc.deferred_source),
                quality: None,
                reload: false,
            },
            MediaKind::Video => {
                let plan = plan_video(
                    &desc.deferred_source,
                    desc.active_source.as_deref(),
                    desc.quality,
                );
                LoadRequest {
                    slot: id,
                    kind: MediaKind::Video,
                    source: plan.source,
                    quality: Some(plan.quality),
                    reload: plan.rewrite,
                }
            }
        };

        self.registry
            .transition(id, MediaState::Loading, TransitionExtra::none())?;
        if request.reload
            && let Some(desc) = self.registry.get_mut(id)
        {
            desc.active_source = Some(request.source.clone());
        }

        let ticket = self
            .loads
            .begin(request.clone(), self.now, self.cfg.load_timeout_ms)?;
        self.events.push(PipelineEvent::LoadStarted {
            slot: id,
            ticket,
            source: request.source.clone(),
        });

        match self.fetcher.start(ticket, &request) {
            Ok(FetchStart::Pending) => {}
            Ok(FetchStart::Ready(outcome)) => self.ready.push_back((ticket, outcome)),
            Err(e) => self.ready.push_back((
                ticket,
                LoadOutcome::failed(LoadFailureKind::Network, e.to_string()),
            )),
        }
        Ok(())
    }

    fn finish_load(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> bool {
        let Some(inflight) = self.loads.finish(ticket) else {
            tracing::debug!(%ticket, "completion for unknown or settled load ignored");
            return false;
        };
        let id = inflight.request.slot;
        let result = match outcome {
            LoadOutcome::Loaded => self.settle_loaded(id, inflight.request.source),
            LoadOutcome::Failed { kind, message } => {
                let err = MediaError::load_failure(id, kind, message);
                tracing::error!(
                    source = %inflight.request.source,
                    error = %err,
                    "media failed to load"
                );
                self.settle_failed(id, kind)
            }
        };
        if let Err(e) = result {
            tracing::error!(%id, error = %e, "completion could not be applied");
        }
        true
    }

    fn settle_loaded(&mut self, id: SlotId, source: String) -> MediaResult<()> {
        self.registry.transition(
            id,
            MediaState::Loaded,
            TransitionExtra::resolved(source.clone()),
        )?;
        self.events.push(PipelineEvent::Loaded { slot: id, source });
        self.activation
            .on_loaded(&mut self.registry, id, &mut self.surface, &mut self.events)
    }

    fn settle_failed(&mut self, id: SlotId, kind: LoadFailureKind) -> MediaResult<()> {
        self.registry
            .transition(id, MediaState::Failed, TransitionExtra::none())?;
        self.events.push(PipelineEvent::Failed { slot: id, kind });
        self.activation.on_failed(&mut self.registry, id)?;

        let Some(source) = self.fallback.pick(&self.cfg.resize) else {
            tracing::error!(%id, "no fallback source configured; slot left failed");
            return Ok(());
        };
        self.registry.transition(
            id,
            MediaState::Degraded,
            TransitionExtra::resolved(source.clone()),
        )?;
        self.events.push(PipelineEvent::Degraded { slot: id, source });
        self.activation
            .on_degraded(&mut self.registry, id, &mut self.surface, &mut self.events)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/session.rs"]
mod tests;
