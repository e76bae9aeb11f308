use std::collections::BTreeMap;

use crate::activation::controller::PlaybackState;
use crate::activation::playback::{RecordingSurface, SurfaceCall};
use crate::dom::attributes::MediaSlot;
use crate::foundation::core::{MediaKind, Rect, Timestamp};
use crate::foundation::error::{MediaError, MediaResult};
use crate::foundation::ids::SlotId;
use crate::loader::fetch::{LoadRequest, ScriptedFetcher};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::events::PipelineEvent;
use crate::pipeline::session::MediaPipeline;
use crate::registry::descriptor::MediaState;
use crate::scenario::model::{Scenario, ScenarioSlot, Step};

/// Final state of one slot.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotReport {
    /// Slot id.
    pub id: SlotId,
    /// Image or video.
    pub kind: MediaKind,
    /// Lifecycle state.
    pub state: MediaState,
    /// `data-src`.
    pub deferred_source: String,
    /// Source fetched, if settled.
    pub resolved_source: Option<String>,
    /// Container class list.
    pub classes: String,
    /// Failure notice.
    pub notice: Option<String>,
    /// Playback state (videos only).
    pub playback: Option<PlaybackState>,
}

/// Outcome of [`run_scenario`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScenarioReport {
    /// Slots still in the document, by id.
    pub slots: Vec<SlotReport>,
    /// Load requests in start order.
    pub requests: Vec<LoadRequest>,
    /// Playback calls in order.
    pub surface_calls: Vec<SurfaceCall>,
    /// Pipeline events in order.
    pub events: Vec<PipelineEvent>,
}

/// Run `scenario` against a fresh pipeline built from `cfg`.
#[tracing::instrument(skip_all, fields(steps = scenario.steps.len()))]
pub fn run_scenario(scenario: &Scenario, cfg: PipelineConfig) -> MediaResult<ScenarioReport> {
    let mut surface = RecordingSurface::new();
    surface.set_autoplay_blocked(scenario.autoplay_blocked);
    let fetcher = ScriptedFetcher::with_opts(scenario.fetcher.clone());
    let mut pipeline = MediaPipeline::new(cfg, fetcher, surface)?;

    let mut layout: BTreeMap<SlotId, Rect> = BTreeMap::new();
    let mut events = Vec::new();

    for (i, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(step = i, ?step, "scenario step");
        match step {
            Step::Register { slots } => {
                for slot in to_media_slots(slots, &mut layout)? {
                    pipeline.register(slot)?;
                }
            }
            Step::ContentChanged { slots } => {
                let slots = to_media_slots(slots, &mut layout)?;
                pipeline.content_changed(slots);
            }
            Step::Scroll { y, at } => {
                let viewport = scenario.viewport + kurbo::Vec2::new(0.0, *y);
                let rect_of = |id: SlotId| layout.get(&id).copied();
                pipeline.sample(viewport, &rect_of, Timestamp(*at));
            }
            Step::MoveSlot { id, rect } => {
                layout.insert(*id, *rect);
            }
            Step::Complete { slot, failure } => {
                let ticket = pipeline.ticket_for(*slot).ok_or_else(|| {
                    MediaError::validation(format!("step {i}: {slot} has no load in flight"))
                })?;
                pipeline.complete(ticket, Step::outcome(*failure));
            }
            Step::Tick { at } => pipeline.tick(Timestamp(*at)),
            Step::Remove { id } => {
                layout.remove(id);
                pipeline.remove(*id);
            }
            Step::SetAutoplayBlocked { blocked } => {
                pipeline.surface_mut().set_autoplay_blocked(*blocked);
            }
        }
        events.extend(pipeline.drain_events());
    }

    let slots = pipeline
        .registry()
        .ids()
        .into_iter()
        .filter_map(|id| pipeline.descriptor(id))
        .map(|d| SlotReport {
            id: d.id,
            kind: d.kind,
            state: d.state(),
            deferred_source: d.deferred_source.clone(),
            resolved_source: d.resolved_source().map(str::to_string),
            classes: d.container.class_list(),
            notice: d.container.notice.clone(),
            playback: (d.kind == MediaKind::Video)
                .then(|| pipeline.activation().playback_state(d.id)),
        })
        .collect();

    Ok(ScenarioReport {
        slots,
        requests: pipeline
            .fetcher()
            .started()
            .iter()
            .map(|(_, r)| r.clone())
            .collect(),
        surface_calls: pipeline.surface().calls().to_vec(),
        events,
    })
}

fn to_media_slots(
    slots: &[ScenarioSlot],
    layout: &mut BTreeMap<SlotId, Rect>,
) -> MediaResult<Vec<MediaSlot>> {
    let mut out = Vec::with_capacity(slots.len());
    for s in slots {
        layout.insert(s.id, s.rect);
        if let Some(slot) = MediaSlot::from_attributes(s.id, &s.attributes())? {
            out.push(slot);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/runner.rs"]
mod tests;
