use super::*;
use crate::activation::controller::PlaybackState;
use crate::activation::playback::{RecordingSurface, SurfaceCall};
use crate::foundation::core::Quality;
use crate::loader::fetch::{ScriptedFetcher, ScriptedFetcherOpts};
use crate::registry::descriptor::ContainerClass;

type Pipe = MediaPipeline<ScriptedFetcher, RecordingSurface>;

const VIEW: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);
const ON_SCREEN: Rect = Rect::new(0.0, 100.0, 400.0, 400.0);
const OFF_SCREEN: Rect = Rect::new(0.0, 5000.0, 400.0, 5300.0);

fn pipeline() -> Pipe {
    with_fetcher(ScriptedFetcher::new())
}

fn with_fetcher(fetcher: ScriptedFetcher) -> Pipe {
    MediaPipeline::new(PipelineConfig::default(), fetcher, RecordingSurface::new()).unwrap()
}

fn at(rect: Rect) -> impl Fn(SlotId) -> Option<Rect> {
    move |_| Some(rect)
}

fn load_starts(events: &[PipelineEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PipelineEvent::LoadStarted { .. }))
        .count()
}

#[test]
fn image_loads_through_resize_endpoint() {
    let mut p = pipeline();
    let id = SlotId(1);
    assert!(p.register(MediaSlot::image(id, "foo.jpg")).unwrap());
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(10));

    let expected = "/.netlify/images?url=/assets/images/foo.jpg&w=800&q=75";
    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Loading);
    assert_eq!(p.fetcher().started()[0].1.source, expected);
    assert!(!p.is_awaiting_visibility(id));

    let ticket = p.ticket_for(id).unwrap();
    assert!(p.complete(ticket, LoadOutcome::Loaded));

    let d = p.descriptor(id).unwrap();
    assert_eq!(d.state(), MediaState::Loaded);
    assert_eq!(d.resolved_source(), Some(expected));
    assert_eq!(d.active_source.as_deref(), Some(expected));
    assert_eq!(d.container.class_list(), "loaded");
    assert_eq!(p.in_flight(), 0);
    assert_eq!(
        p.drain_events(),
        vec![
            PipelineEvent::LoadStarted {
                slot: id,
                ticket,
                source: expected.to_string(),
            },
            PipelineEvent::Loaded {
                slot: id,
                source: expected.to_string(),
            },
        ]
    );
}

#[test]
fn resized_source_is_not_rewrapped() {
    let mut p = pipeline();
    let src = "/.netlify/images?url=/assets/images/x.jpg&w=400&q=50";
    p.register(MediaSlot::image(SlotId(1), src)).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));
    assert_eq!(p.fetcher().started()[0].1.source, src);
}

#[test]
fn offscreen_slot_waits_for_visibility() {
    let mut p = pipeline();
    let id = SlotId(1);
    p.register(MediaSlot::image(id, "a.jpg")).unwrap();

    p.sample(VIEW, &at(OFF_SCREEN), Timestamp(1));
    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Pending);
    assert!(p.is_awaiting_visibility(id));
    assert!(p.fetcher().started().is_empty());

    p.sample(VIEW, &at(ON_SCREEN), Timestamp(2));
    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Loading);
}

#[test]
fn failed_video_degrades_and_still_plays() {
    let mut p = with_fetcher(ScriptedFetcher::with_opts(ScriptedFetcherOpts {
        immediate: false,
        fail_matching: vec!["broken".to_string()],
    }));
    let id = SlotId(7);
    p.register(MediaSlot::video(id, "/v/broken.mp4")).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));

    let d = p.descriptor(id).unwrap();
    assert_eq!(d.state(), MediaState::Degraded);
    let source = d.resolved_source().unwrap();
    assert!(source.starts_with("https://images.unsplash.com/"));
    assert!(source.ends_with("?w=800&q=80"));
    assert_eq!(d.container.class_list(), "loaded degraded");
    assert!(!d.container.has(ContainerClass::Error));
    assert_eq!(d.container.notice.as_deref(), Some("Video Failed to Load"));
    assert_eq!(p.surface().calls(), &[SurfaceCall::Play(id)]);

    let events = p.drain_events();
    assert!(events.contains(&PipelineEvent::Failed {
        slot: id,
        kind: LoadFailureKind::Network,
    }));
}

#[test]
fn video_with_matching_source_is_not_reloaded() {
    let mut p = pipeline();
    let id = SlotId(1);
    p.register(
        MediaSlot::video(id, "/v/run.mp4")
            .with_active_source("https://cdn.example/v/run.mp4")
            .with_quality(Quality::High),
    )
    .unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));

    let request = &p.fetcher().started()[0].1;
    assert!(!request.reload);
    assert_eq!(request.quality, Some(Quality::High));
    assert_eq!(
        p.descriptor(id).unwrap().active_source.as_deref(),
        Some("https://cdn.example/v/run.mp4")
    );
}

#[test]
fn continuous_playback_follows_visibility() {
    let mut p = pipeline();
    let id = SlotId(1);
    p.register(MediaSlot::video(id, "/v/a.mp4")).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));
    let ticket = p.ticket_for(id).unwrap();
    p.complete(ticket, LoadOutcome::Loaded);
    assert_eq!(p.activation().playback_state(id), PlaybackState::Playing);

    p.sample(VIEW, &at(OFF_SCREEN), Timestamp(2));
    p.sample(VIEW, &at(OFF_SCREEN), Timestamp(3));
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(4));
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(5));

    assert_eq!(
        p.surface().calls(),
        &[
            SurfaceCall::Play(id),
            SurfaceCall::Pause(id),
            SurfaceCall::Play(id)
        ]
    );
}

#[test]
fn discovery_fires_once_per_slot() {
    let mut p = pipeline();
    let id = SlotId(1);
    p.register(MediaSlot::image(id, "a.jpg")).unwrap();
    for (t, rect) in [(1, ON_SCREEN), (2, OFF_SCREEN), (3, ON_SCREEN), (4, ON_SCREEN)] {
        p.sample(VIEW, &at(rect), Timestamp(t));
    }
    assert_eq!(load_starts(&p.drain_events()), 1);
    assert_eq!(p.fetcher().started().len(), 1);
    assert!(!p.is_awaiting_visibility(id));
}

#[test]
fn expired_load_times_out_into_fallback() {
    let cfg = PipelineConfig {
        load_timeout_ms: Some(1_000),
        ..PipelineConfig::default()
    };
    let mut p = MediaPipeline::new(cfg, ScriptedFetcher::new(), RecordingSurface::new()).unwrap();
    let id = SlotId(1);
    p.register(MediaSlot::image(id, "slow.jpg")).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(100));
    let ticket = p.ticket_for(id).unwrap();

    p.tick(Timestamp(1_099));
    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Loading);

    p.tick(Timestamp(1_100));
    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Degraded);
    assert_eq!(p.fetcher().cancelled(), &[ticket]);
    assert!(p.drain_events().contains(&PipelineEvent::Failed {
        slot: id,
        kind: LoadFailureKind::Timeout,
    }));

    assert!(!p.complete(ticket, LoadOutcome::Loaded));
    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Degraded);
}

#[test]
fn removal_cancels_load_and_ignores_late_completion() {
    let mut p = pipeline();
    let id = SlotId(3);
    p.register(MediaSlot::image(id, "a.jpg")).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));
    let ticket = p.ticket_for(id).unwrap();

    assert!(p.remove(id));
    assert_eq!(p.fetcher().cancelled(), &[ticket]);
    assert!(p.descriptor(id).is_none());
    let events = p.drain_events();
    assert_eq!(
        &events[events.len() - 2..],
        &[
            PipelineEvent::Failed {
                slot: id,
                kind: LoadFailureKind::Cancelled,
            },
            PipelineEvent::Removed {
                slot: id,
                cancelled_load: true,
            },
        ]
    );

    assert!(!p.complete(ticket, LoadOutcome::Loaded));
    assert!(p.drain_events().is_empty());
    assert!(!p.remove(id));
}

#[test]
fn synchronous_completion_settles_within_sample() {
    let mut p = with_fetcher(ScriptedFetcher::with_opts(ScriptedFetcherOpts {
        immediate: true,
        ..ScriptedFetcherOpts::default()
    }));
    let id = SlotId(1);
    p.register(MediaSlot::image(id, "a.jpg")).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));

    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Loaded);
    assert_eq!(p.in_flight(), 0);
}

#[test]
fn content_changed_registers_only_new_valid_slots() {
    let mut p = pipeline();
    p.register(MediaSlot::image(SlotId(1), "a.jpg")).unwrap();
    let added = p.content_changed([
        MediaSlot::image(SlotId(1), "other.jpg"),
        MediaSlot::image(SlotId(2), "b.jpg"),
        MediaSlot::image(SlotId(3), "   "),
    ]);
    assert_eq!(added, 1);
    assert_eq!(p.registry().len(), 2);
    assert_eq!(p.descriptor(SlotId(1)).unwrap().deferred_source, "a.jpg");
}

#[test]
fn rejected_autoplay_is_swallowed() {
    let mut p = with_fetcher(ScriptedFetcher::with_opts(ScriptedFetcherOpts {
        immediate: true,
        ..ScriptedFetcherOpts::default()
    }));
    p.surface_mut().set_autoplay_blocked(true);
    let id = SlotId(1);
    p.register(MediaSlot::video(id, "/v/a.mp4")).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));

    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Loaded);
    assert_eq!(p.activation().playback_state(id), PlaybackState::Paused);
    assert!(p
        .drain_events()
        .contains(&PipelineEvent::PlaybackRejected { slot: id }));
}

#[test]
fn delivered_events_drive_the_same_path() {
    let mut p = pipeline();
    let id = SlotId(1);
    p.register(MediaSlot::image(id, "a.jpg")).unwrap();
    let event = VisibilityEvent {
        target: id,
        is_intersecting: true,
        intersection_ratio: 0.4,
        timestamp: Timestamp(5),
    };
    assert!(p.deliver(SensorChannel::Discovery, event));
    assert_eq!(p.descriptor(id).unwrap().state(), MediaState::Loading);

    // Discovery is retired; a repeat is dropped.
    assert!(!p.deliver(SensorChannel::Discovery, event));
    assert!(!p.deliver(
        SensorChannel::Playback,
        VisibilityEvent {
            target: SlotId(99),
            ..event
        }
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = PipelineConfig {
        load_timeout_ms: Some(0),
        ..PipelineConfig::default()
    };
    assert!(MediaPipeline::new(cfg, ScriptedFetcher::new(), RecordingSurface::new()).is_err());
}

#[test]
fn empty_fallback_list_leaves_slot_failed() {
    let mut cfg = PipelineConfig::default();
    cfg.fallback.sources.clear();
    let fetcher = ScriptedFetcher::with_opts(ScriptedFetcherOpts {
        immediate: false,
        fail_matching: vec!["bad".to_string()],
    });
    let mut p = MediaPipeline::new(cfg, fetcher, RecordingSurface::new()).unwrap();
    let id = SlotId(1);
    p.register(MediaSlot::image(id, "bad.jpg")).unwrap();
    p.sample(VIEW, &at(ON_SCREEN), Timestamp(1));

    let d = p.descriptor(id).unwrap();
    assert_eq!(d.state(), MediaState::Failed);
    assert_eq!(d.resolved_source(), None);
    assert_eq!(d.container.class_list(), "error");
    assert_eq!(d.container.notice.as_deref(), Some("Image Failed to Load"));
}

#[test]
fn removing_an_idle_slot_reports_no_cancellation() {
    let mut p = pipeline();
    let id = SlotId(4);
    p.register(MediaSlot::image(id, "a.jpg")).unwrap();
    assert!(p.remove(id));
    assert_eq!(
        p.drain_events(),
        vec![PipelineEvent::Removed {
            slot: id,
            cancelled_load: false,
        }]
    );
    assert!(p.fetcher().cancelled().is_empty());
}
