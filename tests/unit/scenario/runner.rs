use super::*;
use crate::foundation::error::LoadFailureKind;

fn run(json: &str) -> ScenarioReport {
    let scenario = Scenario::from_reader(json.as_bytes()).unwrap();
    run_scenario(&scenario, PipelineConfig::default()).unwrap()
}

const GALLERY: &str = r#"{
  "viewport": { "x0": 0, "y0": 0, "x1": 1000, "y1": 800 },
  "steps": [
    { "op": "register", "slots": [
      { "id": 1, "tag": "img", "attributes": { "data-src": "hero.jpg" },
        "rect": { "x0": 0, "y0": 0, "x1": 500, "y1": 300 } },
      { "id": 2, "tag": "img", "attributes": { "data-src": "far.jpg" },
        "rect": { "x0": 0, "y0": 3000, "x1": 500, "y1": 3300 } },
      { "id": 3, "tag": "video",
        "attributes": { "data-src": "/v/clip.mp4", "data-quality": "low" },
        "rect": { "x0": 0, "y0": 400, "x1": 500, "y1": 700 } },
      { "id": 4, "tag": "div", "attributes": { "data-src": "ignored.jpg" },
        "rect": { "x0": 0, "y0": 0, "x1": 10, "y1": 10 } }
    ] },
    { "op": "scroll", "y": 0, "at": 10 },
    { "op": "complete", "slot": 1 },
    { "op": "complete", "slot": 3, "failure": "decode" }
  ]
}"#;

#[test]
fn gallery_scenario_settles_visible_slots() {
    let report = run(GALLERY);

    let ids: Vec<SlotId> = report.slots.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![SlotId(1), SlotId(2), SlotId(3)]);

    let hero = &report.slots[0];
    assert_eq!(hero.state, MediaState::Loaded);
    assert_eq!(hero.classes, "loaded");
    assert_eq!(hero.playback, None);

    let far = &report.slots[1];
    assert_eq!(far.state, MediaState::Pending);
    assert_eq!(far.classes, "loading");

    let clip = &report.slots[2];
    assert_eq!(clip.state, MediaState::Degraded);
    assert_eq!(clip.classes, "loaded degraded");
    assert_eq!(clip.playback, Some(PlaybackState::Playing));

    assert_eq!(report.requests.len(), 2);
    assert!(report.events.contains(&PipelineEvent::Failed {
        slot: SlotId(3),
        kind: LoadFailureKind::Decode,
    }));
}

#[test]
fn completing_an_idle_slot_is_an_error() {
    let scenario = Scenario::from_reader(
        r#"{
          "viewport": { "x0": 0, "y0": 0, "x1": 100, "y1": 100 },
          "steps": [ { "op": "complete", "slot": 1 } ]
        }"#
        .as_bytes(),
    )
    .unwrap();
    assert!(run_scenario(&scenario, PipelineConfig::default()).is_err());
}

#[test]
fn scrolling_and_removal() {
    let report = run(
        r#"{
          "viewport": { "x0": 0, "y0": 0, "x1": 1000, "y1": 800 },
          "fetcher": { "immediate": true },
          "steps": [
            { "op": "register", "slots": [
              { "id": 1, "tag": "img", "attributes": { "data-src": "a.jpg" },
                "rect": { "x0": 0, "y0": 2000, "x1": 500, "y1": 2300 } },
              { "id": 2, "tag": "img", "attributes": { "data-src": "b.jpg" },
                "rect": { "x0": 0, "y0": 4000, "x1": 500, "y1": 4300 } }
            ] },
            { "op": "scroll", "y": 0, "at": 1 },
            { "op": "scroll", "y": 1800, "at": 2 },
            { "op": "remove", "id": 2 }
          ]
        }"#,
    );
    assert_eq!(report.slots.len(), 1);
    assert_eq!(report.slots[0].state, MediaState::Loaded);
    assert_eq!(
        report.events.last(),
        Some(&PipelineEvent::Removed {
            slot: SlotId(2),
            cancelled_load: false,
        })
    );
}
