use super::*;

#[test]
fn create_or_get_returns_existing() {
    let mut reg = MediaRegistry::new();
    reg.create_or_get(SlotId(1), MediaKind::Image, "a.jpg").unwrap();
    let again = reg
        .create_or_get(SlotId(1), MediaKind::Video, "b.mp4")
        .unwrap();
    assert_eq!(again.kind, MediaKind::Image);
    assert_eq!(again.deferred_source, "a.jpg");
    assert_eq!(reg.len(), 1);
}

#[test]
fn empty_source_is_rejected() {
    let mut reg = MediaRegistry::new();
    assert!(matches!(
        reg.create_or_get(SlotId(1), MediaKind::Image, ""),
        Err(MediaError::Validation(_))
    ));
    assert!(reg.create_or_get(SlotId(1), MediaKind::Image, "   ").is_err());
    assert!(reg.is_empty());
}

#[test]
fn happy_path_sets_resolved_source() {
    let mut reg = MediaRegistry::new();
    reg.create_or_get(SlotId(1), MediaKind::Image, "a.jpg").unwrap();
    reg.transition(SlotId(1), MediaState::Loading, TransitionExtra::none())
        .unwrap();
    assert!(reg.get(SlotId(1)).unwrap().resolved_source().is_none());
    let d = reg
        .transition(
            SlotId(1),
            MediaState::Loaded,
            TransitionExtra::resolved("/r/a.jpg"),
        )
        .unwrap();
    assert_eq!(d.state(), MediaState::Loaded);
    assert_eq!(d.resolved_source(), Some("/r/a.jpg"));
}

#[test]
fn loaded_to_loading_is_invalid() {
    let mut reg = MediaRegistry::new();
    reg.create_or_get(SlotId(1), MediaKind::Image, "a.jpg").unwrap();
    reg.transition(SlotId(1), MediaState::Loading, TransitionExtra::none())
        .unwrap();
    reg.transition(SlotId(1), MediaState::Loaded, TransitionExtra::resolved("x"))
        .unwrap();
    let err = reg
        .transition(SlotId(1), MediaState::Loading, TransitionExtra::none())
        .unwrap_err();
    assert!(matches!(
        err,
        MediaError::InvalidTransition {
            from: MediaState::Loaded,
            to: MediaState::Loading,
            ..
        }
    ));
    assert_eq!(reg.get(SlotId(1)).unwrap().state(), MediaState::Loaded);
}

#[test]
fn extra_must_match_target_state() {
    let mut reg = MediaRegistry::new();
    reg.create_or_get(SlotId(1), MediaKind::Image, "a.jpg").unwrap();
    assert!(
        reg.transition(SlotId(1), MediaState::Loading, TransitionExtra::resolved("x"))
            .is_err()
    );
    reg.transition(SlotId(1), MediaState::Loading, TransitionExtra::none())
        .unwrap();
    assert!(
        reg.transition(SlotId(1), MediaState::Loaded, TransitionExtra::none())
            .is_err()
    );
    let d = reg.get(SlotId(1)).unwrap();
    assert_eq!(d.state(), MediaState::Loading);
    assert!(d.resolved_source().is_none());
}

#[test]
fn unknown_slot_transition_fails() {
    let mut reg = MediaRegistry::new();
    assert!(matches!(
        reg.transition(SlotId(9), MediaState::Loading, TransitionExtra::none()),
        Err(MediaError::UnknownSlot(SlotId(9)))
    ));
}

#[test]
fn ids_snapshot_allows_mutation_while_walking() {
    let mut reg = MediaRegistry::new();
    for i in [3, 1, 2] {
        reg.create_or_get(SlotId(i), MediaKind::Image, "a.jpg").unwrap();
    }
    let ids = reg.ids();
    assert_eq!(ids, vec![SlotId(1), SlotId(2), SlotId(3)]);
    for id in ids {
        if id == SlotId(2) {
            reg.remove(id);
            reg.create_or_get(SlotId(10), MediaKind::Video, "v.mp4")
                .unwrap();
        }
    }
    assert_eq!(reg.ids(), vec![SlotId(1), SlotId(3), SlotId(10)]);
}
