use super::*;

#[test]
fn rewrites_plain_paths_through_endpoint() {
    let ep = ResizeEndpoint::default();
    assert_eq!(
        ep.rewrite("foo.jpg"),
        "/.netlify/images?url=/assets/images/foo.jpg&w=800&q=75"
    );
    assert_eq!(
        ep.rewrite("/assets/images/look/foo.jpg"),
        "/.netlify/images?url=/assets/images/foo.jpg&w=800&q=75"
    );
}

#[test]
fn already_resized_sources_are_not_wrapped_again() {
    let ep = ResizeEndpoint::default();
    let src = "/.netlify/images?url=/assets/images/a.jpg&w=400&q=60";
    assert!(ep.is_resized(src));
    assert_eq!(ep.rewrite(src), src);
    assert_eq!(ep.rewrite(&ep.rewrite("a.jpg")), ep.rewrite("a.jpg"));
}

#[test]
fn file_name_drops_query_and_fragment() {
    assert_eq!(file_name("a/b/c.png?v=2"), "c.png");
    assert_eq!(file_name("c.png#top"), "c.png");
    assert_eq!(file_name("c.png"), "c.png");
    assert_eq!(file_name("https://cdn.example/x/y.webp"), "y.webp");
}

#[test]
fn endpoint_validation() {
    assert!(ResizeEndpoint::default().validate().is_ok());
    let bad = ResizeEndpoint {
        quality: 0,
        ..ResizeEndpoint::default()
    };
    assert!(bad.validate().is_err());
    let bad = ResizeEndpoint {
        endpoint: " ".to_string(),
        ..ResizeEndpoint::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn video_rewrites_only_when_source_differs() {
    let plan = plan_video("/v/run.mp4", None, None);
    assert!(plan.rewrite);
    assert_eq!(plan.quality, Quality::Medium);
    assert_eq!(plan.source, "/v/run.mp4");

    let plan = plan_video(
        "/v/run.mp4",
        Some("https://site.example/v/run.mp4"),
        Some(Quality::High),
    );
    assert!(!plan.rewrite);
    assert_eq!(plan.quality, Quality::High);

    let plan = plan_video("/v/run.mp4", Some("/v/placeholder.mp4"), Some(Quality::Low));
    assert!(plan.rewrite);
    assert_eq!(plan.quality, Quality::Low);
}
