use super::*;

#[test]
fn small_gif_is_clean() {
    let art = EncodedArtifact::new(vec![0; 100], FormatTag::Gif);
    let r = analyze_size(&art, 60, 20.0, 1_000, 2_000);
    assert!(r.is_clean());
    assert!(r.suggestions.is_empty());
    assert!(r.within_hard_cap());
}

#[test]
fn flags_every_shortfall() {
    let art = EncodedArtifact::new(vec![0; 3_000], FormatTag::Apng);
    let r = analyze_size(&art, 150, 30.0, 1_000, 2_000);
    assert_eq!(
        r.issues,
        vec![
            SizeIssue::ExceedsHardCap,
            SizeIssue::ExceedsTarget,
            SizeIssue::FrameCountHigh,
            SizeIssue::FpsHigh,
            SizeIssue::InefficientFormat,
        ]
    );
    assert_eq!(r.suggestions.len(), 5);
    assert!(!r.within_hard_cap());
}

#[test]
fn over_budget_but_under_cap() {
    let art = EncodedArtifact::new(vec![0; 1_500], FormatTag::Gif);
    let r = analyze_size(&art, 10, 24.0, 1_000, 2_000);
    assert_eq!(r.issues, vec![SizeIssue::ExceedsTarget]);
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["issues"][0], "exceeds_target");
    assert_eq!(json["format"], "gif");
}
