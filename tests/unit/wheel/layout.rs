use super::*;

#[test]
fn tables_have_expected_sizes_and_unique_labels() {
    let eu = LayoutKind::European.layout();
    let us = LayoutKind::American.layout();
    assert_eq!(eu.len(), 37);
    assert_eq!(us.len(), 38);
    eu.validate().unwrap();
    us.validate().unwrap();
    assert!(eu.index_of(PocketLabel::DoubleZero).is_err());
    assert_eq!(us.index_of(PocketLabel::DoubleZero).unwrap(), 19);
}

#[test]
fn zero_leads_both_tables() {
    for kind in [LayoutKind::European, LayoutKind::American] {
        assert_eq!(kind.layout().index_of(PocketLabel::Zero).unwrap(), 0);
    }
}

#[test]
fn every_pocket_round_trips_through_its_center_angle() {
    for kind in [LayoutKind::European, LayoutKind::American] {
        let layout = kind.layout();
        for i in 0..layout.len() {
            assert_eq!(layout.pocket_at_angle(layout.pocket_center_angle(i)), i);
        }
    }
}

#[test]
fn pocket_at_angle_wraps() {
    let layout = LayoutKind::European.layout();
    let w = layout.pocket_angular_width();
    assert_eq!(layout.pocket_at_angle(-0.5 * w), layout.len() - 1);
    assert_eq!(layout.pocket_at_angle(TAU + 0.5 * w), 0);
}

#[test]
fn labels_parse_and_reject() {
    assert_eq!("0".parse::<PocketLabel>().unwrap(), PocketLabel::Zero);
    assert_eq!("00".parse::<PocketLabel>().unwrap(), PocketLabel::DoubleZero);
    assert_eq!(" 17 ".parse::<PocketLabel>().unwrap(), PocketLabel::Number(17));
    assert!("37".parse::<PocketLabel>().is_err());
    assert!("red".parse::<PocketLabel>().is_err());
    assert_eq!(PocketLabel::Number(7).to_string(), "7");
}

#[test]
fn colors_follow_the_standard_red_set() {
    assert_eq!(PocketLabel::Zero.color(), PocketColor::Green);
    assert_eq!(PocketLabel::Number(1).color(), PocketColor::Red);
    assert_eq!(PocketLabel::Number(2).color(), PocketColor::Black);
    let reds = LayoutKind::European
        .layout()
        .pockets()
        .filter(|p| p.color == PocketColor::Red)
        .count();
    assert_eq!(reds, 18);
}

#[test]
fn layout_kind_parses_aliases() {
    assert_eq!("EU".parse::<LayoutKind>().unwrap(), LayoutKind::European);
    assert_eq!("double_zero".parse::<LayoutKind>().unwrap(), LayoutKind::American);
    assert!("french".parse::<LayoutKind>().is_err());
}
