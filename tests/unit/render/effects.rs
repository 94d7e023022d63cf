use super::*;

#[test]
fn over_opaque_src_replaces_dst() {
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
}

#[test]
fn over_zero_opacity_is_identity() {
    let d = [1, 2, 3, 4];
    assert_eq!(over(d, [255, 255, 255, 255], 0.0), d);
    assert_eq!(over(d, [0, 0, 0, 0], 1.0), d);
}

#[test]
fn over_half_alpha_src_on_opaque_dst() {
    let out = over([0, 0, 255, 255], [128, 0, 0, 128], 1.0);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[2], 127);
}

#[test]
fn screen_never_darkens() {
    let d = [200, 200, 200, 255];
    let out = screen(d, [200, 10, 0, 255], 1.0);
    assert_eq!(out[0], 243);
    assert!(out[1] >= d[1]);
    assert_eq!(out[2], d[2]);
    assert_eq!(out[3], 255);
}

#[test]
fn screen_with_black_or_zero_opacity_is_identity() {
    let d = [12, 34, 56, 255];
    assert_eq!(screen(d, [0, 0, 0, 255], 1.0), d);
    assert_eq!(screen(d, [255, 255, 255, 255], 0.0), d);
}

#[test]
fn vignette_scales_color_but_not_alpha() {
    let mut px = vec![200, 100, 50, 255, 200, 100, 50, 255];
    vignette_in_place(&mut px, &[255, 128]).unwrap();
    assert_eq!(&px[..4], &[200, 100, 50, 255]);
    assert_eq!(&px[4..], &[100, 50, 25, 255]);
    assert!(vignette_in_place(&mut px, &[1]).is_err());
}

#[test]
fn buffer_ops_reject_mismatched_lengths() {
    let mut d = vec![0u8; 8];
    assert!(over_in_place(&mut d, &[0; 4], 1.0).is_err());
    assert!(screen_in_place(&mut d, &[0; 7], 1.0).is_err());
    over_in_place(&mut d, &[9, 9, 9, 255, 0, 0, 0, 0], 1.0).unwrap();
    assert_eq!(d, vec![9, 9, 9, 255, 0, 0, 0, 0]);
}

#[test]
fn glow_brightens_toward_color() {
    let out = glow([0, 0, 0, 255], [255, 215, 0], 1.0);
    assert_eq!(out, [255, 215, 0, 255]);
}
