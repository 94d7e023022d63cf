use super::*;
use crate::render::plan::TimingLimits;
use crate::wheel::layout::PocketLabel;

fn cache() -> AssetCache {
    AssetCache::new().with_fontdb(Arc::new(usvg::fontdb::Database::new()))
}

#[test]
fn wheel_diameter_tracks_the_short_edge() {
    assert_eq!(wheel_diameter_for(Canvas::new(320, 320).unwrap()), 294);
    assert_eq!(wheel_diameter_for(Canvas::new(400, 200).unwrap()), 184);
    assert_eq!(wheel_diameter_for(Canvas::square(4).unwrap()), 8);
}

#[test]
fn bundle_requires_every_kind() {
    let c = cache();
    let full = RenderAssets::from_cache(&c, LayoutKind::American, 40).unwrap();
    assert_eq!(full.layout(), LayoutKind::American);

    let mut layers = BTreeMap::new();
    for kind in AssetKind::ALL {
        if kind != AssetKind::HitMask {
            layers.insert(kind, full.get(kind).unwrap().clone());
        }
    }
    let err = RenderAssets::new(LayoutKind::American, 40, layers).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn bundle_rejects_mis_sized_layers() {
    let c = cache();
    let small = RenderAssets::from_cache(&c, LayoutKind::European, 40).unwrap();
    let mut layers = BTreeMap::new();
    for kind in AssetKind::ALL {
        layers.insert(kind, small.get(kind).unwrap().clone());
    }
    assert!(RenderAssets::new(LayoutKind::European, 48, layers.clone()).is_err());
    assert!(RenderAssets::new(LayoutKind::American, 40, layers.clone()).is_err());
    assert!(RenderAssets::new(LayoutKind::European, 40, layers).is_ok());
}

#[test]
fn static_layers_follow_enabled_effects() {
    let canvas = Canvas::square(32).unwrap();
    let bundle =
        RenderAssets::from_cache(&cache(), LayoutKind::European, wheel_diameter_for(canvas)).unwrap();
    let anim = AnimationPlan::new(PocketLabel::Number(7), 1_000, None, &TimingLimits::default());

    let all = StaticLayers::build(&anim, &bundle, canvas, 3).unwrap();
    assert_eq!(all.background.len(), canvas.rgba_len());
    assert!(all.background.chunks_exact(4).all(|px| px[3] == 255));
    assert!(all.specular.is_some());
    let vignette = all.vignette.as_ref().unwrap();
    assert!(vignette[0] < vignette[16 * 32 + 16]);
    let popup = all.popup.as_ref().unwrap();
    let center = (16 * 32 + 16) * 4;
    assert!(popup[center + 3] > 200);
    assert_eq!(popup[3], 0);

    let bare = StaticLayers::build(&anim.clone().with_effects(vec![]), &bundle, canvas, 3).unwrap();
    assert!(bare.specular.is_none() && bare.vignette.is_none() && bare.popup.is_none());
    assert_eq!(bare.winning_index, 3);
}
