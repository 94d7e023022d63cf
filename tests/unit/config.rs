use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = SpinConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, SpinConfig::default());
    cfg.validate().unwrap();
    assert_eq!(cfg.render.width, 320);
    assert_eq!(cfg.encode.byte_budget, 4 << 20);
    assert_eq!(cfg.encode.hard_cap, 8 << 20);
    assert_eq!(cfg.physics.laps, 3);
    assert_eq!(cfg.cache.min_lookups, 8);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg = SpinConfig::from_json_str(
        r#"{
            "render": { "width": 200, "effects": [{ "kind": "motion_blur", "trail": 2 }, { "kind": "vignette" }] },
            "encode": { "timing": { "max_fps": 25.0 } },
            "cache": { "min_hit_rate": 0.75 }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.render.width, 200);
    assert_eq!(cfg.render.height, 320);
    assert_eq!(
        cfg.render.effects,
        vec![Effect::MotionBlur { trail: 2 }, Effect::Vignette]
    );
    assert_eq!(cfg.encode.timing.max_fps, 25.0);
    assert_eq!(cfg.encode.timing.min_fps, 8.0);
    assert_eq!(cfg.cache.min_hit_rate, 0.75);
    assert_eq!(cfg.cache.memory_ceiling_bytes, 64 << 20);
    cfg.validate().unwrap();
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = SpinConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, SpinError::Serde(_)));
    let err = SpinConfig::from_json_str(r#"{ "render": { "mode": "cinematic" } }"#).unwrap_err();
    assert!(matches!(err, SpinError::Serde(_)));
}

#[test]
fn out_of_range_values_fail_validation() {
    let mut cfg = SpinConfig::default();
    cfg.render.width = 0;
    assert!(cfg.validate().unwrap_err().is_validation());

    let mut cfg = SpinConfig::default();
    cfg.encode.quality_steps.push(0);
    assert!(cfg.validate().unwrap_err().is_validation());

    let mut cfg = SpinConfig::default();
    cfg.physics.ball_friction = -1.0;
    assert!(cfg.validate().unwrap_err().is_validation());

    let mut cfg = SpinConfig::default();
    cfg.render.fps_hint = Some(f64::INFINITY);
    assert!(cfg.validate().is_err());

    let mut cfg = SpinConfig::default();
    cfg.cache.min_hit_rate = 1.5;
    assert!(cfg.validate().is_err());
}

#[test]
fn file_round_trip_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    let mut cfg = SpinConfig::default();
    cfg.render.duration_ms = 3_000;
    std::fs::write(&path, cfg.to_json_pretty().unwrap()).unwrap();
    assert_eq!(SpinConfig::from_path(&path).unwrap(), cfg);

    let err = SpinConfig::from_path(dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn physics_params_carry_timing() {
    let p = PhysicsConfig::default().to_params(24.0, 4.0);
    assert_eq!(p.fps, 24.0);
    assert_eq!(p.duration_secs, 4.0);
    assert_eq!(p.wheel_rpm0, 10.0);
    assert_eq!(p, SpinParams { fps: 24.0, duration_secs: 4.0, ..SpinParams::default() });
}
