use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SpinError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SpinError::generation("x")
            .to_string()
            .contains("generation error:")
    );
    assert!(
        SpinError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(SpinError::cancelled("x").to_string().contains("cancelled:"));
    assert!(
        SpinError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SpinError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_validation());
}
