use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MotionError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MotionError::asset("x").to_string().contains("asset error:"));
    assert!(MotionError::render("x").to_string().contains("render error:"));
    assert!(MotionError::encode("x").to_string().contains("encode error:"));
    assert!(
        MotionError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(MotionError::Cancelled.to_string(), "export cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MotionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_cancelled());
    assert!(MotionError::Cancelled.is_cancelled());
}
