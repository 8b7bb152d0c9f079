use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReframeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReframeError::missing_node("x")
            .to_string()
            .contains("missing node:")
    );
    assert!(
        ReframeError::mutation("x")
            .to_string()
            .contains("mutation error:")
    );
    assert!(
        ReframeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn font_load_names_family_and_style() {
    let err = ReframeError::FontLoad {
        family: "Inter".to_string(),
        style: "Bold".to_string(),
        reason: "not installed".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("Inter Bold"));
    assert!(msg.contains("not installed"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReframeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
