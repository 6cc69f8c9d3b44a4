use super::*;
use crate::export::config::ExportFormat;
use crate::scene::element::ElementKind;

const DOC: &str = r##"{
    "config": { "width": 320, "height": 180, "frameRate": 30, "duration": 2, "format": "png-sequence" },
    "elements": [
        { "id": "bg-box", "type": "rectangle", "width": 320, "height": 180, "fill": "#202020" },
        { "id": "dot", "type": "circle", "x": 10, "y": 10, "width": 20, "height": 20, "fill": "#ffcc00" }
    ],
    "animations": {
        "dot": { "tracks": [ { "property": "x", "keyframes": [ { "time": 0, "value": 10 }, { "time": 2, "value": 290 } ] } ] }
    },
    "background": { "enabled": true, "layers": [ { "type": "solid", "colorStops": [ { "color": "#000000" } ] } ] },
    "fonts": [ { "family": "Inter", "src": "fonts/Inter.ttf" } ]
}"##;

#[test]
fn parses_full_document() {
    let p = Project::from_json(DOC).unwrap();
    assert_eq!(p.config.format, ExportFormat::PngSequence);
    assert_eq!(p.config.quality, 0.8);
    assert_eq!(p.elements.len(), 2);
    assert!(matches!(p.elements[1].kind, ElementKind::Circle));
    assert_eq!(p.animations["dot"].tracks.len(), 1);
    assert!(p.background.enabled);
    assert_eq!(p.background.layers[0].opacity, 1.0);
    assert_eq!(p.fonts[0].family, "Inter");
}

#[test]
fn optional_sections_default_to_empty() {
    let p = Project::from_json(r#"{ "config": { "width": 8, "height": 8, "frameRate": 24, "duration": 1 } }"#)
        .unwrap();
    assert!(p.elements.is_empty());
    assert!(p.animations.is_empty());
    assert!(!p.background.enabled);
    assert!(p.fonts.is_empty());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Project::from_json("{ not json").unwrap_err();
    assert!(matches!(err, MotionError::Serde(_)));
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = Project::from_path("/definitely/not/here/project.json").unwrap_err();
    assert!(matches!(err, MotionError::Validation(_)));
}

#[test]
fn to_json_round_trips() {
    let p = Project::from_json(DOC).unwrap();
    let back = Project::from_json(&p.to_json().unwrap()).unwrap();
    assert_eq!(back, p);
}

#[test]
fn scene_borrows_document_parts() {
    let p = Project::from_json(DOC).unwrap();
    let scene = p.scene();
    assert_eq!(scene.elements.len(), 2);
    assert!(scene.animations.contains_key("dot"));
    assert!(std::ptr::eq(scene.background, &p.background));
}
