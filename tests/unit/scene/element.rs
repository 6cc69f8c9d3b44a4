use super::*;

#[test]
fn rectangle_deserializes_with_defaults() {
    let json = r##"{ "id": "a", "type": "rectangle", "x": 5, "y": 6, "width": 10, "height": 20,
                    "fill": "#ff0000", "borderRadius": 4 }"##;
    let el: DesignElement = serde_json::from_str(json).unwrap();
    assert_eq!(el.id, "a");
    assert_eq!(el.opacity, 1.0);
    assert!(el.visible);
    assert_eq!(el.blend_mode, BlendMode::Normal);
    assert_eq!(el.kind_name(), "rectangle");
    let ElementKind::Rectangle(props) = &el.kind else {
        panic!("expected rectangle");
    };
    assert_eq!(props.border_radius, 4.0);
}

#[test]
fn kinds_use_kebab_case_tags() {
    let circle: DesignElement = serde_json::from_str(r#"{ "id": "c", "type": "circle" }"#).unwrap();
    assert_eq!(circle.kind, ElementKind::Circle);

    let text: DesignElement = serde_json::from_str(
        r#"{ "id": "t", "type": "text", "text": "hi", "fontFamily": "Inter", "textAlign": "center" }"#,
    )
    .unwrap();
    let ElementKind::Text(props) = &text.kind else {
        panic!("expected text");
    };
    assert_eq!(props.text, "hi");
    assert_eq!(props.font_size, 16.0);
    assert_eq!(props.font_weight, 400.0);
    assert_eq!(props.text_align, TextAlign::Center);

    let line: DesignElement = serde_json::from_str(
        r#"{ "id": "l", "type": "line", "points": [[0, 0], [10, 5]], "dash": [4, 2], "lineCap": "round" }"#,
    )
    .unwrap();
    let ElementKind::Line(props) = &line.kind else {
        panic!("expected line");
    };
    assert_eq!(props.points, vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)]);
    assert_eq!(props.dash, vec![4.0, 2.0]);
    assert_eq!(props.line_cap, LineCap::Round);
    assert_eq!(props.line_join, LineJoin::Miter);
}

#[test]
fn unknown_kind_is_rejected() {
    assert!(serde_json::from_str::<DesignElement>(r#"{ "id": "x", "type": "star" }"#).is_err());
}

#[test]
fn blend_mode_accepts_source_over_alias() {
    let m: BlendMode = serde_json::from_str(r#""source-over""#).unwrap();
    assert_eq!(m, BlendMode::Normal);
    let m: BlendMode = serde_json::from_str(r#""color-dodge""#).unwrap();
    assert_eq!(m, BlendMode::ColorDodge);
}

#[test]
fn bounds_collapse_negative_and_non_finite_sizes() {
    let el = DesignElement::new("r", ElementKind::Circle).with_bounds(10.0, 10.0, -5.0, f64::NAN);
    let b = el.bounds();
    assert_eq!(b.width(), 0.0);
    assert_eq!(b.height(), 0.0);
    assert_eq!(el.center(), Point::new(10.0, 10.0));

    let el = DesignElement::new("r", ElementKind::Circle).with_bounds(0.0, 0.0, 40.0, 20.0);
    assert_eq!(el.center(), Point::new(20.0, 10.0));
}

#[test]
fn walk_visits_parents_before_children() {
    let inner = DesignElement::new("inner", ElementKind::Circle);
    let group = DesignElement::new(
        "group",
        ElementKind::Group(GroupProps {
            children: vec![inner],
        }),
    );
    let tail = DesignElement::new("tail", ElementKind::Circle);
    let elements = vec![group, tail];

    let mut seen = Vec::new();
    walk(&elements, &mut |el| seen.push(el.id.as_str()));
    assert_eq!(seen, ["group", "inner", "tail"]);
}

#[test]
fn serialization_round_trips_through_json() {
    let mut el = DesignElement::new(
        "img",
        ElementKind::Image(ImageProps {
            src: "a.png".to_owned(),
            border_radius: 2.0,
        }),
    )
    .with_bounds(1.0, 2.0, 3.0, 4.0);
    el.shadow = Some(Shadow::default());
    let json = serde_json::to_string(&el).unwrap();
    assert!(json.contains(r#""type":"image""#));
    let back: DesignElement = serde_json::from_str(&json).unwrap();
    assert_eq!(back, el);
}
