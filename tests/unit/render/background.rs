use super::*;
use crate::scene::element::BlendMode;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn at(buf: &[u8], w: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * w + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

fn gradient(kind: LayerKind, angle: f64, stops: &[(&str, f64)]) -> BackgroundConfig {
    BackgroundConfig {
        enabled: true,
        layers: vec![BackgroundLayer {
            kind,
            color_stops: stops
                .iter()
                .map(|(c, p)| ColorStop {
                    color: (*c).to_owned(),
                    position: *p,
                })
                .collect(),
            angle,
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
        }],
    }
}

#[test]
fn disabled_background_is_untouched() {
    let mut buf = vec![7u8; 16];
    let mut bg = BackgroundConfig::solid("#ff0000");
    bg.enabled = false;
    paint_background(&mut buf, canvas(2, 2), &bg).unwrap();
    assert_eq!(buf, vec![7u8; 16]);
}

#[test]
fn solid_layer_fills_canvas() {
    let mut buf = vec![0u8; 4 * 3 * 2];
    paint_background(&mut buf, canvas(3, 2), &BackgroundConfig::solid("#ff0000")).unwrap();
    assert_eq!(buf, [255, 0, 0, 255].repeat(6));
}

#[test]
fn linear_gradient_follows_css_angle() {
    let (w, h) = (100, 10);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let bg = gradient(LayerKind::LinearGradient, 90.0, &[("#000000", 0.0), ("#ffffff", 1.0)]);
    paint_background(&mut buf, canvas(w, h), &bg).unwrap();
    let left = at(&buf, w, 0, 5)[0];
    let mid = at(&buf, w, 50, 5)[0];
    let right = at(&buf, w, 99, 5)[0];
    assert!(left < 5, "{left}");
    assert!((120..=136).contains(&mid), "{mid}");
    assert!(right > 250, "{right}");
    assert_eq!(at(&buf, w, 30, 0), at(&buf, w, 30, 9));

    let mut buf = vec![0u8; (w * h * 4) as usize];
    let bg = gradient(LayerKind::LinearGradient, 180.0, &[("#000000", 0.0), ("#ffffff", 1.0)]);
    paint_background(&mut buf, canvas(w, h), &bg).unwrap();
    assert!(at(&buf, w, 50, 0)[0] < at(&buf, w, 50, 9)[0]);
}

#[test]
fn radial_gradient_grows_from_center() {
    let (w, h) = (21, 21);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let bg = gradient(LayerKind::RadialGradient, 0.0, &[("#ff0000", 0.0), ("#0000ff", 1.0)]);
    paint_background(&mut buf, canvas(w, h), &bg).unwrap();
    let center = at(&buf, w, 10, 10);
    let corner = at(&buf, w, 0, 0);
    assert!(center[0] > 240 && center[2] < 15, "{center:?}");
    assert!(corner[2] > corner[0], "{corner:?}");
    assert_eq!(at(&buf, w, 0, 10), at(&buf, w, 20, 10));
}

#[test]
fn layers_composite_with_opacity() {
    let mut bg = BackgroundConfig::solid("#ff0000");
    let mut top = BackgroundConfig::solid("#0000ff").layers.remove(0);
    top.opacity = 0.5;
    bg.layers.push(top);

    let mut buf = vec![0u8; 4];
    paint_background(&mut buf, canvas(1, 1), &bg).unwrap();
    assert_eq!(buf, vec![127, 0, 128, 255]);
}

#[test]
fn unparseable_layers_are_skipped() {
    let mut bg = BackgroundConfig::solid("#00ff00");
    bg.layers.push(gradient(LayerKind::Solid, 0.0, &[("not-a-color", 0.0)]).layers.remove(0));
    let mut buf = vec![0u8; 4];
    paint_background(&mut buf, canvas(1, 1), &bg).unwrap();
    assert_eq!(buf, vec![0, 255, 0, 255]);
}

#[test]
fn sample_stops_interpolates_and_clamps() {
    let stops = vec![(0.25, [0, 0, 0, 255]), (0.75, [200, 100, 0, 255])];
    assert_eq!(sample_stops(&stops, 0.0), [0, 0, 0, 255]);
    assert_eq!(sample_stops(&stops, 0.5), [100, 50, 0, 255]);
    assert_eq!(sample_stops(&stops, 1.0), [200, 100, 0, 255]);
    assert_eq!(sample_stops(&stops, f64::NAN), [0, 0, 0, 255]);
    assert_eq!(sample_stops(&[], 0.5), [0, 0, 0, 0]);
}

#[test]
fn stops_are_sorted_and_transparent_is_accepted() {
    let stops = parse_stops(&[
        ColorStop {
            color: "#ffffff".to_owned(),
            position: 1.0,
        },
        ColorStop {
            color: "transparent".to_owned(),
            position: 0.0,
        },
    ])
    .unwrap();
    assert_eq!(stops[0], (0.0, [0, 0, 0, 0]));
    assert_eq!(stops[1], (1.0, [255, 255, 255, 255]));
    assert!(parse_stops(&[]).is_none());
}
