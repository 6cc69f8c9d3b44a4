use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

const SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2">
  <rect width="4" height="2" fill="#ff0000"/>
</svg>"##;

#[test]
fn decode_image_premultiplies() {
    let img = decode_image(&png_bytes(2, 3, [255, 0, 0, 128])).unwrap();
    assert_eq!((img.width, img.height), (2, 3));
    assert_eq!(img.rgba8_premul.len(), 2 * 3 * 4);
    assert_eq!(&img.rgba8_premul[0..4], &[128, 0, 0, 128]);
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn sniffs_svg_documents() {
    assert!(looks_like_svg(SVG));
    assert!(looks_like_svg(b"\xef\xbb\xbf  <?xml version=\"1.0\"?><svg/>"));
    assert!(!looks_like_svg(&png_bytes(1, 1, [0, 0, 0, 255])));
    assert!(!looks_like_svg(b"<html></html>"));
}

#[test]
fn svg_rasterizes_at_intrinsic_or_target_size() {
    let img = rasterize_svg(SVG, None).unwrap();
    assert_eq!((img.width, img.height), (4, 2));
    assert_eq!(&img.rgba8_premul[0..4], &[255, 0, 0, 255]);

    let img = decode_any(SVG, Some((8, 8))).unwrap();
    assert_eq!((img.width, img.height), (8, 8));
    let center = ((4 * 8 + 4) * 4) as usize;
    assert_eq!(&img.rgba8_premul[center..center + 4], &[255, 0, 0, 255]);
}

#[test]
fn oversized_svg_target_is_rejected() {
    assert!(rasterize_svg(SVG, Some((20_000, 10))).is_err());
}

#[test]
fn paint_conversion_checks_dimensions() {
    let ok = decode_image(&png_bytes(3, 3, [0, 255, 0, 255])).unwrap();
    assert!(image_to_paint(&ok).is_ok());

    let bad = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![0; 3]),
    };
    assert!(image_to_paint(&bad).is_err());
}
