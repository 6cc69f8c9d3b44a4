use super::*;
use crate::scene::element::{GroupProps, ImageProps};

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 255, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn image_el(id: &str, src: &str) -> DesignElement {
    DesignElement::new(
        id,
        ElementKind::Image(ImageProps {
            src: src.to_owned(),
            border_radius: 0.0,
        }),
    )
    .with_bounds(0.0, 0.0, 10.0, 10.0)
}

#[test]
fn preload_decodes_each_element_once() {
    let mut source = crate::assets::source::MemoryAssetSource::new();
    source.insert("a.png", png_bytes(4, 2));
    let elements = vec![image_el("one", "a.png"), image_el("two", "a.png")];

    let mut cache = ImageCache::new();
    assert_eq!(cache.preload(&elements, &source).unwrap(), 2);
    assert_eq!(cache.len(), 2);
    let (_, w, h) = cache.get("one").unwrap();
    assert_eq!((w, h), (4, 2));

    assert_eq!(cache.preload(&elements, &source).unwrap(), 0);
}

#[test]
fn preload_walks_groups_and_skips_empty_src() {
    let mut source = crate::assets::source::MemoryAssetSource::new();
    source.insert("a.png", png_bytes(1, 1));
    let group = DesignElement::new(
        "g",
        ElementKind::Group(GroupProps {
            children: vec![image_el("nested", "a.png"), image_el("blank", "")],
        }),
    );

    let mut cache = ImageCache::new();
    assert_eq!(cache.preload(&[group], &source).unwrap(), 1);
    assert!(cache.get("nested").is_some());
    assert!(cache.get("blank").is_none());
}

#[test]
fn changed_src_is_redecoded() {
    let mut source = crate::assets::source::MemoryAssetSource::new();
    source.insert("a.png", png_bytes(1, 1));
    source.insert("b.png", png_bytes(3, 3));

    let mut cache = ImageCache::new();
    cache.preload(&[image_el("x", "a.png")], &source).unwrap();
    assert_eq!(cache.preload(&[image_el("x", "b.png")], &source).unwrap(), 1);
    assert_eq!(cache.get("x").map(|(_, w, _)| w), Some(3));
}

#[test]
fn failed_decode_is_an_asset_error_naming_the_element() {
    let mut source = crate::assets::source::MemoryAssetSource::new();
    source.insert("broken.png", b"nope".to_vec());

    let mut cache = ImageCache::new();
    let err = cache
        .preload(&[image_el("pic", "broken.png")], &source)
        .unwrap_err();
    assert!(matches!(&err, MotionError::Asset(msg) if msg.contains("pic") && msg.contains("broken.png")));
    assert!(cache.is_empty());
}

#[test]
fn clear_drops_entries() {
    let mut source = crate::assets::source::MemoryAssetSource::new();
    source.insert("a.png", png_bytes(1, 1));
    let mut cache = ImageCache::new();
    cache.preload(&[image_el("x", "a.png")], &source).unwrap();
    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get("x").is_none());
}
