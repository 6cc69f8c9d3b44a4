use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{MotionError, MotionResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode a raster image (PNG, JPEG, GIF, WebP, ...) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> MotionResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Cheap content sniff for SVG documents.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Largest edge an SVG is rasterized at.
const SVG_MAX_DIM: u32 = 16_384;

/// Parse and rasterize an SVG document.
///
/// `target` is the on-canvas size in pixels; when absent the document's intrinsic size is used.
/// The document is stretched to fill the raster.
pub fn rasterize_svg(bytes: &[u8], target: Option<(u32, u32)>) -> MotionResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let (width, height) = match target {
        Some((w, h)) => (w.max(1), h.max(1)),
        None => {
            let to_px = |v: f32| -> MotionResult<u32> {
                if !v.is_finite() || v <= 0.0 {
                    return Err(MotionError::asset("svg has invalid width/height"));
                }
                Ok((v.ceil() as u32).max(1))
            };
            (to_px(size.width())?, to_px(size.height())?)
        }
    };
    if width > SVG_MAX_DIM || height > SVG_MAX_DIM {
        return Err(MotionError::asset(format!(
            "svg raster size too large: {width}x{height} (max {SVG_MAX_DIM}x{SVG_MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MotionError::asset("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are already premultiplied.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

/// Decode `bytes` as SVG or raster, picking by content.
///
/// SVGs are rasterized at `svg_target` (see [`rasterize_svg`]).
pub fn decode_any(bytes: &[u8], svg_target: Option<(u32, u32)>) -> MotionResult<PreparedImage> {
    if looks_like_svg(bytes) {
        rasterize_svg(bytes, svg_target)
    } else {
        decode_image(bytes)
    }
}

/// Wrap premultiplied bytes as a `vello_cpu` image paint.
pub(crate) fn image_to_paint(img: &PreparedImage) -> MotionResult<vello_cpu::Image> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| MotionError::asset("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| MotionError::asset("image height exceeds u16"))?;
    if img.rgba8_premul.len() != (img.width as usize) * (img.height as usize) * 4 {
        return Err(MotionError::asset("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity((img.width as usize) * (img.height as usize));
    for px in img.rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
