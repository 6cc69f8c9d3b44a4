use crate::animation::color::parse_paint_premul;
use crate::animation::resolve::{AnimationMap, resolve};
use crate::assets::cache::ImageCache;
use crate::assets::source::{AssetSource, load_bytes};
use crate::assets::text::TextLayoutEngine;
use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{MotionError, MotionResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::background::paint_background;
use crate::render::blur::{blur_params, blur_rgba8_premul};
use crate::render::composite::{composite_over_rgba8_premul, shadow_silhouette};
use crate::render::painter::{PaintResources, paint_element};
use crate::scene::background::BackgroundConfig;
use crate::scene::element::{DesignElement, ElementKind};
use crate::scene::project::FontRef;

/// A rendered frame in RGBA8 format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Copy of the pixels with straight (non-premultiplied) alpha.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// Everything a frame is a function of, besides time and output size.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// Top-level elements in z-order (first is bottom).
    pub elements: &'a [DesignElement],
    /// Animations keyed by element id; absent ids are static.
    pub animations: &'a AnimationMap,
    /// Background painted beneath every element.
    pub background: &'a BackgroundConfig,
}

/// Deterministic CPU frame renderer.
///
/// Each instance owns its image cache, fonts and raster scratch; instances never share mutable
/// state, so a preview renderer and an export renderer can coexist. Output is a pure function of
/// the scene, the time and the canvas size.
pub struct FrameRenderer {
    canvas: Canvas,
    images: ImageCache,
    text: TextLayoutEngine,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl FrameRenderer {
    /// Renderer producing frames of `canvas` size.
    pub fn new(canvas: Canvas) -> MotionResult<Self> {
        let (w, h) = canvas_u16(canvas)?;
        Ok(Self {
            canvas,
            images: ImageCache::new(),
            text: TextLayoutEngine::new(),
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Register raw font bytes under `family` for text elements.
    pub fn register_font(&mut self, family: &str, bytes: Vec<u8>) -> MotionResult<()> {
        self.text.register_font(family, bytes)
    }

    /// Load and register every font in `fonts` through `source`.
    pub fn load_fonts(&mut self, fonts: &[FontRef], source: &dyn AssetSource) -> MotionResult<()> {
        for font in fonts {
            let bytes = load_bytes(&font.src, source)
                .map_err(|e| MotionError::asset(format!("font '{}': {e}", font.family)))?;
            self.register_font(&font.family, bytes)?;
        }
        Ok(())
    }

    /// Decode every image referenced by `elements` before any frame is painted.
    ///
    /// Fails on the first image that cannot be loaded or decoded.
    #[tracing::instrument(skip_all, fields(elements = elements.len()))]
    pub fn preload(
        &mut self,
        elements: &[DesignElement],
        source: &dyn AssetSource,
    ) -> MotionResult<usize> {
        let decoded = self.images.preload(elements, source)?;
        tracing::debug!(decoded, cached = self.images.len(), "image preload finished");
        Ok(decoded)
    }

    /// Number of decoded images held by this renderer.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }

    /// Drop decoded images. Fonts stay registered.
    pub fn cleanup(&mut self) {
        self.images.clear();
    }

    /// Render `scene` at `time` seconds.
    ///
    /// The background is painted first, then every element in document order with its animated
    /// state resolved at `time`.
    pub fn render_frame(&mut self, scene: &Scene<'_>, time: f64) -> MotionResult<FrameRGBA> {
        let mut data = vec![0u8; self.canvas.rgba8_len()];
        paint_background(&mut data, self.canvas, scene.background)?;
        for el in scene.elements {
            self.draw_element(&mut data, el, scene.animations, time, Affine::IDENTITY)?;
        }
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn draw_element(
        &mut self,
        dst: &mut [u8],
        el: &DesignElement,
        animations: &AnimationMap,
        time: f64,
        parent: Affine,
    ) -> MotionResult<()> {
        let resolved = resolve(el, animations.get(&el.id), time);
        let el = resolved.as_ref();
        if !el.visible {
            return Ok(());
        }
        let opacity = if el.opacity.is_finite() {
            el.opacity.clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        if opacity <= 0.0 {
            return Ok(());
        }

        let transform = parent * rotation_about_center(el);
        let layer = match &el.kind {
            ElementKind::Group(group) => {
                let mut buf = vec![0u8; dst.len()];
                for child in &group.children {
                    self.draw_element(&mut buf, child, animations, time, transform)?;
                }
                buf
            }
            _ => self.rasterize(el, transform),
        };

        if let Some(shadow) = &el.shadow
            && let Some((radius, sigma)) = blur_params(shadow.blur)
            && let Some(color) = parse_paint_premul(&shadow.color)
        {
            let silhouette = shadow_silhouette(
                &layer,
                self.canvas.width,
                self.canvas.height,
                color,
                shadow.offset_x.round() as i64,
                shadow.offset_y.round() as i64,
            );
            let blurred = blur_rgba8_premul(
                &silhouette,
                self.canvas.width,
                self.canvas.height,
                radius,
                sigma,
            )?;
            composite_over_rgba8_premul(dst, &blurred, opacity, el.blend_mode)?;
        }
        composite_over_rgba8_premul(dst, &layer, opacity, el.blend_mode)
    }

    /// Paint one leaf element into a fresh transparent full-canvas layer.
    fn rasterize(&mut self, el: &DesignElement, transform: Affine) -> Vec<u8> {
        self.ctx.reset();
        let mut res = PaintResources {
            images: &self.images,
            text: &mut self.text,
        };
        paint_element(&mut self.ctx, el, transform, &mut res);
        self.ctx.flush();

        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.pixmap.data_as_u8_slice().to_vec()
    }
}

/// Rotation by `el.rotation` degrees about the element's center.
fn rotation_about_center(el: &DesignElement) -> Affine {
    if !el.rotation.is_finite() || el.rotation == 0.0 {
        return Affine::IDENTITY;
    }
    let c = el.center().to_vec2();
    Affine::translate(c) * Affine::rotate(el.rotation.to_radians()) * Affine::translate(-c)
}

fn canvas_u16(canvas: Canvas) -> MotionResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| MotionError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| MotionError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
