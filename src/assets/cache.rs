use std::collections::HashMap;

use crate::assets::decode::{PreparedImage, decode_any, image_to_paint};
use crate::assets::source::{AssetSource, load_bytes};
use crate::foundation::error::{MotionError, MotionResult};
use crate::scene::element::{DesignElement, ElementKind, walk};

struct CachedImage {
    src: String,
    width: u32,
    height: u32,
    paint: vello_cpu::Image,
}

/// Decoded image paints owned by one renderer, keyed by element id.
///
/// Entries are written once per element by [`ImageCache::preload`] and read for every frame
/// afterwards. An entry is re-decoded only when the element's `src` changes.
#[derive(Default)]
pub struct ImageCache {
    entries: HashMap<String, CachedImage>,
}

impl ImageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every image referenced by `elements` (groups included) that is not cached yet.
    ///
    /// The first failure aborts with [`MotionError::Asset`] naming the element and its source.
    /// Returns the number of images decoded by this call.
    pub fn preload(
        &mut self,
        elements: &[DesignElement],
        source: &dyn AssetSource,
    ) -> MotionResult<usize> {
        let mut pending = Vec::<&DesignElement>::new();
        walk(elements, &mut |el| {
            if let ElementKind::Image(image) = &el.kind
                && !image.src.is_empty()
                && self.entries.get(&el.id).is_none_or(|c| c.src != image.src)
            {
                pending.push(el);
            }
        });

        let mut decoded = 0usize;
        for el in pending {
            let ElementKind::Image(image) = &el.kind else {
                continue;
            };
            let prepared = load_image(el, &image.src, source).map_err(|e| {
                MotionError::asset(format!(
                    "image element '{}' ({}): {e}",
                    el.id,
                    describe_src(&image.src)
                ))
            })?;
            let paint = image_to_paint(&prepared)
                .map_err(|e| MotionError::asset(format!("image element '{}': {e}", el.id)))?;
            tracing::debug!(
                element = %el.id,
                width = prepared.width,
                height = prepared.height,
                "decoded image"
            );
            self.entries.insert(
                el.id.clone(),
                CachedImage {
                    src: image.src.clone(),
                    width: prepared.width,
                    height: prepared.height,
                    paint,
                },
            );
            decoded += 1;
        }
        Ok(decoded)
    }

    /// Cached paint and its pixel size for `element_id`.
    pub fn get(&self, element_id: &str) -> Option<(&vello_cpu::Image, u32, u32)> {
        self.entries
            .get(element_id)
            .map(|c| (&c.paint, c.width, c.height))
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn load_image(
    el: &DesignElement,
    src: &str,
    source: &dyn AssetSource,
) -> MotionResult<PreparedImage> {
    let bytes = load_bytes(src, source)?;
    let b = el.bounds();
    let target = (b.width() >= 1.0 && b.height() >= 1.0)
        .then(|| (b.width().ceil() as u32, b.height().ceil() as u32));
    decode_any(&bytes, target)
}

fn describe_src(src: &str) -> String {
    if src.starts_with("data:") {
        let head: String = src.chars().take(32).collect();
        format!("{head}...")
    } else {
        src.to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
