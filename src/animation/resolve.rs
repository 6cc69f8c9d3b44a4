use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::animation::keyframe::{KeyframeValue, PropertyTrack};
use crate::scene::element::{DesignElement, ElementKind, Shadow};

/// Closed set of properties a track can animate.
///
/// `Fill` and `Stroke` are color-typed, every other property is numeric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimatableProperty {
    /// Left edge.
    X,
    /// Top edge.
    Y,
    /// Bounding box width.
    Width,
    /// Bounding box height.
    Height,
    /// Rotation in degrees about the element center.
    Rotation,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Fill color.
    Fill,
    /// Stroke color.
    Stroke,
    /// Stroke width in pixels.
    StrokeWidth,
    /// Corner radius (rectangles and images).
    BorderRadius,
    /// Shadow blur radius.
    ShadowBlur,
    /// Shadow horizontal offset.
    ShadowX,
    /// Shadow vertical offset.
    ShadowY,
    /// Font size (text).
    FontSize,
    /// Extra advance between characters (text).
    LetterSpacing,
}

impl AnimatableProperty {
    /// `true` for the color-typed properties.
    pub fn is_color(self) -> bool {
        matches!(self, Self::Fill | Self::Stroke)
    }
}

/// All animation attached to one design element.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementAnimation {
    /// At most one track per property.
    #[serde(default)]
    pub tracks: Vec<PropertyTrack>,
    /// A muted animation leaves its element untouched.
    #[serde(default)]
    pub muted: bool,
}

/// Sparse map from element id to its animation.
pub type AnimationMap = BTreeMap<String, ElementAnimation>;

/// Typed set of animated values to overlay on an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyPatch {
    /// Animated `x`.
    pub x: Option<f64>,
    /// Animated `y`.
    pub y: Option<f64>,
    /// Animated `width`.
    pub width: Option<f64>,
    /// Animated `height`.
    pub height: Option<f64>,
    /// Animated `rotation`.
    pub rotation: Option<f64>,
    /// Animated `opacity`.
    pub opacity: Option<f64>,
    /// Animated fill color.
    pub fill: Option<String>,
    /// Animated stroke color.
    pub stroke: Option<String>,
    /// Animated stroke width.
    pub stroke_width: Option<f64>,
    /// Animated corner radius.
    pub border_radius: Option<f64>,
    /// Animated shadow blur.
    pub shadow_blur: Option<f64>,
    /// Animated shadow x offset.
    pub shadow_x: Option<f64>,
    /// Animated shadow y offset.
    pub shadow_y: Option<f64>,
    /// Animated font size.
    pub font_size: Option<f64>,
    /// Animated letter spacing.
    pub letter_spacing: Option<f64>,
}

impl PropertyPatch {
    /// Record `value` for `property`.
    ///
    /// Returns `false` (and records nothing) when the value type does not match the property.
    pub fn set(&mut self, property: AnimatableProperty, value: KeyframeValue) -> bool {
        use AnimatableProperty as P;

        if property.is_color() {
            let KeyframeValue::Color(c) = value else {
                return false;
            };
            match property {
                P::Fill => self.fill = Some(c),
                P::Stroke => self.stroke = Some(c),
                _ => return false,
            }
            return true;
        }

        let Some(v) = value.as_number() else {
            return false;
        };
        let slot = match property {
            P::X => &mut self.x,
            P::Y => &mut self.y,
            P::Width => &mut self.width,
            P::Height => &mut self.height,
            P::Rotation => &mut self.rotation,
            P::Opacity => &mut self.opacity,
            P::StrokeWidth => &mut self.stroke_width,
            P::BorderRadius => &mut self.border_radius,
            P::ShadowBlur => &mut self.shadow_blur,
            P::ShadowX => &mut self.shadow_x,
            P::ShadowY => &mut self.shadow_y,
            P::FontSize => &mut self.font_size,
            P::LetterSpacing => &mut self.letter_spacing,
            P::Fill | P::Stroke => return false,
        };
        *slot = Some(v);
        true
    }

    /// `true` when no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Return a copy of `element` with this patch merged over it.
    ///
    /// Shadow fields merge into the nested shadow one at a time; kind-specific fields
    /// (`borderRadius`, `fontSize`, `letterSpacing`) only land on kinds that carry them.
    pub fn apply_to(&self, element: &DesignElement) -> DesignElement {
        let mut out = element.clone();
        if let Some(v) = self.x {
            out.x = v;
        }
        if let Some(v) = self.y {
            out.y = v;
        }
        if let Some(v) = self.width {
            out.width = v;
        }
        if let Some(v) = self.height {
            out.height = v;
        }
        if let Some(v) = self.rotation {
            out.rotation = v;
        }
        if let Some(v) = self.opacity {
            out.opacity = v;
        }
        if let Some(c) = &self.fill {
            out.fill = Some(c.clone());
        }
        if let Some(c) = &self.stroke {
            out.stroke = Some(c.clone());
        }
        if let Some(v) = self.stroke_width {
            out.stroke_width = v;
        }

        if self.shadow_blur.is_some() || self.shadow_x.is_some() || self.shadow_y.is_some() {
            let shadow = out.shadow.get_or_insert_with(Shadow::default);
            if let Some(v) = self.shadow_blur {
                shadow.blur = v;
            }
            if let Some(v) = self.shadow_x {
                shadow.offset_x = v;
            }
            if let Some(v) = self.shadow_y {
                shadow.offset_y = v;
            }
        }

        match &mut out.kind {
            ElementKind::Rectangle(rect) => {
                if let Some(v) = self.border_radius {
                    rect.border_radius = v;
                }
            }
            ElementKind::Image(image) => {
                if let Some(v) = self.border_radius {
                    image.border_radius = v;
                }
            }
            ElementKind::Text(text) => {
                if let Some(v) = self.font_size {
                    text.font_size = v;
                }
                if let Some(v) = self.letter_spacing {
                    text.letter_spacing = v;
                }
            }
            ElementKind::Circle | ElementKind::Line(_) | ElementKind::Group(_) => {}
        }
        out
    }
}

/// Sample every enabled track of `animation` at `time` into a patch.
pub fn resolve_patch(animation: &ElementAnimation, time: f64) -> PropertyPatch {
    let mut patch = PropertyPatch::default();
    for track in animation.tracks.iter().filter(|t| t.enabled) {
        let Some(value) = track.sample(time) else {
            continue;
        };
        if !patch.set(track.property, value) {
            tracing::warn!(
                property = ?track.property,
                "keyframe value type does not match property; keeping static value"
            );
        }
    }
    patch
}

/// Effective element state at `time`.
///
/// A missing or muted animation returns the element itself (borrowed). Otherwise the result is a
/// fresh element with the sampled values merged in; `element` is never modified.
pub fn resolve<'a>(
    element: &'a DesignElement,
    animation: Option<&ElementAnimation>,
    time: f64,
) -> Cow<'a, DesignElement> {
    let Some(animation) = animation.filter(|a| !a.muted) else {
        return Cow::Borrowed(element);
    };
    let patch = resolve_patch(animation, time);
    if patch.is_empty() {
        return Cow::Borrowed(element);
    }
    Cow::Owned(patch.apply_to(element))
}

/// Resolve a whole element list at `time`, recursing into group children.
///
/// This is what a live preview paints for a scrub position; the frame renderer uses the same
/// resolution, so preview and export agree at equal times.
pub fn resolve_scene(
    elements: &[DesignElement],
    animations: &AnimationMap,
    time: f64,
) -> Vec<DesignElement> {
    elements
        .iter()
        .map(|el| {
            let mut resolved = resolve(el, animations.get(&el.id), time).into_owned();
            if let ElementKind::Group(group) = &mut resolved.kind {
                group.children = resolve_scene(&group.children, animations, time);
            }
            resolved
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/resolve.rs"]
mod tests;
