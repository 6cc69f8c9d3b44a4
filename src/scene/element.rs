use crate::foundation::core::{Point, Rect};

fn default_one() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// One node of the artboard.
///
/// Common geometry and paint live here; kind-specific fields live in [`ElementKind`]. Renderers
/// only ever read elements; animated values are merged into copies.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    /// Stable identifier; keys the animation map and the image cache.
    pub id: String,
    /// Display name shown in editors.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Left edge in artboard pixels.
    #[serde(default)]
    pub x: f64,
    /// Top edge in artboard pixels.
    #[serde(default)]
    pub y: f64,
    /// Bounding box width.
    #[serde(default)]
    pub width: f64,
    /// Bounding box height.
    #[serde(default)]
    pub height: f64,
    /// Clockwise rotation in degrees about the bounding box center.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_one")]
    pub opacity: f64,
    /// Hidden elements are skipped by the renderer.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Stroke color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width in pixels; `0` disables stroking.
    #[serde(default)]
    pub stroke_width: f64,
    /// How the element composites over what is beneath it.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Drop shadow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    /// Shape kind and its own fields.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl DesignElement {
    /// Element of `kind` with default paint and an empty bounding box at the origin.
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            blend_mode: BlendMode::Normal,
            shadow: None,
            kind,
        }
    }

    /// Set position and size.
    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    /// Set the fill color.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Bounding box with negative or non-finite sizes collapsed to zero.
    pub fn bounds(&self) -> Rect {
        let w = sanitize_extent(self.width);
        let h = sanitize_extent(self.height);
        Rect::new(self.x, self.y, self.x + w, self.y + h)
    }

    /// Rotation pivot.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Kind discriminant as it appears in documents.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Rectangle(_) => "rectangle",
            ElementKind::Circle => "circle",
            ElementKind::Text(_) => "text",
            ElementKind::Line(_) => "line",
            ElementKind::Image(_) => "image",
            ElementKind::Group(_) => "group",
        }
    }
}

pub(crate) fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Kind-specific payload of a [`DesignElement`], tagged by `type` in documents.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    /// Filled and/or stroked rounded rectangle.
    Rectangle(RectangleProps),
    /// Ellipse inscribed in the bounding box.
    Circle,
    /// Multi-line text laid out inside the bounding box width.
    Text(TextProps),
    /// Open polyline.
    Line(LineProps),
    /// Raster or SVG image stretched over the bounding box.
    Image(ImageProps),
    /// Container painted as one isolated layer.
    Group(GroupProps),
}

/// Rectangle fields.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RectangleProps {
    /// Corner radius, clamped to half the shorter side when painted.
    pub border_radius: f64,
}

/// Text fields.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    /// Content; `\n` starts a new line.
    pub text: String,
    /// Registered font family name.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS-style numeric weight (100..=900).
    pub font_weight: f64,
    /// Horizontal alignment inside the bounding box.
    pub text_align: TextAlign,
    /// Extra advance added after every character, in pixels.
    pub letter_spacing: f64,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: String::new(),
            font_size: 16.0,
            font_weight: 400.0,
            text_align: TextAlign::Left,
            letter_spacing: 0.0,
        }
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Line fields.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineProps {
    /// Vertices relative to the element's `(x, y)`.
    pub points: Vec<Point>,
    /// Alternating dash/gap lengths; empty for a solid stroke.
    pub dash: Vec<f64>,
    /// Cap style at open ends.
    pub line_cap: LineCap,
    /// Join style between segments.
    pub line_join: LineJoin,
}

/// Stroke cap style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineCap {
    /// Flat at the endpoint.
    #[default]
    Butt,
    /// Half-disc past the endpoint.
    Round,
    /// Half-square past the endpoint.
    Square,
}

/// Stroke join style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut corner.
    Bevel,
}

/// Image fields.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    /// Relative path or `data:` URI of the raster/SVG source.
    pub src: String,
    /// Corner radius of the clip; `0` for square corners.
    pub border_radius: f64,
}

/// Group fields.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GroupProps {
    /// Children in z-order, with absolute artboard coordinates.
    pub children: Vec<DesignElement>,
}

/// Drop shadow painted beneath an element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shadow {
    /// Shadow color (`#rrggbb` or `#rrggbbaa`).
    pub color: String,
    /// Blur radius in pixels; the shadow is only painted when this is positive.
    pub blur: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: "#00000080".to_owned(),
            blur: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Separable blend modes used when compositing elements and background layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    #[serde(alias = "source-over")]
    Normal,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Darken.
    Darken,
    /// Lighten.
    Lighten,
    /// Color dodge.
    ColorDodge,
    /// Color burn.
    ColorBurn,
    /// Soft light.
    SoftLight,
    /// Hard light.
    HardLight,
    /// Difference.
    Difference,
    /// Exclusion.
    Exclusion,
}

/// Walk `elements` depth-first (parents before children), in z-order.
pub fn walk<'a>(elements: &'a [DesignElement], f: &mut dyn FnMut(&'a DesignElement)) {
    for el in elements {
        f(el);
        if let ElementKind::Group(group) = &el.kind {
            walk(&group.children, f);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/element.rs"]
mod tests;
