use crate::foundation::error::{MotionError, MotionResult};
use crate::scene::element::TextProps;

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// One registered font.
#[derive(Clone)]
pub(crate) struct RegisteredFont {
    /// Name documents use in `fontFamily`.
    pub(crate) family: String,
    /// Family name as registered with Parley.
    pub(crate) parley_family: String,
    /// Font bytes for glyph rasterization.
    pub(crate) data: vello_cpu::peniko::FontData,
}

/// Font registry with first-registered fallback.
#[derive(Clone, Default)]
pub(crate) struct FontBook {
    fonts: Vec<RegisteredFont>,
}

impl FontBook {
    pub(crate) fn insert(&mut self, font: RegisteredFont) {
        match self.fonts.iter_mut().find(|f| f.family == font.family) {
            Some(existing) => *existing = font,
            None => self.fonts.push(font),
        }
    }

    /// Font for `family` (case-insensitive), falling back to the first registered one.
    pub(crate) fn lookup(&self, family: &str) -> Option<&RegisteredFont> {
        self.fonts
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(family.trim()))
            .or_else(|| self.fonts.first())
    }

    pub(crate) fn contains(&self, family: &str) -> bool {
        self.fonts
            .iter()
            .any(|f| f.family.eq_ignore_ascii_case(family.trim()))
    }

    pub(crate) fn len(&self) -> usize {
        self.fonts.len()
    }
}

/// Text layout shaped for one element, plus the font to draw its glyphs with.
pub(crate) struct ShapedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

/// Stateful helper owning the Parley contexts and the font registry.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    book: FontBook,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct an engine with no fonts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            book: FontBook::default(),
        }
    }

    /// Register raw font bytes under `family`. Re-registering a family replaces it.
    pub fn register_font(&mut self, family: &str, bytes: Vec<u8>) -> MotionResult<()> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MotionError::asset(format!("font '{family}': no font families found in data"))
        })?;
        let parley_family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MotionError::asset(format!("font '{family}': family has no name")))?
            .to_string();

        tracing::debug!(family, parley_family = %parley_family, "registered font");
        self.book.insert(RegisteredFont {
            family: family.to_owned(),
            parley_family,
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        });
        Ok(())
    }

    /// `true` when `family` was registered explicitly.
    pub fn has_family(&self, family: &str) -> bool {
        self.book.contains(family)
    }

    /// Number of registered fonts.
    pub fn font_count(&self) -> usize {
        self.book.len()
    }

    /// Shape `props` with line breaking at `max_width`.
    ///
    /// Returns `None` when no font is registered at all. Non-positive or non-finite font sizes
    /// shape no text, so the layout carries no glyphs.
    pub(crate) fn shape(
        &mut self,
        props: &TextProps,
        brush: TextBrushRgba8,
        max_width: Option<f32>,
    ) -> Option<ShapedText> {
        let font = self.book.lookup(&props.font_family)?.clone();
        if !self.book.contains(&props.font_family) && !props.font_family.is_empty() {
            tracing::warn!(
                family = %props.font_family,
                fallback = %font.family,
                "font family not registered; using fallback"
            );
        }

        let size = props.font_size as f32;
        let text = if size.is_finite() && size > 0.0 {
            props.text.as_str()
        } else {
            ""
        };
        let letter_spacing = if props.letter_spacing.is_finite() {
            props.letter_spacing as f32
        } else {
            0.0
        };
        let weight = if props.font_weight.is_finite() {
            props.font_weight.clamp(1.0, 1000.0) as f32
        } else {
            400.0
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.parley_family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size.max(1.0)));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight),
        ));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(letter_spacing));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width);
        layout.align(
            max_width,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        Some(ShapedText {
            layout,
            font: font.data,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
