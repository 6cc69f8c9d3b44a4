use vello_cpu::kurbo::{self as cpu_kurbo, Shape as _};
use vello_cpu::peniko::Color;

use crate::animation::color::parse_paint;
use crate::assets::cache::ImageCache;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::scene::element::{
    DesignElement, ElementKind, LineCap, LineJoin, LineProps, TextAlign, TextProps,
    sanitize_extent,
};

const TOLERANCE: f64 = 0.1;

/// Read-mostly resources painters draw from.
pub(crate) struct PaintResources<'a> {
    pub(crate) images: &'a ImageCache,
    pub(crate) text: &'a mut TextLayoutEngine,
}

/// Paint one non-group element into `ctx` under `transform`.
pub(crate) fn paint_element(
    ctx: &mut vello_cpu::RenderContext,
    el: &DesignElement,
    transform: Affine,
    res: &mut PaintResources<'_>,
) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint_transform(cpu_kurbo::Affine::IDENTITY);

    let b = el.bounds();
    match &el.kind {
        ElementKind::Rectangle(rect) => {
            let path = rounded_rect_path(b, rect.border_radius);
            fill_and_stroke(ctx, &path, el);
        }
        ElementKind::Circle => {
            let path = cpu_kurbo::Ellipse::from_rect(rect_to_cpu(b)).to_path(TOLERANCE);
            fill_and_stroke(ctx, &path, el);
        }
        ElementKind::Line(line) => paint_line(ctx, el, line),
        ElementKind::Image(image) => {
            let Some((paint, iw, ih)) = res.images.get(&el.id) else {
                tracing::warn!(element = %el.id, "image not preloaded; skipping");
                return;
            };
            if b.width() <= 0.0 || b.height() <= 0.0 || iw == 0 || ih == 0 {
                return;
            }
            let fit = Affine::translate((b.x0, b.y0))
                * Affine::scale_non_uniform(b.width() / f64::from(iw), b.height() / f64::from(ih));
            ctx.set_paint(paint.clone());
            ctx.set_paint_transform(affine_to_cpu(fit));
            ctx.fill_path(&rounded_rect_path(b, image.border_radius));
            ctx.set_paint_transform(cpu_kurbo::Affine::IDENTITY);
        }
        ElementKind::Text(text) => paint_text(ctx, el, text, transform, res.text),
        ElementKind::Group(_) => {}
    }
}

fn paint_color(s: Option<&str>) -> Option<Color> {
    s.and_then(parse_paint)
        .map(|[r, g, b, a]| Color::from_rgba8(r, g, b, a))
}

fn stroke_width(el: &DesignElement) -> Option<f64> {
    (el.stroke_width.is_finite() && el.stroke_width > 0.0).then_some(el.stroke_width)
}

fn fill_and_stroke(ctx: &mut vello_cpu::RenderContext, path: &cpu_kurbo::BezPath, el: &DesignElement) {
    if let Some(fill) = paint_color(el.fill.as_deref()) {
        ctx.set_paint(fill);
        ctx.fill_path(path);
    }
    if let (Some(width), Some(stroke)) = (stroke_width(el), paint_color(el.stroke.as_deref())) {
        ctx.set_stroke(cpu_kurbo::Stroke::new(width));
        ctx.set_paint(stroke);
        ctx.stroke_path(path);
    }
}

/// Rounded rectangle with the radius clamped to half the shorter side.
fn rounded_rect_path(b: Rect, radius: f64) -> cpu_kurbo::BezPath {
    let max_r = b.width().min(b.height()) / 2.0;
    let r = if radius.is_finite() {
        radius.clamp(0.0, max_r.max(0.0))
    } else {
        0.0
    };
    if r <= 0.0 {
        return rect_to_cpu(b).to_path(TOLERANCE);
    }
    cpu_kurbo::RoundedRect::from_rect(rect_to_cpu(b), r).to_path(TOLERANCE)
}

fn paint_line(ctx: &mut vello_cpu::RenderContext, el: &DesignElement, line: &LineProps) {
    if line.points.len() < 2 {
        return;
    }
    let Some(width) = stroke_width(el) else {
        return;
    };
    let Some(color) = paint_color(el.stroke.as_deref().or(el.fill.as_deref())) else {
        return;
    };

    let origin = Point::new(el.x, el.y).to_vec2();
    let mut path = BezPath::new();
    for (i, p) in line.points.iter().enumerate() {
        let p = *p + origin;
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }

    let mut stroke = cpu_kurbo::Stroke::new(width)
        .with_caps(match line.line_cap {
            LineCap::Butt => cpu_kurbo::Cap::Butt,
            LineCap::Round => cpu_kurbo::Cap::Round,
            LineCap::Square => cpu_kurbo::Cap::Square,
        })
        .with_join(match line.line_join {
            LineJoin::Miter => cpu_kurbo::Join::Miter,
            LineJoin::Round => cpu_kurbo::Join::Round,
            LineJoin::Bevel => cpu_kurbo::Join::Bevel,
        });
    // Negative, non-finite or all-zero patterns draw solid.
    if line.dash.iter().all(|d| d.is_finite() && *d >= 0.0) && line.dash.iter().any(|d| *d > 0.0) {
        stroke = stroke.with_dashes(0.0, line.dash.iter().copied());
    }

    ctx.set_stroke(stroke);
    ctx.set_paint(color);
    ctx.stroke_path(&bezpath_to_cpu(&path));
}

fn paint_text(
    ctx: &mut vello_cpu::RenderContext,
    el: &DesignElement,
    props: &TextProps,
    transform: Affine,
    engine: &mut TextLayoutEngine,
) {
    if props.text.is_empty() {
        return;
    }
    let [r, g, b, a] = el
        .fill
        .as_deref()
        .and_then(parse_paint)
        .unwrap_or([0, 0, 0, 255]);
    let box_width = sanitize_extent(el.width);
    let max_width = (box_width > 0.0).then_some(box_width as f32);

    let Some(shaped) = engine.shape(props, TextBrushRgba8 { r, g, b, a }, max_width) else {
        tracing::warn!(element = %el.id, "no fonts registered; text skipped");
        return;
    };
    let align_width = if box_width > 0.0 {
        box_width
    } else {
        f64::from(shaped.layout.width())
    };

    for line in shaped.layout.lines() {
        let m = line.metrics();
        let used = f64::from(m.advance - m.trailing_whitespace);
        let dx = match props.text_align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (align_width - used) / 2.0,
            TextAlign::Right => align_width - used,
        };
        ctx.set_transform(affine_to_cpu(
            transform * Affine::translate((el.x + dx, el.y)),
        ));

        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(Color::from_rgba8(brush.r, brush.g, brush.b, brush.a));

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&shaped.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> cpu_kurbo::Affine {
    cpu_kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> cpu_kurbo::Rect {
    cpu_kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> cpu_kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: Point| cpu_kurbo::Point::new(p.x, p.y);
    let mut out = cpu_kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
