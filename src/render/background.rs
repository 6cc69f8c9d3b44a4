use crate::animation::color::parse_paint;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::MotionResult;
use crate::render::composite::{composite_over_rgba8_premul, fill_rgba8};
use crate::scene::background::{BackgroundConfig, BackgroundLayer, ColorStop, LayerKind};

/// Composite every background layer onto `dst`, bottom to top.
pub fn paint_background(
    dst: &mut [u8],
    canvas: Canvas,
    background: &BackgroundConfig,
) -> MotionResult<()> {
    if !background.enabled {
        return Ok(());
    }
    let mut layer_buf = vec![0u8; canvas.rgba8_len()];
    for layer in &background.layers {
        let opacity = if layer.opacity.is_finite() {
            layer.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if opacity <= 0.0 {
            continue;
        }
        let Some(stops) = parse_stops(&layer.color_stops) else {
            continue;
        };
        rasterize_layer(&mut layer_buf, canvas, layer, &stops);
        composite_over_rgba8_premul(dst, &layer_buf, opacity as f32, layer.blend_mode)?;
    }
    Ok(())
}

/// Stops parsed to straight RGBA, sorted by position. `None` when no stop parses.
fn parse_stops(stops: &[ColorStop]) -> Option<Vec<(f64, [u8; 4])>> {
    let mut out: Vec<(f64, [u8; 4])> = stops
        .iter()
        .filter_map(|s| {
            let pos = if s.position.is_finite() {
                s.position.clamp(0.0, 1.0)
            } else {
                0.0
            };
            parse_paint(&s.color)
                .or_else(|| s.color.trim().eq_ignore_ascii_case("transparent").then_some([0; 4]))
                .map(|c| (pos, c))
        })
        .collect();
    if out.is_empty() {
        return None;
    }
    out.sort_by(|a, b| a.0.total_cmp(&b.0));
    Some(out)
}

fn rasterize_layer(buf: &mut [u8], canvas: Canvas, layer: &BackgroundLayer, stops: &[(f64, [u8; 4])]) {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let (cx, cy) = (w / 2.0, h / 2.0);

    let param: Box<dyn Fn(f64, f64) -> f64> = match layer.kind {
        LayerKind::Solid => {
            let [r, g, b, a] = stops[0].1;
            fill_rgba8(buf, Rgba8Premul::from_straight_rgba(r, g, b, a));
            return;
        }
        LayerKind::LinearGradient => {
            // CSS: 0deg points up, angles turn clockwise; the gradient line spans the box
            // projected onto the direction.
            let rad = layer.angle.to_radians();
            let (dx, dy) = (rad.sin(), -rad.cos());
            let len = (w * dx.abs() + h * dy.abs()).max(f64::EPSILON);
            Box::new(move |x, y| ((x - cx) * dx + (y - cy) * dy) / len + 0.5)
        }
        LayerKind::RadialGradient => {
            // Ellipse through the farthest corner, centered on the canvas.
            let rx = (cx * std::f64::consts::SQRT_2).max(f64::EPSILON);
            let ry = (cy * std::f64::consts::SQRT_2).max(f64::EPSILON);
            Box::new(move |x, y| {
                let (nx, ny) = ((x - cx) / rx, (y - cy) / ry);
                (nx * nx + ny * ny).sqrt()
            })
        }
    };

    let width = canvas.width as usize;
    for (i, px) in buf.chunks_exact_mut(4).enumerate() {
        let x = (i % width) as f64 + 0.5;
        let y = (i / width) as f64 + 0.5;
        let [r, g, b, a] = sample_stops(stops, param(x, y));
        px.copy_from_slice(&Rgba8Premul::from_straight_rgba(r, g, b, a).to_array());
    }
}

/// Straight-alpha color at gradient position `t`, clamped to the end stops.
pub(crate) fn sample_stops(stops: &[(f64, [u8; 4])], t: f64) -> [u8; 4] {
    let Some(&(first_pos, first)) = stops.first() else {
        return [0; 4];
    };
    if t <= first_pos || t.is_nan() {
        return first;
    }
    for pair in stops.windows(2) {
        let ((p0, c0), (p1, c1)) = (pair[0], pair[1]);
        if t <= p1 {
            let span = p1 - p0;
            let f = if span > 0.0 { (t - p0) / span } else { 1.0 };
            let lerp = |a: u8, b: u8| {
                (f64::from(a) + (f64::from(b) - f64::from(a)) * f)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            return [
                lerp(c0[0], c1[0]),
                lerp(c0[1], c1[1]),
                lerp(c0[2], c1[2]),
                lerp(c0[3], c1[3]),
            ];
        }
    }
    stops.last().map_or(first, |s| s.1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
