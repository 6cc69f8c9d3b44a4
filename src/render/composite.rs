use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{MotionError, MotionResult};
use crate::foundation::math::mul_div255_u8;
use crate::scene::element::BlendMode;

/// Composite premultiplied `src` over `dst` with `opacity` and a separable blend mode.
pub fn composite_over_rgba8_premul(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    blend: BlendMode,
) -> MotionResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MotionError::render(
            "composite_over_rgba8_premul expects equal-length rgba8 buffers",
        ));
    }

    // Blend dispatch happens once per layer; each arm monomorphizes its own kernel.
    match blend {
        BlendMode::Normal => {
            premul_over_in_place_opacity(dst, src, opacity);
            Ok(())
        }
        BlendMode::Multiply => blend_kernel(dst, src, opacity, |s, d| s * d),
        BlendMode::Screen => blend_kernel(dst, src, opacity, |s, d| s + d - s * d),
        BlendMode::Overlay => blend_kernel(dst, src, opacity, |s, d| hard_light(d, s)),
        BlendMode::Darken => blend_kernel(dst, src, opacity, |s, d| s.min(d)),
        BlendMode::Lighten => blend_kernel(dst, src, opacity, |s, d| s.max(d)),
        BlendMode::ColorDodge => blend_kernel(dst, src, opacity, |s, d| {
            if d <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }),
        BlendMode::ColorBurn => blend_kernel(dst, src, opacity, |s, d| {
            if d >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - d) / s).min(1.0)
            }
        }),
        BlendMode::SoftLight => blend_kernel(dst, src, opacity, |s, d| {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }),
        BlendMode::HardLight => blend_kernel(dst, src, opacity, hard_light),
        BlendMode::Difference => blend_kernel(dst, src, opacity, |s, d| (d - s).abs()),
        BlendMode::Exclusion => blend_kernel(dst, src, opacity, |s, d| d + s - 2.0 * d * s),
    }
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

/// Integer source-over with a global opacity.
pub(crate) fn premul_over_in_place_opacity(dst: &mut [u8], src: &[u8], opacity: f32) {
    let op = opacity_u8(opacity);
    if op == 0 {
        return;
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = sc.saturating_add(dc);
        }
    }
}

#[inline(always)]
fn blend_kernel<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F) -> MotionResult<()>
where
    F: Fn(f32, f32) -> f32,
{
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if opacity <= 0.0 {
        return Ok(());
    }

    let unpremul = |p: f32, a: f32| if a > 0.0 { (p / a).clamp(0.0, 1.0) } else { 0.0 };
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (f32::from(s[3]) / 255.0) * opacity;
        let da = f32::from(d[3]) / 255.0;

        for c in 0..3 {
            let sp = (f32::from(s[c]) / 255.0) * opacity;
            let dp = f32::from(d[c]) / 255.0;
            let b = blend_fn(unpremul(sp, sa), unpremul(dp, da)).clamp(0.0, 1.0);
            d[c] = to_u8(sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da);
        }
        d[3] = to_u8(sa + da * (1.0 - sa));
    }
    Ok(())
}

fn opacity_u8(opacity: f32) -> u16 {
    if !opacity.is_finite() {
        return 0;
    }
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Build a shadow layer from `src`: every pixel takes `color` scaled by the source alpha, and the
/// result is shifted by `(dx, dy)` whole pixels. Pixels shifted in from outside are transparent.
pub fn shadow_silhouette(
    src: &[u8],
    width: u32,
    height: u32,
    color: Rgba8Premul,
    dx: i64,
    dy: i64,
) -> Vec<u8> {
    let (w, h) = (i64::from(width), i64::from(height));
    let mut out = vec![0u8; src.len()];
    let c = color.to_array();
    for y in 0..h {
        let sy = y - dy;
        if sy < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if sx < 0 || sx >= w {
                continue;
            }
            let a = u16::from(src[((sy * w + sx) as usize) * 4 + 3]);
            if a == 0 {
                continue;
            }
            let o = ((y * w + x) as usize) * 4;
            for i in 0..4 {
                out[o + i] = mul_div255_u8(u16::from(c[i]), a);
            }
        }
    }
    out
}

/// Fill a premultiplied buffer with one color.
pub fn fill_rgba8(dst: &mut [u8], color: Rgba8Premul) {
    let c = color.to_array();
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&c);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
