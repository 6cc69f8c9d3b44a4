use crate::animation::bezier::{Handle, Segment, eval_handle_segment};

const UNIT_SEGMENT: Segment = Segment {
    t0: 0.0,
    v0: 0.0,
    t1: 1.0,
    v1: 1.0,
};

/// Easing curves applied to normalized keyframe progress.
///
/// The set is closed. Names that do not map to a variant deserialize to [`Ease::Linear`] instead
/// of failing, so documents written by newer editors still play back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ease {
    /// Identity.
    #[default]
    Linear,
    /// Smooth ease: the unit segment shaped by the default keyframe handles.
    Ease,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Cosine ease-in.
    InSine,
    /// Cosine ease-out.
    OutSine,
    /// Cosine ease-in/out.
    InOutSine,
    /// Exponential ease-in.
    InExpo,
    /// Exponential ease-out.
    OutExpo,
    /// Exponential ease-in/out.
    InOutExpo,
    /// Circular ease-in.
    InCirc,
    /// Circular ease-out.
    OutCirc,
    /// Circular ease-in/out.
    InOutCirc,
    /// Elastic ease-in (undershoots below 0).
    InElastic,
    /// Elastic ease-out (overshoots above 1).
    OutElastic,
    /// Back ease-out (overshoots above 1).
    OutBack,
    /// Bounce ease-out.
    OutBounce,
    /// Step: the value is frozen until the next keyframe.
    Hold,
}

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * std::f64::consts::PI) / 3.0;
const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

impl Ease {
    /// Every variant, in declaration order.
    pub const ALL: [Ease; 22] = [
        Ease::Linear,
        Ease::Ease,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InSine,
        Ease::OutSine,
        Ease::InOutSine,
        Ease::InExpo,
        Ease::OutExpo,
        Ease::InOutExpo,
        Ease::InCirc,
        Ease::OutCirc,
        Ease::InOutCirc,
        Ease::InElastic,
        Ease::OutElastic,
        Ease::OutBack,
        Ease::OutBounce,
        Ease::Hold,
    ];

    /// Look up an easing by its document name. Unknown names map to [`Ease::Linear`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "linear" => Self::Linear,
            "ease" => Self::Ease,
            "ease-in" | "ease-in-quad" => Self::InQuad,
            "ease-out" | "ease-out-quad" => Self::OutQuad,
            "ease-in-out" | "ease-in-out-quad" => Self::InOutQuad,
            "ease-in-cubic" => Self::InCubic,
            "ease-out-cubic" => Self::OutCubic,
            "ease-in-out-cubic" => Self::InOutCubic,
            "ease-in-sine" | "ease-in-cosine" => Self::InSine,
            "ease-out-sine" | "ease-out-cosine" => Self::OutSine,
            "ease-in-out-sine" | "ease-in-out-cosine" => Self::InOutSine,
            "ease-in-expo" => Self::InExpo,
            "ease-out-expo" => Self::OutExpo,
            "ease-in-out-expo" => Self::InOutExpo,
            "ease-in-circ" => Self::InCirc,
            "ease-out-circ" => Self::OutCirc,
            "ease-in-out-circ" => Self::InOutCirc,
            "ease-in-elastic" | "elastic-in" => Self::InElastic,
            "ease-out-elastic" | "elastic-out" => Self::OutElastic,
            "ease-out-back" | "back-out" => Self::OutBack,
            "ease-out-bounce" | "bounce-out" => Self::OutBounce,
            "hold" | "step" => Self::Hold,
            _ => Self::Linear,
        }
    }

    /// Canonical document name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Ease => "ease",
            Self::InQuad => "ease-in",
            Self::OutQuad => "ease-out",
            Self::InOutQuad => "ease-in-out",
            Self::InCubic => "ease-in-cubic",
            Self::OutCubic => "ease-out-cubic",
            Self::InOutCubic => "ease-in-out-cubic",
            Self::InSine => "ease-in-sine",
            Self::OutSine => "ease-out-sine",
            Self::InOutSine => "ease-in-out-sine",
            Self::InExpo => "ease-in-expo",
            Self::OutExpo => "ease-out-expo",
            Self::InOutExpo => "ease-in-out-expo",
            Self::InCirc => "ease-in-circ",
            Self::OutCirc => "ease-out-circ",
            Self::InOutCirc => "ease-in-out-circ",
            Self::InElastic => "ease-in-elastic",
            Self::OutElastic => "ease-out-elastic",
            Self::OutBack => "ease-out-back",
            Self::OutBounce => "ease-out-bounce",
            Self::Hold => "hold",
        }
    }

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    ///
    /// Elastic and back curves leave `[0, 1]` transiently. `Hold` is constant zero.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::Ease => {
                eval_handle_segment(UNIT_SEGMENT, Handle::DEFAULT_OUT, Handle::DEFAULT_IN, t)
            }
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InSine => 1.0 - ((t * std::f64::consts::PI) / 2.0).cos(),
            Self::OutSine => ((t * std::f64::consts::PI) / 2.0).sin(),
            Self::InOutSine => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
            Self::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Self::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Self::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Self::InElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Self::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Self::OutBack => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Self::OutBounce => bounce_out(t),
            Self::Hold => 0.0,
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

/// Free-function form of [`Ease::apply`].
pub fn ease(kind: Ease, t: f64) -> f64 {
    kind.apply(t)
}

impl From<String> for Ease {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.name().to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
