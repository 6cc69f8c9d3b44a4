use crate::animation::{
    bezier::{Handle, Segment, eval_handle_segment},
    color::lerp_hex,
    ease::Ease,
    resolve::AnimatableProperty,
};

/// Value carried by a keyframe: a plain number or a `#rrggbb` color string.
///
/// One track never mixes the two.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    /// Numeric value (positions, sizes, opacity, ...).
    Number(f64),
    /// Hex color value (`fill`, `stroke`).
    Color(String),
}

impl KeyframeValue {
    /// Return the number, if this is a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Color(_) => None,
        }
    }

    /// Return the color string, if this is a color value.
    pub fn as_color(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Color(c) => Some(c),
        }
    }
}

impl From<f64> for KeyframeValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for KeyframeValue {
    fn from(v: &str) -> Self {
        Self::Color(v.to_owned())
    }
}

/// One time/value anchor of a property track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Editor-assigned identifier.
    #[serde(default)]
    pub id: String,
    /// Seconds from the animation's local origin.
    pub time: f64,
    /// Value at `time`.
    pub value: KeyframeValue,
    /// Easing applied toward the next keyframe.
    #[serde(default)]
    pub easing: Ease,
    /// Incoming tangent handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_in: Option<Handle>,
    /// Outgoing tangent handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_out: Option<Handle>,
}

impl Keyframe {
    /// Keyframe with the given easing and no handles.
    pub fn new(time: f64, value: impl Into<KeyframeValue>, easing: Ease) -> Self {
        Self {
            id: String::new(),
            time,
            value: value.into(),
            easing,
            handle_in: None,
            handle_out: None,
        }
    }

    /// Set the tangent handles.
    pub fn with_handles(mut self, handle_in: Option<Handle>, handle_out: Option<Handle>) -> Self {
        self.handle_in = handle_in;
        self.handle_out = handle_out;
        self
    }
}

fn default_true() -> bool {
    true
}

/// Keyframes animating one property of one element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropertyTrack {
    /// Animated property.
    pub property: AnimatableProperty,
    /// Disabled tracks are ignored by the resolver.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keyframes in any order.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl PropertyTrack {
    /// Enabled track over `keyframes`.
    pub fn new(property: AnimatableProperty, keyframes: Vec<Keyframe>) -> Self {
        Self {
            property,
            enabled: true,
            keyframes,
        }
    }

    /// Sample the track at `time` (seconds). See [`sample_keyframes`].
    pub fn sample(&self, time: f64) -> Option<KeyframeValue> {
        sample_keyframes(&self.keyframes, time)
    }
}

/// Sample a keyframe list at `time` (seconds).
///
/// - `None` for an empty list, a non-finite `time`, or when no keyframe has a finite time.
/// - Keyframes are sorted by time here; callers may pass them in any order.
/// - Before the first key / after the last key the boundary value is returned unchanged.
/// - Inside, the first bracketing pair scanning ascending wins, so a time equal to an interior
///   key resolves to the pair ending there and yields that key's value.
pub fn sample_keyframes(keyframes: &[Keyframe], time: f64) -> Option<KeyframeValue> {
    if !time.is_finite() {
        return None;
    }

    let mut keys: Vec<&Keyframe> = keyframes.iter().filter(|k| k.time.is_finite()).collect();
    if !keys.is_sorted_by(|a, b| a.time <= b.time) {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    let (first, last) = (keys.first()?, keys.last()?);
    if time <= first.time {
        return Some(first.value.clone());
    }
    if time >= last.time {
        return Some(last.value.clone());
    }

    let (a, b) = keys
        .windows(2)
        .map(|w| (w[0], w[1]))
        .find(|(a, b)| a.time <= time && time <= b.time)?;

    let span = b.time - a.time;
    let progress = if span > 0.0 {
        (time - a.time) / span
    } else {
        0.0
    };
    if progress >= 1.0 {
        return Some(b.value.clone());
    }

    Some(interpolate_segment(a, b, progress))
}

fn interpolate_segment(a: &Keyframe, b: &Keyframe, progress: f64) -> KeyframeValue {
    if a.handle_out.is_some() || b.handle_in.is_some() {
        return match (&a.value, &b.value) {
            (KeyframeValue::Number(v0), KeyframeValue::Number(v1)) => {
                let seg = Segment {
                    t0: a.time,
                    v0: *v0,
                    t1: b.time,
                    v1: *v1,
                };
                KeyframeValue::Number(eval_handle_segment(
                    seg,
                    a.handle_out.unwrap_or(Handle::DEFAULT_OUT),
                    b.handle_in.unwrap_or(Handle::DEFAULT_IN),
                    progress,
                ))
            }
            // Handle-shaped color segments hold the start color.
            _ => a.value.clone(),
        };
    }

    let eased = a.easing.apply(progress);
    match (&a.value, &b.value) {
        (KeyframeValue::Number(v0), KeyframeValue::Number(v1)) => {
            KeyframeValue::Number(v0 + (v1 - v0) * eased)
        }
        (KeyframeValue::Color(c0), KeyframeValue::Color(c1)) => {
            KeyframeValue::Color(lerp_hex(c0, c1, eased))
        }
        // Mixed value types: step at the midpoint, like a malformed color.
        _ => {
            if eased < 0.5 {
                a.value.clone()
            } else {
                b.value.clone()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
