/// Evaluate a 1-D cubic Bézier in Bernstein form at parameter `t`.
///
/// `u³·p0 + 3u²t·p1 + 3ut²·p2 + t³·p3` with `u = 1 - t`.
pub fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Keyframe tangent handle, as fractions of the time/value span to the neighbouring keyframe.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Handle {
    /// Time offset (fraction of the segment duration).
    pub x: f64,
    /// Value offset (fraction of the segment value delta).
    pub y: f64,
}

impl Handle {
    /// Outgoing tangent synthesized when a segment has only an incoming handle.
    pub const DEFAULT_OUT: Handle = Handle { x: 0.33, y: 0.0 };
    /// Incoming tangent synthesized when a segment has only an outgoing handle.
    pub const DEFAULT_IN: Handle = Handle { x: -0.33, y: 0.0 };
}

/// Endpoints of one keyframe segment in time/value space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Start time (seconds).
    pub t0: f64,
    /// Start value.
    pub v0: f64,
    /// End time (seconds).
    pub t1: f64,
    /// End value.
    pub v1: f64,
}

/// Evaluate a handle-shaped segment at linear `progress` in `[0, 1]`.
///
/// Two passes: the time-axis curve is evaluated at `progress` and normalized back into the
/// segment by dividing by its duration; the value-axis curve is then evaluated at that recovered
/// parameter. This is not the true inverse of the time curve. It matches the exact inverse only
/// while the time-axis handles keep the curve close to linear, and it is kept as-is so previously
/// authored content plays back unchanged.
pub fn eval_handle_segment(seg: Segment, handle_out: Handle, handle_in: Handle, progress: f64) -> f64 {
    let dt = seg.t1 - seg.t0;
    if dt == 0.0 || !dt.is_finite() {
        return seg.v0;
    }
    let dv = seg.v1 - seg.v0;

    let x1 = seg.t0 + handle_out.x * dt;
    let x2 = seg.t1 + handle_in.x * dt;
    let y1 = seg.v0 + handle_out.y * dv;
    let y2 = seg.v1 + handle_in.y * dv;

    let time_at_t = cubic_bezier(seg.t0, x1, x2, seg.t1, progress);
    let t = (time_at_t - seg.t0) / dt;
    cubic_bezier(seg.v0, y1, y2, seg.v1, t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/bezier.rs"]
mod tests;
