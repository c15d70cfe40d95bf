//! Piecewise parameter curves for synthesis voices.
//!
//! An `Envelope` starts at a fixed value and moves through up to
//! `MAX_SEGMENTS` ramps, each ending at an absolute time (seconds from the
//! voice start). Ramps follow Web Audio automation semantics: a linear ramp
//! interpolates in value, an exponential ramp interpolates in ratio.

use arrayvec::ArrayVec;

/// Maximum ramps per envelope. The richest patch (bass) uses two.
pub const MAX_SEGMENTS: usize = 3;

/// Ramp shape toward a segment's target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// Straight line in value.
    Linear,
    /// Constant ratio per unit time. Requires both ends non-zero with the
    /// same sign; otherwise the start value holds until the segment ends.
    Exponential,
}

/// A ramp from the previous value to `target`, finishing at `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Absolute end time in seconds from the voice start.
    pub end: f32,
    /// Value reached at `end`.
    pub target: f32,
    /// Ramp shape.
    pub curve: Curve,
}

/// A one-shot piecewise curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Value at t = 0.
    pub start: f32,
    /// Ramps in time order.
    pub segments: ArrayVec<Segment, MAX_SEGMENTS>,
}

impl Envelope {
    /// A constant value.
    pub fn constant(value: f32) -> Self {
        Self { start: value, segments: ArrayVec::new() }
    }

    /// Append a linear ramp to `target` ending at `end`.
    pub fn linear_to(mut self, target: f32, end: f32) -> Self {
        self.segments.push(Segment { end, target, curve: Curve::Linear });
        self
    }

    /// Append an exponential ramp to `target` ending at `end`.
    pub fn exponential_to(mut self, target: f32, end: f32) -> Self {
        self.segments.push(Segment { end, target, curve: Curve::Exponential });
        self
    }

    /// Value after the last ramp.
    pub fn final_value(&self) -> f32 {
        self.segments.last().map_or(self.start, |s| s.target)
    }

    /// Evaluate the curve at `t` seconds from the start.
    pub fn value_at(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return self.start;
        }

        let mut from = self.start;
        let mut from_time = 0.0;
        for seg in &self.segments {
            if t < seg.end {
                let span = seg.end - from_time;
                let frac = if span > 0.0 { (t - from_time) / span } else { 1.0 };
                return ramp(seg.curve, from, seg.target, frac);
            }
            from = seg.target;
            from_time = seg.end;
        }
        from
    }
}

fn ramp(curve: Curve, from: f32, to: f32, frac: f32) -> f32 {
    match curve {
        Curve::Linear => from + (to - from) * frac,
        Curve::Exponential => {
            if from == 0.0 || (from > 0.0) != (to > 0.0) {
                from
            } else {
                from * libm::powf(to / from, frac)
            }
        }
    }
}
