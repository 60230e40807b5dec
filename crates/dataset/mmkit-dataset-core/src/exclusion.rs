//! Exclusion intervals for clip trimming and sequence stitch boundaries.

use crate::data::ExclusionInterval;

/// Duration and searchability of one sequence entry, in timeline order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StitchSegment {
    pub duration: f32,
    pub searchable: bool,
}

/// Intervals hiding the first `cut_start` and last `cut_end` seconds of a clip.
/// Non-positive cuts emit nothing.
pub fn trim_intervals(length: f32, cut_start: f32, cut_end: f32) -> Vec<ExclusionInterval> {
    let mut out = Vec::with_capacity(2);
    if cut_start > 0.0 {
        out.push(ExclusionInterval::clamped(0.0, cut_start, length));
    }
    if cut_end > 0.0 {
        out.push(ExclusionInterval::clamped(length - cut_end, length, length));
    }
    out
}

/// One interval per non-searchable segment on the concatenated timeline.
///
/// Each end is pulled inwards by `margin` when the neighbouring segment on that side is
/// searchable. Neighbours wrap: the segment before the first is the last one and vice
/// versa. An interval narrowed past itself collapses onto the segment midpoint.
pub fn stitch_intervals(segments: &[StitchSegment], margin: f32) -> Vec<ExclusionInterval> {
    let n = segments.len();
    let total: f32 = segments.iter().map(|s| s.duration.max(0.0)).sum();
    let mut out = Vec::new();
    let mut start = 0.0f32;

    for (i, seg) in segments.iter().enumerate() {
        let end = start + seg.duration.max(0.0);
        if !seg.searchable {
            let prev = &segments[(i + n - 1) % n];
            let next = &segments[(i + 1) % n];
            let mut s = start;
            let mut e = end;
            if prev.searchable {
                s += margin;
            }
            if next.searchable {
                e -= margin;
            }
            if s > e {
                let mid = 0.5 * (start + end);
                s = mid;
                e = mid;
            }
            out.push(ExclusionInterval::clamped(s, e, total));
        }
        start = end;
    }
    out
}
