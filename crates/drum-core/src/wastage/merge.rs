use super::round_meters;
use crate::types::{NormalizedInterval, Segment};
use std::cmp::Ordering;

pub(super) fn segment(start: f64, end: f64) -> Segment {
    Segment {
        start,
        end,
        length: round_meters(end - start),
    }
}

/// Collapses overlapping or touching intervals into a minimal sorted list of
/// disjoint segments covering the same footage.
///
/// Zero-length intervals add no footage and never produce a segment of their own.
pub fn merge_intervals(intervals: &[NormalizedInterval]) -> Vec<Segment> {
    let mut sorted: Vec<NormalizedInterval> = intervals
        .iter()
        .copied()
        .filter(|interval| interval.length() > 0.0)
        .collect();

    // Stable, so equal intervals keep input order
    sorted.sort_by(|a, b| {
        a.low
            .partial_cmp(&b.low)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.high.partial_cmp(&b.high).unwrap_or(Ordering::Equal))
    });

    let mut merged: Vec<Segment> = Vec::with_capacity(sorted.len());
    let mut current: Option<(f64, f64)> = None;

    for interval in sorted {
        current = match current {
            Some((start, end)) if interval.low <= end => Some((start, end.max(interval.high))),
            Some((start, end)) => {
                merged.push(segment(start, end));
                Some((interval.low, interval.high))
            }
            None => Some((interval.low, interval.high)),
        };
    }

    if let Some((start, end)) = current {
        merged.push(segment(start, end));
    }

    merged
}

/// Returns the gaps in `[0, capacity]` not covered by `used`.
///
/// `used` must be sorted and disjoint, as produced by [`merge_intervals`].
/// Empty gaps are omitted.
pub fn complement_segments(used: &[Segment], capacity: f64) -> Vec<Segment> {
    let mut gaps = Vec::new();
    let mut cursor = 0.0_f64;

    for seg in used {
        if seg.start > cursor {
            gaps.push(segment(cursor, seg.start));
        }
        cursor = cursor.max(seg.end);
    }

    if capacity > cursor {
        gaps.push(segment(cursor, capacity));
    }

    gaps
}
