use super::round_meters;
use crate::types::{NormalizedInterval, UsageRecord};
use tracing::warn;

/// Both footage marks of a record, or `None` when either is missing or not finite.
pub fn footage_marks(record: &UsageRecord) -> Option<(f64, f64)> {
    match (record.start_point, record.end_point) {
        (Some(start), Some(end)) if start.is_finite() && end.is_finite() => Some((start, end)),
        _ => None,
    }
}

/// Turns a record into a `[low, high]` interval inside `[0, capacity]`.
///
/// A record pulled "backwards" (start above end) yields the same interval as
/// its forward twin. Malformed records become `{0, 0}` so one bad historical
/// entry contributes nothing instead of failing the whole drum.
pub fn normalize_record(record: &UsageRecord, capacity: f64) -> NormalizedInterval {
    let Some((start, end)) = footage_marks(record) else {
        warn!(record_id = %record.id, "Usage record has missing or non-finite footage marks");
        return NormalizedInterval {
            low: 0.0,
            high: 0.0,
        };
    };

    let low = start.min(end);
    let high = start.max(end);

    if low < 0.0 || high > capacity {
        warn!(
            record_id = %record.id,
            low,
            high,
            capacity,
            "Usage record extends past the drum, clamping"
        );
    }

    let low = round_meters(low.clamp(0.0, capacity));
    let high = round_meters(high.clamp(0.0, capacity));

    NormalizedInterval { low, high }
}
