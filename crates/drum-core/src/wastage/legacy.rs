use super::merge::segment;
use super::*;

impl WastageCalculator {
    /// Chronological accounting used before the smart method existed.
    ///
    /// Every pull counts its full length, overlaps included. Any mismatch
    /// between one pull's end mark and the next pull's start mark is waste,
    /// which overestimates waste when technicians pull from both ends.
    /// The mismatch is taken as `|next.low - prev.high|`, so a pull that starts
    /// behind the previous end counts its overlap as waste too.
    /// Never the default for new drums.
    pub(super) fn legacy_gaps(&self, records: &[UsageRecord]) -> WastageCalculationResult {
        let mut chronological: Vec<&UsageRecord> = records.iter().collect();
        // Stable: same-date pulls keep insertion order
        chronological.sort_by_key(|record| record.usage_date);

        let mut usage_segments = Vec::with_capacity(chronological.len());
        let mut wasted_segments = Vec::new();
        let mut skipped_records = Vec::new();
        let mut previous_end: Option<f64> = None;

        for record in chronological {
            let interval = normalize_record(record, self.capacity);
            if footage_marks(record).is_none() {
                skipped_records.push(record.id.clone());
                continue;
            }

            if let Some(end) = previous_end {
                if interval.low != end {
                    wasted_segments.push(segment(end.min(interval.low), end.max(interval.low)));
                }
            }

            usage_segments.push(segment(interval.low, interval.high));
            previous_end = Some(interval.high);
        }

        let total_used = total_length(&usage_segments);
        let total_wastage = total_length(&wasted_segments);

        WastageCalculationResult {
            total_used,
            total_wastage,
            calculated_current_quantity: self.remainder(total_used, total_wastage),
            usage_segments,
            wasted_segments,
            calculation_method: CalculationMethod::LegacyGaps,
            initial_quantity: self.capacity,
            record_count: records.len(),
            skipped_records,
        }
    }
}
