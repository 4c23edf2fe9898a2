use super::*;

impl WastageCalculator {
    /// Reconstructs consumed footage as the union of every recorded pull and
    /// treats the rest of the drum as waste.
    ///
    /// With `manual_wastage` set, used segments still come from the records but
    /// the wastage figure is replaced and no wasted geometry is reported.
    pub(super) fn smart_segments(
        &self,
        records: &[UsageRecord],
        manual_wastage: Option<f64>,
    ) -> Result<WastageCalculationResult> {
        let (intervals, skipped_records) = self.normalize_all(records);
        let usage_segments = merge_intervals(&intervals);
        let total_used = total_length(&usage_segments);

        let (total_wastage, wasted_segments, calculation_method) = match manual_wastage {
            Some(wastage) => {
                let outcome = validate_manual_wastage(wastage, total_used, self.capacity);
                if let Some(message) = outcome.error {
                    return Err(WastageError::InvalidOverride(message));
                }
                (
                    round_meters(wastage),
                    Vec::new(),
                    CalculationMethod::ManualOverride,
                )
            }
            None => {
                let wasted = complement_segments(&usage_segments, self.capacity);
                (
                    total_length(&wasted),
                    wasted,
                    CalculationMethod::SmartSegments,
                )
            }
        };

        Ok(WastageCalculationResult {
            total_used,
            total_wastage,
            calculated_current_quantity: self.remainder(total_used, total_wastage),
            usage_segments,
            wasted_segments,
            calculation_method,
            initial_quantity: self.capacity,
            record_count: records.len(),
            skipped_records,
        })
    }
}
