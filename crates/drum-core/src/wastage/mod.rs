use crate::types::*;
use tracing::{debug, warn};

mod legacy;
mod merge;
mod normalize;
mod smart;
mod validate;
#[cfg(test)]
mod tests;

pub use merge::{complement_segments, merge_intervals};
pub use normalize::{footage_marks, normalize_record};
pub use validate::validate_manual_wastage;

/// Rounds a footage value to centimetres. Every figure the engine emits goes
/// through here so equality checks on totals are stable.
pub fn round_meters(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of segment lengths, rounded.
pub fn total_length(segments: &[Segment]) -> f64 {
    round_meters(segments.iter().map(|s| s.length).sum())
}

/// Wastage policy applied to one calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WastageMethod {
    /// Interval-merge complement over the drum's footage axis
    Smart,
    /// Chronological consecutive-gap summation, kept for historical drums
    Legacy,
    /// Smart used segments with an operator-supplied wastage figure
    Manual { wastage: f64 },
}

impl WastageMethod {
    /// Reads the drum's stored preference. Never cached: call per calculation.
    pub fn for_drum(drum: &Drum) -> Self {
        match drum.calculation_method {
            CalculationMethod::SmartSegments => WastageMethod::Smart,
            CalculationMethod::LegacyGaps => WastageMethod::Legacy,
            CalculationMethod::ManualOverride => match drum.manual_wastage_override {
                Some(wastage) => WastageMethod::Manual { wastage },
                None => {
                    warn!(
                        drum_id = %drum.id,
                        "Manual override selected without a stored value, using smart segments"
                    );
                    WastageMethod::Smart
                }
            },
        }
    }

    pub fn calculation_method(&self) -> CalculationMethod {
        match self {
            WastageMethod::Smart => CalculationMethod::SmartSegments,
            WastageMethod::Legacy => CalculationMethod::LegacyGaps,
            WastageMethod::Manual { .. } => CalculationMethod::ManualOverride,
        }
    }
}

/// Reconciles usage records against a drum of fixed capacity.
pub struct WastageCalculator {
    capacity: f64,
}

impl WastageCalculator {
    /// Validates the rated capacity and builds a calculator for it.
    pub fn new(initial_quantity: f64) -> Result<Self> {
        if !initial_quantity.is_finite() {
            return Err(WastageError::InvalidInput(
                "Drum capacity must be a finite number".to_string(),
            ));
        }

        if initial_quantity < 0.0 {
            return Err(WastageError::InvalidInput(format!(
                "Drum capacity cannot be negative (got {initial_quantity})"
            )));
        }

        Ok(Self {
            capacity: round_meters(initial_quantity),
        })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Runs one method and checks the remainder. A negative remainder is
    /// reported as [`WastageError::NegativeRemainder`], never clamped.
    pub fn calculate(
        &self,
        records: &[UsageRecord],
        method: WastageMethod,
    ) -> Result<WastageCalculationResult> {
        let result = match method {
            WastageMethod::Smart => self.smart_segments(records, None)?,
            WastageMethod::Legacy => self.legacy_gaps(records),
            WastageMethod::Manual { wastage } => self.smart_segments(records, Some(wastage))?,
        };

        debug!(
            method = %result.calculation_method,
            records = result.record_count,
            used = result.total_used,
            wastage = result.total_wastage,
            remaining = result.calculated_current_quantity,
            "Wastage calculated"
        );

        if result.calculated_current_quantity < 0.0 {
            warn!(
                method = %result.calculation_method,
                remainder = result.calculated_current_quantity,
                "Recorded usage exceeds drum capacity"
            );
            return Err(WastageError::NegativeRemainder {
                method: result.calculation_method,
                remainder: result.calculated_current_quantity,
                result: Box::new(result),
            });
        }

        Ok(result)
    }

    /// Remaining stock once used and wasted footage are taken off the drum.
    fn remainder(&self, total_used: f64, total_wastage: f64) -> f64 {
        round_meters(self.capacity - total_used - total_wastage)
    }

    /// Normalizes every record, returning the intervals alongside the ids of
    /// records that had to be treated as zero-length.
    fn normalize_all(&self, records: &[UsageRecord]) -> (Vec<NormalizedInterval>, Vec<String>) {
        let mut skipped = Vec::new();
        let intervals = records
            .iter()
            .map(|record| {
                if footage_marks(record).is_none() {
                    skipped.push(record.id.clone());
                }
                normalize_record(record, self.capacity)
            })
            .collect();
        (intervals, skipped)
    }
}

/// Routes a drum to the calculator matching its stored preference.
pub fn calculate_wastage(records: &[UsageRecord], drum: &Drum) -> Result<WastageCalculationResult> {
    let calculator = WastageCalculator::new(drum.initial_quantity)?;
    calculator.calculate(records, WastageMethod::for_drum(drum))
}

impl WastageRequest {
    pub fn calculate(&self) -> Result<WastageCalculationResult> {
        calculate_wastage(&self.usage_records, &self.drum)
    }
}
