use super::*;

/// Checks an operator-entered wastage figure for physical plausibility.
///
/// Rules run in order: the value must not be negative, then used plus wasted
/// footage must fit on the drum. Called for live feedback while typing and
/// again before any settings are persisted.
pub fn validate_manual_wastage(
    candidate_wastage: f64,
    total_used: f64,
    initial_quantity: f64,
) -> ValidationOutcome {
    if candidate_wastage.is_nan() {
        return ValidationOutcome::invalid("Wastage must be a number");
    }

    if candidate_wastage < 0.0 {
        return ValidationOutcome::invalid("Wastage cannot be negative");
    }

    let capacity = round_meters(initial_quantity);
    if round_meters(total_used + candidate_wastage) > capacity {
        let available = round_meters(capacity - total_used).max(0.0);
        return ValidationOutcome::invalid(format!(
            "Wastage of {:.2} m plus {:.2} m used exceeds drum capacity of {:.2} m (at most {:.2} m can be wasted)",
            candidate_wastage, total_used, capacity, available
        ));
    }

    ValidationOutcome::valid()
}

impl WastageCalculator {
    /// Validates a settings change against the drum's current usage before it
    /// may be persisted. Only the manual method carries a figure to check.
    pub fn validate_settings(
        &self,
        settings: &DrumSettings,
        records: &[UsageRecord],
    ) -> ValidationOutcome {
        match settings.calculation_method {
            CalculationMethod::ManualOverride => match settings.manual_wastage_override {
                Some(wastage) => {
                    let (intervals, _) = self.normalize_all(records);
                    let total_used = total_length(&merge_intervals(&intervals));
                    validate_manual_wastage(wastage, total_used, self.capacity)
                }
                None => ValidationOutcome::invalid("Manual override requires a wastage value"),
            },
            _ => match settings.manual_wastage_override {
                Some(wastage) if !wastage.is_finite() || wastage < 0.0 => {
                    validate_manual_wastage(wastage, 0.0, self.capacity)
                }
                _ => ValidationOutcome::valid(),
            },
        }
    }
}
