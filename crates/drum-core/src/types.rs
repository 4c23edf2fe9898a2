use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One technician's pull against a drum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: String,
    /// Footage mark where the pull began. Direction is not guaranteed.
    #[serde(default)]
    pub start_point: Option<f64>,
    #[serde(default)]
    pub end_point: Option<f64>,
    /// Only the legacy method looks at this, for chronological ordering
    pub usage_date: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(id: impl Into<String>, start: f64, end: f64, usage_date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            start_point: Some(start),
            end_point: Some(end),
            usage_date,
        }
    }
}

/// Canonical `[low, high]` footage range of a usage record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInterval {
    pub low: f64,
    pub high: f64,
}

impl NormalizedInterval {
    pub fn length(&self) -> f64 {
        self.high - self.low
    }
}

/// Contiguous footage range on a drum, tagged used or wasted by the list it sits in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub length: f64,
}

/// Calculation preference stored on a drum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    #[default]
    SmartSegments,
    LegacyGaps,
    ManualOverride,
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculationMethod::SmartSegments => "smart_segments",
            CalculationMethod::LegacyGaps => "legacy_gaps",
            CalculationMethod::ManualOverride => "manual_override",
        };
        f.write_str(name)
    }
}

/// The physical spool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drum {
    pub id: String,
    /// Rated capacity in meters
    pub initial_quantity: f64,
    /// Last known remaining stock. Informational only.
    #[serde(default)]
    pub current_quantity: f64,
    #[serde(default)]
    pub manual_wastage_override: Option<f64>,
    #[serde(default)]
    pub calculation_method: CalculationMethod,
}

impl Drum {
    pub fn settings(&self) -> DrumSettings {
        DrumSettings {
            calculation_method: self.calculation_method,
            manual_wastage_override: self.manual_wastage_override,
        }
    }

    /// Replaces method and override together so the pair never disagrees.
    pub fn apply_settings(&mut self, settings: DrumSettings) {
        self.calculation_method = settings.calculation_method;
        self.manual_wastage_override = settings.manual_wastage_override;
    }
}

/// Operator-editable calculation preference of a drum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrumSettings {
    pub calculation_method: CalculationMethod,
    #[serde(default)]
    pub manual_wastage_override: Option<f64>,
}

/// Input: a drum together with every usage record recorded against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WastageRequest {
    pub drum: Drum,
    #[serde(default)]
    pub usage_records: Vec<UsageRecord>,
}

/// Output: identical shape regardless of method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WastageCalculationResult {
    pub total_used: f64,
    pub total_wastage: f64,
    pub calculated_current_quantity: f64,
    pub usage_segments: Vec<Segment>,
    /// Empty when a manual override supplies the wastage figure
    pub wasted_segments: Vec<Segment>,
    pub calculation_method: CalculationMethod,
    pub initial_quantity: f64,
    pub record_count: usize,
    /// Records whose footage marks were missing or non-finite
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped_records: Vec<String>,
}

/// Outcome of checking an operator-entered wastage figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Error type for wastage calculation
#[derive(Debug, thiserror::Error)]
pub enum WastageError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid manual override: {0}")]
    InvalidOverride(String),

    /// Usage and wastage together exceed the drum's capacity. The computed
    /// figures are kept so callers can still show them next to the warning.
    #[error("Usage exceeds drum capacity under {method}: remainder would be {remainder:.2} m")]
    NegativeRemainder {
        method: CalculationMethod,
        remainder: f64,
        result: Box<WastageCalculationResult>,
    },
}

pub type Result<T> = std::result::Result<T, WastageError>;
